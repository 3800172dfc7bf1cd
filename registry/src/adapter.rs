// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::model::{Backend, Site};

/// Deadline applied to single-row registry queries (`AuthorizationRequired`,
/// `VerifyCredential`).
const ROW_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline applied to the multi-row `ListBackends` scan. The target scale is
/// hundreds of endpoints, so the same 5s budget as a single-row query is
/// generous rather than tight.
const LIST_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// The three read-only queries the routing/dispatch core consumes from the
/// persistent registry. Out-of-scope CRUD lives elsewhere; this is
/// deliberately narrow.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn list_backends(&self) -> Result<Vec<Backend>, RegistryError>;
    async fn authorization_required(&self, host: &str) -> Result<bool, RegistryError>;
    async fn verify_credential(
        &self,
        login: &str,
        password: &str,
        host: &str,
    ) -> Result<bool, RegistryError>;
}

/// A [`Registry`] backed by PostgreSQL.
pub struct PgRegistry {
    pool: PgPool,
}

impl PgRegistry {
    pub async fn connect(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.connection_string())
            .await?;
        Ok(PgRegistry { pool })
    }
}

#[async_trait]
impl Registry for PgRegistry {
    async fn list_backends(&self) -> Result<Vec<Backend>, RegistryError> {
        let rows = tokio::time::timeout(
            LIST_QUERY_TIMEOUT,
            sqlx::query_as::<_, BackendRow>(
                "SELECT b.id, b.address, s.id AS site_id, s.name AS site_name, s.host AS site_host \
                 FROM backends b JOIN sites s ON s.id = b.site_id",
            )
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|_| RegistryError::Timeout)??;

        Ok(rows.into_iter().map(BackendRow::into_backend).collect())
    }

    async fn authorization_required(&self, host: &str) -> Result<bool, RegistryError> {
        let row: Option<(i64,)> = tokio::time::timeout(
            ROW_QUERY_TIMEOUT,
            sqlx::query_as(
                "SELECT c.id FROM credentials c JOIN sites s ON s.id = c.site_id \
                 WHERE s.host = $1 LIMIT 1",
            )
            .bind(host)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|_| RegistryError::Timeout)??;

        Ok(row.is_some())
    }

    async fn verify_credential(
        &self,
        login: &str,
        password: &str,
        host: &str,
    ) -> Result<bool, RegistryError> {
        let (count,): (i64,) = tokio::time::timeout(
            ROW_QUERY_TIMEOUT,
            sqlx::query_as(
                "SELECT COUNT(*) FROM credentials c JOIN sites s ON s.id = c.site_id \
                 WHERE s.host = $1 AND c.login = $2 AND c.password = $3",
            )
            .bind(host)
            .bind(login)
            .bind(password)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|_| RegistryError::Timeout)??;

        Ok(count == 1)
    }
}

/// Intermediate row shape for the three-way `backends JOIN sites` scan; kept
/// separate from [`Backend`] because `sqlx::FromRow` wants flat columns.
#[derive(sqlx::FromRow)]
struct BackendRow {
    id: i64,
    address: String,
    site_id: i64,
    site_name: String,
    site_host: String,
}

impl BackendRow {
    fn into_backend(self) -> Backend {
        Backend {
            id: self.id,
            address: self.address,
            site: Site {
                id: self.site_id,
                name: self.site_name,
                host: self.site_host,
            },
        }
    }
}
