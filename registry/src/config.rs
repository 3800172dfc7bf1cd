// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// Postgres connection parameters, sourced from the environment variables
/// named in this system's configuration contract: `HOST`, `PORT`, `USER`,
/// `PASSWORD`, `DBNAME`, `SSLMODE`.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(RegistryConfig {
            host: required_var("HOST")?,
            port: required_var("PORT")?,
            user: required_var("USER")?,
            password: required_var("PASSWORD")?,
            dbname: required_var("DBNAME")?,
            sslmode: required_var("SSLMODE")?,
        })
    }

    /// A libpq-style connection string, as consumed by `sqlx::PgPool`.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={}",
            self.host, self.port, self.user, self.password, self.dbname, self.sslmode
        )
    }
}

fn required_var(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("missing required environment variable {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_includes_every_field() {
        let config = RegistryConfig {
            host: "db.internal".to_owned(),
            port: "5432".to_owned(),
            user: "proxy".to_owned(),
            password: "secret".to_owned(),
            dbname: "proxy".to_owned(),
            sslmode: "require".to_owned(),
        };
        let conn = config.connection_string();
        assert!(conn.contains("host=db.internal"));
        assert!(conn.contains("sslmode=require"));
    }
}
