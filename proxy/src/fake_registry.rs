// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! An in-memory stand-in for the persistent registry, used across this
//! crate's tests instead of standing up a real Postgres instance — the same
//! approach the original implementation's `*_test.go` files take toward
//! their repository layer.

use std::collections::HashSet;

use async_trait::async_trait;
use registry::{Backend, Registry, RegistryError, Site};

#[derive(Default)]
pub(crate) struct FakeRegistry {
    backends: Vec<Backend>,
    hosts_requiring_auth: HashSet<String>,
    valid_credentials: HashSet<(String, String, String)>,
    fail_list_backends: bool,
}

impl FakeRegistry {
    pub(crate) fn new() -> Self {
        FakeRegistry::default()
    }

    pub(crate) fn with_backend(mut self, host: &str, address: &str) -> Self {
        self.backends.push(Backend {
            id: self.backends.len() as i64 + 1,
            address: address.to_owned(),
            site: Site {
                id: 1,
                name: host.to_owned(),
                host: host.to_owned(),
            },
        });
        self
    }

    pub(crate) fn requiring_auth(mut self, host: &str) -> Self {
        self.hosts_requiring_auth.insert(host.to_owned());
        self
    }

    pub(crate) fn with_credential(mut self, login: &str, password: &str, host: &str) -> Self {
        self.valid_credentials
            .insert((login.to_owned(), password.to_owned(), host.to_owned()));
        self
    }

    pub(crate) fn failing_list_backends(mut self) -> Self {
        self.fail_list_backends = true;
        self
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn list_backends(&self) -> Result<Vec<Backend>, RegistryError> {
        if self.fail_list_backends {
            return Err(RegistryError::Timeout);
        }
        Ok(self.backends.clone())
    }

    async fn authorization_required(&self, host: &str) -> Result<bool, RegistryError> {
        Ok(self.hosts_requiring_auth.contains(host))
    }

    async fn verify_credential(
        &self,
        login: &str,
        password: &str,
        host: &str,
    ) -> Result<bool, RegistryError> {
        Ok(self
            .valid_credentials
            .contains(&(login.to_owned(), password.to_owned(), host.to_owned())))
    }
}
