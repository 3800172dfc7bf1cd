// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::sync::Arc;

use registry::{Registry, RegistryError};

/// Stateless per-request authorization policy. All state lives in the
/// registry; the Authorizer is just two named registry reads.
pub struct Authorizer {
    registry: Arc<dyn Registry>,
}

impl Authorizer {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Authorizer { registry }
    }

    /// `false` means no credentials are recorded for `host`, so the request
    /// may proceed without an `Authorization` header.
    pub async fn needs_auth(&self, host: &str) -> Result<bool, RegistryError> {
        self.registry.authorization_required(host).await
    }

    pub async fn check(&self, login: &str, password: &str, host: &str) -> Result<bool, RegistryError> {
        self.registry.verify_credential(login, password, host).await
    }
}
