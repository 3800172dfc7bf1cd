// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::sync::Arc;

use registry::{Registry, RegistryError};

use crate::table::EndpointTable;

/// Fetches the authoritative backend set from the registry and folds it into
/// the Endpoint Table on every tick.
pub struct Reconciler {
    registry: Arc<dyn Registry>,
    table: Arc<EndpointTable>,
}

impl Reconciler {
    pub fn new(registry: Arc<dyn Registry>, table: Arc<EndpointTable>) -> Self {
        Reconciler { registry, table }
    }

    /// Runs one reconciliation pass. A registry failure aborts the tick
    /// without mutating the table and is returned so the Supervisor can treat
    /// it as fatal.
    pub async fn tick(&self) -> Result<(), RegistryError> {
        let backends = self.registry.list_backends().await?;
        self.table.replace_from_authoritative(&backends);
        tracing::info!(backend_count = backends.len(), "reconciled endpoint table");
        Ok(())
    }
}
