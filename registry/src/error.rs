// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use thiserror::Error;

/// A failure talking to the persistent registry.
///
/// Every variant is treated as non-fatal for a single request (the caller maps
/// it to a 500) and fatal for a background reconciliation tick (surfaced to
/// the Supervisor).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("registry query exceeded its deadline")]
    Timeout,
}
