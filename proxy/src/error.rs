// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use thiserror::Error;

/// Failure modes of [`crate::table::EndpointTable::select`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no backend is registered for this host")]
    NoHost,
    #[error("every backend for this host is currently unreachable")]
    NoLiveClient,
}

