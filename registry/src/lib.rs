// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

#![deny(warnings)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod model;

pub use adapter::{PgRegistry, Registry};
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use model::{Backend, Credential, Site};
