// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

#![deny(warnings)]

mod authorizer;
mod client;
mod dispatcher;
mod error;
#[cfg(test)]
mod fake_registry;
mod prober;
mod reconciler;
mod supervisor;
mod table;

pub use authorizer::Authorizer;
pub use client::Client;
pub use dispatcher::Dispatcher;
pub use error::SelectionError;
pub use prober::Prober;
pub use reconciler::Reconciler;
pub use supervisor::Supervisor;
pub use table::EndpointTable;
