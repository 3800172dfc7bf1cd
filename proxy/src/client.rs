// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::sync::atomic::{AtomicBool, Ordering};

use hyper::client::HttpConnector;
use hyper::Body;

/// The reusable outbound HTTP transport used to reach a [`Client`]'s address.
///
/// A `hyper::Client` owns its own idle connection pool, so sharing one
/// instance across concurrent requests to the same backend is the intended
/// usage (this is why it is stored once per `Client` rather than constructed
/// per request).
pub type Transport = hyper::Client<HttpConnector, Body>;

/// The in-memory representation of a registered backend: its address, the
/// most recent liveness verdict from the Prober, and the transport used to
/// reach it.
///
/// `alive` is guarded by its own lock (here, an atomic) rather than the
/// Endpoint Table's lock so that concurrent probes never serialize behind
/// reconciliation or each other.
pub struct Client {
    pub address: String,
    alive: AtomicBool,
    /// Reconciliation-only marker: `true` once this tick's merge step has
    /// confirmed the client is still present in the authoritative set.
    /// Never observed outside a single `ReplaceFromAuthoritative` call.
    processed: AtomicBool,
    transport: Transport,
}

impl Client {
    pub fn new(address: String) -> Self {
        Client {
            address,
            alive: AtomicBool::new(false),
            processed: AtomicBool::new(false),
            transport: hyper::Client::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub(crate) fn is_processed(&self) -> bool {
        self.processed.load(Ordering::Acquire)
    }

    pub(crate) fn set_processed(&self, processed: bool) {
        self.processed.store(processed, Ordering::Release);
    }
}
