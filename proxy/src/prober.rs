// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::client::Client;
use crate::table::EndpointTable;

/// TCP dial timeout applied to each liveness probe.
const DIAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Periodically TCP-dials every client in the table to refresh its `alive`
/// flag. Probes are fire-and-forget: a tick fans them out and returns
/// immediately, it does not wait for them to land.
pub struct Prober {
    table: Arc<EndpointTable>,
}

impl Prober {
    pub fn new(table: Arc<EndpointTable>) -> Self {
        Prober { table }
    }

    /// Fans out one probe per client currently in the table. Never fails:
    /// probe failures only ever change a client's liveness flag.
    pub async fn tick(&self) {
        self.table.for_each_client(|client| {
            let client = client.clone();
            tokio::spawn(async move {
                probe_once(&client).await;
            });
        });
    }
}

async fn probe_once(client: &Client) {
    let alive = tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(&client.address))
        .await
        .map(|dial_result| dial_result.is_ok())
        .unwrap_or(false);
    client.set_alive(alive);
}
