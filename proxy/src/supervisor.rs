// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::sync::Arc;
use std::time::Duration;

use registry::RegistryError;
use tokio::sync::{mpsc, watch};

use crate::prober::Prober;
use crate::reconciler::Reconciler;

const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(20);

/// Drives the Reconciler and Prober on independent timers, funnels a fatal
/// error from either into a terminal `Err`, and honors cooperative
/// cancellation via a `watch` receiver closed by [`proxy_util::shutdown`].
pub struct Supervisor {
    reconciler: Arc<Reconciler>,
    prober: Arc<Prober>,
    reconcile_interval: Duration,
    probe_interval: Duration,
}

impl Supervisor {
    pub fn new(reconciler: Reconciler, prober: Prober) -> Self {
        Supervisor {
            reconciler: Arc::new(reconciler),
            prober: Arc::new(prober),
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        }
    }

    #[cfg(test)]
    pub fn with_intervals(
        reconciler: Reconciler,
        prober: Prober,
        reconcile_interval: Duration,
        probe_interval: Duration,
    ) -> Self {
        Supervisor {
            reconciler: Arc::new(reconciler),
            prober: Arc::new(prober),
            reconcile_interval,
            probe_interval,
        }
    }

    /// Runs until cancelled (returns `Ok(())`) or a background tick reports a
    /// fatal registry error (returns `Err`). A tick that is still running
    /// when its next timer fires is not queued: the new tick simply starts
    /// once dispatched, running concurrently with the straggler.
    pub async fn run(self, mut shutdown: watch::Receiver<()>) -> Result<(), RegistryError> {
        let (error_tx, mut error_rx) = mpsc::channel::<RegistryError>(8);
        let mut reconcile_timer = tokio::time::interval(self.reconcile_interval);
        let mut probe_timer = tokio::time::interval(self.probe_interval);

        loop {
            tokio::select! {
                _ = reconcile_timer.tick() => {
                    let reconciler = self.reconciler.clone();
                    let error_tx = error_tx.clone();
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        if let Err(err) = reconciler.tick().await {
                            tracing::error!(%err, "reconciliation tick failed");
                            // Shutdown may have already won the race while this tick
                            // was in flight; don't report a fatal error for a process
                            // that's already on its way down.
                            if !proxy_util::shutdown::is_cancelled(&shutdown) {
                                let _ = error_tx.send(err).await;
                            }
                        }
                    });
                }
                _ = probe_timer.tick() => {
                    let prober = self.prober.clone();
                    tokio::spawn(async move {
                        prober.tick().await;
                    });
                }
                Some(err) = error_rx.recv() => {
                    return Err(err);
                }
                _ = shutdown.changed() => {
                    tracing::info!("supervisor cancelled");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::watch;

    use super::Supervisor;
    use crate::fake_registry::FakeRegistry;
    use crate::prober::Prober;
    use crate::reconciler::Reconciler;
    use crate::table::EndpointTable;

    const SHORT_INTERVAL: Duration = Duration::from_millis(10);
    const LONG_INTERVAL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn run_returns_the_fatal_error_from_a_failing_reconcile_tick() {
        let registry = Arc::new(FakeRegistry::new().failing_list_backends());
        let table = Arc::new(EndpointTable::new());
        let reconciler = Reconciler::new(registry, table.clone());
        let prober = Prober::new(table);
        let supervisor = Supervisor::with_intervals(reconciler, prober, SHORT_INTERVAL, LONG_INTERVAL);

        let (_sender, receiver) = watch::channel(());
        let result = tokio::time::timeout(Duration::from_secs(2), supervisor.run(receiver))
            .await
            .expect("supervisor should have reported the fatal error well within 2s");

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn run_returns_ok_on_cancellation_without_a_background_error() {
        let registry = Arc::new(FakeRegistry::new().with_backend("a.test", "10.0.0.1:9000"));
        let table = Arc::new(EndpointTable::new());
        let reconciler = Reconciler::new(registry, table.clone());
        let prober = Prober::new(table);
        let supervisor = Supervisor::with_intervals(reconciler, prober, LONG_INTERVAL, LONG_INTERVAL);

        let (sender, receiver) = watch::channel(());
        drop(sender);

        let result = tokio::time::timeout(Duration::from_secs(2), supervisor.run(receiver))
            .await
            .expect("supervisor should have observed cancellation well within 2s");

        assert!(result.is_ok());
    }
}
