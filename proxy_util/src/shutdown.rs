// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

/// Spawns a task that waits for SIGINT or SIGTERM and then drops the sending
/// half of a `watch` channel, which causes every clone of the returned
/// receiver to observe a `RecvError` the next time `.changed()` is polled.
///
/// Every long-running task (inbound server, Supervisor) should hold a clone
/// of this receiver and treat a closed channel as "begin graceful shutdown".
pub fn on_interrupt() -> watch::Receiver<()> {
    let (sender, receiver) = watch::channel(());

    tokio::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).expect("attach SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("attach SIGTERM handler");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
        tracing::info!("received shutdown signal, starting graceful shutdown");
        drop(sender);
    });

    receiver
}

/// `true` once the sender behind `receiver` has been dropped.
pub fn is_cancelled(receiver: &watch::Receiver<()>) -> bool {
    receiver.has_changed().is_err()
}
