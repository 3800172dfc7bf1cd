// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

#![deny(warnings)]

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use hyper::server::accept;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use proxy::{Authorizer, Dispatcher, EndpointTable, Prober, Reconciler, Supervisor};
use registry::PgRegistry;
use tokio::net::TcpListener;
use tokio_io_timeout::TimeoutStream;
use tokio_stream::wrappers::TcpListenerStream;

mod config;

/// Matches the original implementation's `http.Server{ReadTimeout,
/// WriteTimeout}` of 15s applied to the inbound reverse-proxy listener.
const READ_WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Matches the original's `context.WithTimeout(ctx, 5*time.Second)` passed to
/// `srv.Shutdown`: once the shutdown signal fires, in-flight connections get
/// this long to finish before stragglers are dropped.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env().map_err(anyhow::Error::msg)?;

    proxy_util::logging::setup_logging(&config.log_level, "proxy_server");
    tracing::info!(
        rev_addr = %config.rev_addr,
        router_addr = %config.router_addr,
        "starting proxy server",
    );

    // ROUTERPORT is recognized and validated above but never bound: the
    // administrative CRUD surface is out of scope for this binary.

    let registry = Arc::new(PgRegistry::connect(&config.registry).await?);
    let table = Arc::new(EndpointTable::new());

    let reconciler = Reconciler::new(registry.clone(), table.clone());
    // Populate the table before accepting traffic so the first request
    // doesn't race an empty table.
    reconciler
        .tick()
        .await
        .map_err(|err| anyhow::anyhow!("initial reconciliation failed: {err}"))?;

    let prober = Prober::new(table.clone());
    let supervisor = Supervisor::new(reconciler, prober);
    let authorizer = Authorizer::new(registry);
    let dispatcher = Arc::new(Dispatcher::new(authorizer, table));

    let shutdown = proxy_util::shutdown::on_interrupt();

    let supervisor_task = tokio::spawn(supervisor.run(shutdown.clone()));
    serve(config.rev_addr, dispatcher, shutdown).await?;

    supervisor_task.await??;
    Ok(())
}

async fn serve(
    addr: std::net::SocketAddr,
    dispatcher: Arc<Dispatcher>,
    mut shutdown: tokio::sync::watch::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let incoming = TcpListenerStream::new(listener).map_ok(|stream| {
        let mut timeout_stream = TimeoutStream::new(stream);
        timeout_stream.set_read_timeout(Some(READ_WRITE_TIMEOUT));
        timeout_stream.set_write_timeout(Some(READ_WRITE_TIMEOUT));
        timeout_stream
    });

    let make_service = make_service_fn(move |_conn| {
        let dispatcher = dispatcher.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let dispatcher = dispatcher.clone();
                async move { Ok::<_, Infallible>(dispatcher.handle(req).await) }
            }))
        }
    });

    tracing::info!(%addr, "serving reverse proxy");
    let mut shutdown_for_drain = shutdown.clone();
    let server = Server::builder(accept::from_stream(incoming))
        .serve(make_service)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        });
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return Ok(result?),
        _ = shutdown_for_drain.changed() => {
            tracing::info!("shutdown signal received, draining in-flight connections");
        }
    }

    match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, &mut server).await {
        Ok(result) => result?,
        Err(_) => tracing::warn!("graceful shutdown budget elapsed, dropping in-flight connections"),
    }
    Ok(())
}
