// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Configure logging for a binary from the `LOGLEVEL` value.
///
/// `info`/`warn`/`error` map to the matching `tracing` level; any other value
/// (including absence) disables the subscriber entirely rather than defaulting
/// to a level, mirroring the `Disabled` fallback this was distilled from.
pub fn setup_logging(log_level: &str, service_name: &'static str) {
    let level = match log_level {
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => return,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(level);

    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(service = service_name, %log_level, "logging configured");
}
