// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::net::SocketAddr;

use registry::RegistryConfig;

/// Top-level process configuration, assembled entirely from environment
/// variables rather than a config file: `REVPORT`, `ROUTERPORT`, `LOGLEVEL`,
/// plus the six registry connection variables.
#[derive(Debug)]
pub struct Config {
    /// Where the reverse proxy itself listens.
    pub rev_addr: SocketAddr,
    /// Administrative listen address. Parsed and validated, never bound:
    /// no CRUD surface is mounted behind it.
    pub router_addr: SocketAddr,
    pub log_level: String,
    pub registry: RegistryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            rev_addr: parse_listen_addr("REVPORT")?,
            router_addr: parse_listen_addr("ROUTERPORT")?,
            log_level: required_var("LOGLEVEL")?,
            registry: RegistryConfig::from_env()?,
        })
    }
}

fn required_var(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("missing required environment variable {name}"))
}

/// Parses a `HOST:PORT` or bare `:PORT` (all-interfaces) listen address.
fn parse_listen_addr(name: &str) -> Result<SocketAddr, String> {
    let raw = required_var(name)?;
    let raw = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => raw.clone(),
    };
    raw.parse()
        .map_err(|err| format!("{name}={raw:?} is not a valid listen address: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_listen_addr_expands_bare_port_shorthand() {
        std::env::set_var("CONFIG_TEST_BARE_PORT", ":8080");
        let addr = parse_listen_addr("CONFIG_TEST_BARE_PORT").unwrap();
        assert_eq!(addr, "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn parse_listen_addr_accepts_explicit_host() {
        std::env::set_var("CONFIG_TEST_EXPLICIT_HOST", "127.0.0.1:9000");
        let addr = parse_listen_addr("CONFIG_TEST_EXPLICIT_HOST").unwrap();
        assert_eq!(addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn parse_listen_addr_rejects_garbage() {
        std::env::set_var("CONFIG_TEST_GARBAGE", "not-an-address");
        assert!(parse_listen_addr("CONFIG_TEST_GARBAGE").is_err());
    }
}
