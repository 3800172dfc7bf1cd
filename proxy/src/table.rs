// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use registry::Backend;

use crate::client::Client;
use crate::error::SelectionError;

/// The in-memory mapping from virtual host to the ordered sequence of
/// [`Client`]s that can serve it.
///
/// Readers (the Dispatcher resolving a client, the Prober fanning out probes)
/// take the read lock; the Reconciler is the sole writer. The sequence order
/// is not guaranteed stable across reconciliations, only within the lifetime
/// of a single request.
#[derive(Default)]
pub struct EndpointTable {
    hosts: RwLock<HashMap<String, Vec<Arc<Client>>>>,
}

impl EndpointTable {
    pub fn new() -> Self {
        EndpointTable::default()
    }

    /// Returns a live reference to the client list for `host`, or `None` if
    /// the host is not (yet) registered. Held only long enough to clone the
    /// `Arc`s out from under the read lock.
    pub fn snapshot(&self, host: &str) -> Option<Vec<Arc<Client>>> {
        self.hosts.read().get(host).cloned()
    }

    /// Invokes `f` once per client currently in the table, under a single
    /// read lock. Used by the Prober to fan out liveness probes.
    pub fn for_each_client(&self, mut f: impl FnMut(&Arc<Client>)) {
        for clients in self.hosts.read().values() {
            for client in clients {
                f(client);
            }
        }
    }

    /// Implements the client-selection algorithm: a uniformly-random starting
    /// pick, with a fail-open linear scan over the rest of the list if that
    /// pick isn't alive.
    pub fn select(&self, host: &str) -> Result<Arc<Client>, SelectionError> {
        let clients = self.snapshot(host).ok_or(SelectionError::NoHost)?;
        if clients.is_empty() {
            return Err(SelectionError::NoLiveClient);
        }

        let start = rand::thread_rng().gen_range(0..clients.len());
        if clients[start].is_alive() {
            return Ok(clients[start].clone());
        }

        let mut i = (start + 1) % clients.len();
        while i != start {
            if clients[i].is_alive() {
                return Ok(clients[i].clone());
            }
            i = (i + 1) % clients.len();
        }

        Err(SelectionError::NoLiveClient)
    }

    /// Reconciles the table against the authoritative `backends` set fetched
    /// from the registry. Runs under the write lock for its entire duration:
    ///
    /// 1. Hosts with no matching backend are dropped; their clients' idle
    ///    connections are released.
    /// 2. Surviving hosts have every existing client marked unprocessed.
    /// 3. Each backend either marks its matching client processed, or (if no
    ///    client with that address exists yet) is appended as a new one.
    /// 4. Any client left unprocessed after the merge is evicted and its
    ///    transport released.
    pub fn replace_from_authoritative(&self, backends: &[Backend]) {
        let mut hosts = self.hosts.write();

        hosts.retain(|host, clients| {
            let still_present = backends.iter().any(|b| &b.site.host == host);
            if !still_present {
                for client in clients.iter() {
                    client.transport().close_idle_connections();
                }
                return false;
            }
            for client in clients.iter() {
                client.set_processed(false);
            }
            true
        });

        for backend in backends {
            let clients = hosts.entry(backend.site.host.clone()).or_default();
            match clients.iter().find(|c| c.address == backend.address) {
                Some(existing) => existing.set_processed(true),
                None => {
                    let client = Arc::new(Client::new(backend.address.clone()));
                    client.set_processed(true);
                    clients.push(client);
                }
            }
        }

        for clients in hosts.values_mut() {
            let mut kept = Vec::with_capacity(clients.len());
            for client in clients.drain(..) {
                if client.is_processed() {
                    kept.push(client);
                } else {
                    client.transport().close_idle_connections();
                }
            }
            *clients = kept;
        }
    }

    #[cfg(test)]
    pub(crate) fn host_addresses(&self, host: &str) -> Option<Vec<String>> {
        self.hosts
            .read()
            .get(host)
            .map(|clients| clients.iter().map(|c| c.address.clone()).collect())
    }

    #[cfg(test)]
    pub(crate) fn hosts_snapshot(&self) -> Vec<String> {
        self.hosts.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry::Site;

    fn backend(host: &str, address: &str) -> Backend {
        Backend {
            id: 1,
            address: address.to_owned(),
            site: Site {
                id: 1,
                name: host.to_owned(),
                host: host.to_owned(),
            },
        }
    }

    #[test]
    fn reconcile_adds_and_prunes_hosts() {
        let table = EndpointTable::new();
        table.replace_from_authoritative(&[backend("a.test", "10.0.0.1:9000")]);
        assert_eq!(table.hosts_snapshot(), vec!["a.test".to_owned()]);

        table.replace_from_authoritative(&[backend("b.test", "10.0.0.2:9000")]);
        assert_eq!(table.hosts_snapshot(), vec!["b.test".to_owned()]);
    }

    #[test]
    fn reconcile_preserves_surviving_client_liveness_and_identity() {
        let table = EndpointTable::new();
        table.replace_from_authoritative(&[backend("a.test", "10.0.0.1:9000")]);
        let original = table.snapshot("a.test").unwrap().remove(0);
        original.set_alive(true);

        // Second tick: same host, same address, plus a new one.
        table.replace_from_authoritative(&[
            backend("a.test", "10.0.0.1:9000"),
            backend("a.test", "10.0.0.2:9000"),
        ]);

        let clients = table.snapshot("a.test").unwrap();
        assert_eq!(clients.len(), 2);
        let survivor = clients.iter().find(|c| c.address == "10.0.0.1:9000").unwrap();
        assert!(Arc::ptr_eq(survivor, &original));
        assert!(survivor.is_alive());

        let fresh = clients.iter().find(|c| c.address == "10.0.0.2:9000").unwrap();
        assert!(!fresh.is_alive());
    }

    #[test]
    fn select_returns_no_host_when_absent() {
        let table = EndpointTable::new();
        assert!(matches!(table.select("ghost.test"), Err(SelectionError::NoHost)));
    }

    #[test]
    fn select_returns_no_live_client_when_all_dead() {
        let table = EndpointTable::new();
        table.replace_from_authoritative(&[
            backend("a.test", "10.0.0.1:9000"),
            backend("a.test", "10.0.0.2:9000"),
        ]);
        assert!(matches!(table.select("a.test"), Err(SelectionError::NoLiveClient)));
    }

    #[test]
    fn select_finds_the_only_live_client_via_scan() {
        let table = EndpointTable::new();
        table.replace_from_authoritative(&[
            backend("a.test", "10.0.0.1:9000"),
            backend("a.test", "10.0.0.2:9000"),
            backend("a.test", "10.0.0.3:9000"),
        ]);
        let clients = table.snapshot("a.test").unwrap();
        clients.iter().find(|c| c.address == "10.0.0.2:9000").unwrap().set_alive(true);

        for _ in 0..20 {
            let picked = table.select("a.test").unwrap();
            assert_eq!(picked.address, "10.0.0.2:9000");
        }
    }
}
