//! DNS resolver initialization.
//!
//! This module picks the nameservers to query and starts the resolver worker.

use std::net::SocketAddr;

use hickory_resolver::system_conf::read_system_conf;
use log::debug;

use crate::config::Config;
use crate::dns::{Resolver, RetryPolicy, TcpTransport};
use crate::error_handling::InitializationError;

/// Determines the nameservers to query.
///
/// Uses `--nameserver` values when given, otherwise the system resolver
/// configuration (`/etc/resolv.conf` on Unix). Duplicates are removed, keeping
/// the first occurrence.
///
/// # Errors
///
/// Returns `InitializationError::ResolverConfigError` if the system
/// configuration cannot be read, or `InitializationError::NoNameserversError`
/// if the resulting list is empty.
pub fn nameservers_from_config(config: &Config) -> Result<Vec<SocketAddr>, InitializationError> {
    let candidates = if config.nameservers.is_empty() {
        system_nameservers()?
    } else {
        config.nameservers.clone()
    };

    let nameservers = dedup(candidates);
    if nameservers.is_empty() {
        return Err(InitializationError::NoNameserversError);
    }
    Ok(nameservers)
}

fn system_nameservers() -> Result<Vec<SocketAddr>, InitializationError> {
    let (resolver_config, _opts) = read_system_conf()
        .map_err(|e| InitializationError::ResolverConfigError(e.to_string()))?;
    let servers: Vec<SocketAddr> = resolver_config
        .name_servers()
        .iter()
        .map(|ns| ns.socket_addr)
        .collect();
    debug!("System resolver configuration lists {servers:?}");
    Ok(servers)
}

// The system configuration lists every server once per protocol
fn dedup(servers: Vec<SocketAddr>) -> Vec<SocketAddr> {
    let mut unique = Vec::with_capacity(servers.len());
    for server in servers {
        if !unique.contains(&server) {
            unique.push(server);
        }
    }
    unique
}

/// Starts the resolver worker over DNS-over-TCP.
///
/// `retry_backoff_ms` of 0 retries failed exchanges immediately; otherwise
/// retries back off exponentially from that delay.
///
/// # Errors
///
/// Returns `InitializationError::NoNameserversError` if `nameservers` is empty.
pub fn init_resolver(
    nameservers: &[SocketAddr],
    retry_backoff_ms: u64,
) -> Result<Resolver, InitializationError> {
    Resolver::spawn(
        nameservers.to_vec(),
        TcpTransport::default(),
        RetryPolicy::from_backoff_ms(retry_backoff_ms),
    )
}
