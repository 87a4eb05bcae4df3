//! Network reachability check used by auto mode.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub const SHEETS_HOST: &str = "sheets.googleapis.com";
pub const SHEETS_PORT: u16 = 443;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub trait ReachabilityProbe {
    fn is_reachable(&self) -> bool;
}

/// Resolves `host` and tries a TCP connect to each address until one
/// succeeds. Each attempt is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self { host: host.into(), port, timeout }
    }

    pub fn sheets_api() -> Self {
        Self::new(SHEETS_HOST, SHEETS_PORT, PROBE_TIMEOUT)
    }
}

impl ReachabilityProbe for TcpProbe {
    fn is_reachable(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                log::debug!("cannot resolve {}: {}", self.host, e);
                return false;
            }
        };

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => log::debug!("connect to {} failed: {}", addr, e),
            }
        }
        false
    }
}

/// Fixed answer, for tests and offline runs.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl ReachabilityProbe for StaticProbe {
    fn is_reachable(&self) -> bool {
        self.0
    }
}
