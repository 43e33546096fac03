//! Network reachability probe
//!
//! The staleness policy only refreshes a snapshot when the backend is
//! reachable; otherwise the cached copy is served as-is. A cheap TCP
//! connect to the identity provider stands in for full connectivity.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

const PROBE_HOST: &str = "login.microsoftonline.com:443";
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// True when the backend endpoints appear reachable.
pub fn is_online() -> bool {
    let addrs = match PROBE_HOST.to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!(error = %e, "name resolution failed, treating as offline");
            return false;
        }
    };
    for addr in addrs {
        if TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok() {
            return true;
        }
    }
    debug!("no probe address reachable, treating as offline");
    false
}
