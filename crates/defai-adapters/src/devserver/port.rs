use tokio::net::TcpListener;
use tracing::debug;

use super::DevServerError;

/// How many ports above the requested one are tried.
const PORT_SEARCH_SPAN: u16 = 100;

/// First port at or above `start` that `host` can bind.
pub async fn find_available_port(host: &str, start: u16) -> Result<u16, DevServerError> {
    let end = start.saturating_add(PORT_SEARCH_SPAN);
    for port in start..=end {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                drop(listener);
                return Ok(port);
            }
            Err(e) => debug!(port, error = %e, "port unavailable"),
        }
    }
    Err(DevServerError::NoFreePort { start, end })
}
