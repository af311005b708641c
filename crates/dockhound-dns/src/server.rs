//! Dual UDP/TCP DNS server lifecycle: atomic start, atomic stop.

use std::net::SocketAddr;
use std::time::Duration;

use hickory_server::ServerFuture;
use tokio::net::{TcpListener, UdpSocket};

use dockhound_common::{DockhoundError, DockhoundResult};
use dockhound_core::HostStore;

use crate::handler::Handler;

/// The TCP idle timeout hickory closes an inactive connection after.
const TCP_TIMEOUT: Duration = Duration::from_secs(5);

/// A running DNS Answer Engine. Both the UDP and TCP listeners are bound
/// before this value exists; dropping the need to track "is it up" makes
/// partial-start states unrepresentable.
pub struct DnsEngine {
    server: ServerFuture<Handler>,
}

impl DnsEngine {
    /// Bind both a UDP and a TCP listener on `addr` and start serving A/PTR
    /// queries from `store`.
    ///
    /// Readiness is only reported once both listeners are registered; if
    /// either bind fails, the other is never registered and this returns an
    /// error — there is no way to observe a half-started engine.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::Io`] if either the UDP or the TCP listener
    /// fails to bind.
    pub async fn start(addr: SocketAddr, store: HostStore) -> DockhoundResult<Self> {
        let udp = UdpSocket::bind(addr).await.map_err(DockhoundError::Io)?;
        let tcp = match TcpListener::bind(addr).await {
            Ok(tcp) => tcp,
            Err(error) => {
                // `udp` is dropped here, releasing the port; the composite
                // start never reports readiness.
                drop(udp);
                return Err(DockhoundError::Io(error));
            }
        };

        let handler = Handler::new(store);
        let mut server = ServerFuture::new(handler);
        server.register_socket(udp);
        server.register_listener(tcp, TCP_TIMEOUT);

        tracing::info!(%addr, "DNS answer engine listening on udp+tcp");

        Ok(Self { server })
    }

    /// Shut both listeners down and wait until they have fully stopped.
    pub async fn shutdown(mut self) {
        if let Err(error) = self.server.shutdown_gracefully().await {
            tracing::warn!(%error, "error while shutting down DNS answer engine");
        }
    }
}
