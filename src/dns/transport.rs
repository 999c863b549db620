//! DNS wire transport.
//!
//! This module defines the [`Transport`] seam the resolver worker exchanges
//! messages through, and the TCP implementation used in production.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::error::ProtoError;
use hickory_resolver::proto::op::Message;
use hickory_resolver::proto::serialize::binary::BinEncodable;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error_handling::ResolveError;

/// Exchanges one DNS message with one nameserver.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends `query` to `server` and returns the decoded reply.
    ///
    /// # Errors
    ///
    /// Any failure here is a transport error and is retried by the resolver.
    async fn exchange(&self, server: SocketAddr, query: &Message) -> Result<Message, ResolveError>;
}

/// DNS over TCP (RFC 1035 §4.2.2): each message is prefixed with its length as a
/// big-endian `u16`. One connection per exchange.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DNS_TIMEOUT_SECS))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, server: SocketAddr, query: &Message) -> Result<Message, ResolveError> {
        let bytes = query.to_bytes()?;
        let len = u16::try_from(bytes.len())
            .map_err(|_| ProtoError::from("query does not fit in a TCP DNS frame"))?;
        let io_err = move |source: std::io::Error| ResolveError::Io { server, source };

        let round_trip = async {
            let mut stream = TcpStream::connect(server).await.map_err(io_err)?;
            stream.write_u16(len).await.map_err(io_err)?;
            stream.write_all(&bytes).await.map_err(io_err)?;
            stream.flush().await.map_err(io_err)?;

            let reply_len = stream.read_u16().await.map_err(io_err)?;
            let mut buf = vec![0u8; usize::from(reply_len)];
            stream.read_exact(&mut buf).await.map_err(io_err)?;
            Ok::<_, ResolveError>(buf)
        };

        let buf = tokio::time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| ResolveError::Timeout { server })??;

        let reply = Message::from_vec(&buf)?;
        if reply.id() != query.id() {
            return Err(ResolveError::IdMismatch {
                server,
                expected: query.id(),
                received: reply.id(),
            });
        }
        Ok(reply)
    }
}
