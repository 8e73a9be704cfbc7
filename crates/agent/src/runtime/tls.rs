//! TLS: accepted mTLS connections as a tonic transport.

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;

/// A server-side TLS stream tonic can serve over.
pub struct MtlsStream(pub TlsStream<TcpStream>);

/// Peer facts exposed to handlers through request extensions.
#[derive(Clone, Debug)]
pub struct MtlsConnectInfo {
    pub remote_addr: Option<SocketAddr>,
    /// Number of certificates in the client's chain.
    pub client_chain_len: usize,
}

impl tonic::transport::server::Connected for MtlsStream {
    type ConnectInfo = MtlsConnectInfo;

    fn connect_info(&self) -> Self::ConnectInfo {
        let (tcp, session) = self.0.get_ref();
        MtlsConnectInfo {
            remote_addr: tcp.peer_addr().ok(),
            client_chain_len: session.peer_certificates().map_or(0, |c| c.len()),
        }
    }
}

impl AsyncRead for MtlsStream {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

impl AsyncWrite for MtlsStream {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.0).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.0).poll_shutdown(cx)
    }
}
