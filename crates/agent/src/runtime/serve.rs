//! Serve: build the gRPC server and accept connections, over mTLS when
//! certificates are configured.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::StreamExt;
use tonic::transport::Server;
use tracing::{error, info, warn};

use crate::conf::AgentConfig;
use crate::diagnostics::DiagnosticsServiceImpl;
use crate::proto::diagnostics_server::DiagnosticsServer;
use crate::runtime::stop::shutdown_signal;
use crate::runtime::tls::MtlsStream;
use crate::state::SharedState;

/// Register the Diagnostics service and serve until shutdown.
pub async fn serve(state: SharedState, config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = DiagnosticsServiceImpl::new(Arc::clone(&state));

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let listener = TcpListener::bind(addr).await?;

    let router = Server::builder()
        .initial_stream_window_size(1 << 20) // 1 MiB
        .concurrency_limit_per_connection(config.max_concurrent_streams)
        .add_service(DiagnosticsServer::new(service));

    if !config.tls_enabled() {
        warn!("TLS not configured, serving plaintext gRPC");
        info!("diag-agent listening on {} (max concurrent streams: {})", addr, config.max_concurrent_streams);
        router
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown_signal())
            .await?;
        info!("Server shutdown complete");
        return Ok(());
    }

    let rustls_config = config.build_rustls_config().map_err(|e| {
        error!("Failed to load TLS certificates: {}", e);
        e
    })?;
    let tls_acceptor = TlsAcceptor::from(rustls_config);

    info!("diag-agent listening on {} (mTLS, max concurrent streams: {})", addr, config.max_concurrent_streams);

    let incoming = TcpListenerStream::new(listener)
        .then(move |result| {
            let tls_acceptor = tls_acceptor.clone();
            async move {
                match result {
                    Ok(stream) => match tls_acceptor.accept(stream).await {
                        Ok(tls_stream) => Some(Ok::<_, std::io::Error>(MtlsStream(tls_stream))),
                        Err(e) => {
                            warn!("TLS handshake failed: {}", e);
                            None
                        }
                    },
                    Err(e) => {
                        error!("TCP accept error: {}", e);
                        None
                    }
                }
            }
        })
        .filter_map(|x| x);

    router.serve_with_incoming_shutdown(incoming, shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}
