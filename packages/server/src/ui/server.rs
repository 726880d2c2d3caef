//! Server execution logic.

use std::{future::Future, io, net::SocketAddr, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig, domain::Connection, infrastructure::StreamConnection,
    usecase::ChatManager,
};

use super::{
    handler::{RawSession, SessionLimits, get_history, post_message},
    signal::shutdown_signal,
    state::AppState,
};

/// Chat server: the raw TCP protocol plus the HTTP facade
///
/// # Example
///
/// ```ignore
/// let manager = Arc::new(ChatManager::new(Arc::new(OutboxPusher), None, 100, Arc::new(SystemClock)));
/// Server::new(manager, ServerConfig::default()).run().await?;
/// ```
pub struct Server {
    /// ChatManager（参加者管理とブロードキャスト）
    manager: Arc<ChatManager>,
    config: ServerConfig,
}

impl Server {
    pub fn new(manager: Arc<ChatManager>, config: ServerConfig) -> Self {
        Self { manager, config }
    }

    /// Bind both listeners without accepting connections yet
    ///
    /// # Errors
    ///
    /// Returns an error if either address cannot be bound.
    pub async fn bind(self) -> io::Result<BoundServer> {
        let raw_listener = TcpListener::bind(&self.config.address).await?;
        let http_listener = TcpListener::bind(&self.config.http_address).await?;
        Ok(BoundServer {
            raw_listener,
            http_listener,
            manager: self.manager,
            config: self.config,
        })
    }

    /// Bind and serve until Ctrl+C
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bound = self.bind().await?;
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        bound.serve(shutdown_signal()).await?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// A server whose listeners are bound
pub struct BoundServer {
    raw_listener: TcpListener,
    http_listener: TcpListener,
    manager: Arc<ChatManager>,
    config: ServerConfig,
}

impl BoundServer {
    pub fn raw_addr(&self) -> io::Result<SocketAddr> {
        self.raw_listener.local_addr()
    }

    pub fn http_addr(&self) -> io::Result<SocketAddr> {
        self.http_listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Sessions already running are not interrupted by shutdown; they end
    /// with the process.
    pub async fn serve<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        tokio::spawn(async move {
            shutdown.await;
            let _ = shutdown_tx.send(());
        });

        tracing::info!("Chat server listening on {}", self.raw_addr()?);
        tracing::info!("HTTP facade listening on http://{}/chat", self.http_addr()?);

        let limits = self.config.session_limits();
        let app = router(Arc::new(AppState {
            manager: self.manager.clone(),
            limits,
            max_history_lines: self.config.max_history_lines,
        }));

        let mut http_shutdown = shutdown_rx.clone();
        let http = axum::serve(self.http_listener, app).with_graceful_shutdown(async move {
            let _ = http_shutdown.changed().await;
        });
        let raw = accept_loop(self.raw_listener, self.manager, limits, shutdown_rx);

        let (http_result, ()) = tokio::join!(http.into_future(), raw);
        http_result
    }
}

/// Routes of the HTTP facade
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.limits.msg_buffer_size;
    Router::new()
        .route("/chat", get(get_history).post(post_message))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn accept_loop(
    listener: TcpListener,
    manager: Arc<ChatManager>,
    limits: SessionLimits,
    mut shutdown: watch::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("Chat listener shutting down");
                break;
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        let peer = addr.to_string();
                        tracing::debug!("Accepted connection from {}", peer);
                        let conn: Arc<dyn Connection> =
                            Arc::new(StreamConnection::new(stream, peer.clone()));
                        let session = RawSession::new(manager.clone(), conn, limits, peer);
                        tokio::spawn(session.run());
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);
                    }
                }
            }
        }
    }
}
