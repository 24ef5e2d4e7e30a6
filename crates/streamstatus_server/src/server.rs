//! The webhook server.

use crate::auth::NotificationVerifier;
use crate::config::ServerConfig;
use crate::dispatch::SyncDispatcher;
use crate::error::ServerResult;
use crate::handler::WebhookHandler;
use crate::router::{webhook_router, AppState};
use crate::sync::{StatusSync, SyncRunner};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use streamstatus_repo::GitWorkingCopy;
use tokio::net::TcpListener;
use tracing::{error, info};

/// The webhook server.
///
/// Verifies deliveries, answers them, and hands stream changes to a single
/// sync pipeline that owns the git working copy.
///
/// # Example
///
/// ```rust,ignore
/// use streamstatus_server::{ServerConfig, WebhookServer};
///
/// let config = ServerConfig::from_env()?;
/// let server = WebhookServer::new(config)?;
/// server.serve().await?;
/// ```
pub struct WebhookServer {
    config: ServerConfig,
    state: AppState,
}

impl WebhookServer {
    /// Creates a server backed by a git working copy.
    ///
    /// Must be called inside a tokio runtime. Nothing is cloned until the
    /// first accepted event.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let repo = GitWorkingCopy::new(config.sync.repo.clone())?;
        let runner = Arc::new(StatusSync::new(repo, config.sync.absent_policy));
        Ok(Self::with_runner(config, runner))
    }

    /// Creates a server with a custom sync runner.
    pub fn with_runner(config: ServerConfig, runner: Arc<dyn SyncRunner>) -> Self {
        let handler = WebhookHandler::new(NotificationVerifier::new(config.verifier_config()));
        let dispatcher = Arc::new(SyncDispatcher::start(config.dispatch, runner));
        Self {
            state: AppState::new(handler, dispatcher),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> Arc<SyncDispatcher> {
        Arc::clone(&self.state.dispatcher)
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        webhook_router(self.state.clone())
    }

    /// Binds the configured address and serves until ctrl-c or SIGTERM.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serves on `listener` until `signal` resolves, then waits for
    /// scheduled sync cycles to finish.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = %listener.local_addr()?, dispatch = ?self.config.dispatch, "webhook server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await?;

        self.state.dispatcher.shutdown().await;
        info!("webhook server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown requested");
}
