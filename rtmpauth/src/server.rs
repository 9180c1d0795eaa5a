//! Service wiring and the server lifecycle

use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use rtmpauth_api::{create_router, AppState};
use rtmpauth_core::{
    notify::{NotificationDispatcher, WebhookSink},
    scheduler::PollScheduler,
    store::{PublisherStore, SqlitePublisherStore},
    stream::{Reconciler, StreamAuthorizer},
    twitch::{ClientCredentials, CredentialCache, HelixClient, StatusFetcher},
    Config,
};

const SCHEDULER_STOP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RtmpAuthServer {
    config: Config,
    store: Arc<SqlitePublisherStore>,
    state: AppState,
    scheduler: Option<Arc<PollScheduler>>,
}

impl RtmpAuthServer {
    /// Open the store and build every service from configuration
    pub async fn build(config: Config) -> Result<Self> {
        let store = Arc::new(
            SqlitePublisherStore::open(&config.database.path)
                .await
                .with_context(|| format!("failed to open database at {}", config.database.path))?,
        );
        let dyn_store: Arc<dyn PublisherStore> = store.clone();

        let sink = Arc::new(WebhookSink::new(&config.webhook)?);
        let dispatcher = Arc::new(NotificationDispatcher::new(dyn_store.clone(), sink));
        let authorizer = Arc::new(StreamAuthorizer::new(dyn_store.clone(), config.rtmp.clone()));

        let scheduler = if config.twitch.enabled {
            let helix = Arc::new(HelixClient::new(&config.twitch)?);
            let credentials = ClientCredentials::new(
                config.twitch.client_id.clone(),
                config.twitch.client_secret.clone(),
            );
            let cache = Arc::new(CredentialCache::new(credentials, helix.clone()));
            let fetcher = Arc::new(StatusFetcher::new(helix, cache));
            let reconciler = Arc::new(Reconciler::new(
                dyn_store.clone(),
                fetcher.clone(),
                config.twitch.viewer_base_url.clone(),
            ));
            Some(Arc::new(PollScheduler::new(
                dyn_store.clone(),
                fetcher,
                reconciler,
                dispatcher.clone(),
                config.twitch.poll_interval(),
            )))
        } else {
            info!("Twitch integration disabled, poll scheduler not started");
            None
        };

        let state = AppState {
            store: dyn_store,
            authorizer,
            dispatcher,
        };

        Ok(Self {
            config,
            store,
            state,
            scheduler,
        })
    }

    pub async fn run(self) -> Result<()> {
        let scheduler_handle: Option<JoinHandle<()>> =
            self.scheduler.as_ref().map(|s| s.clone().start());

        let address = self.config.http_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        info!("HTTP server listening on {}", address);

        let router = create_router(self.state.clone());
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        if let Err(e) = &served {
            error!("HTTP server error: {}", e);
        }

        self.shutdown(scheduler_handle).await;
        served.context("HTTP server failed")
    }

    async fn shutdown(&self, scheduler_handle: Option<JoinHandle<()>>) {
        info!("Shutting down rtmpauth server...");

        if let (Some(scheduler), Some(handle)) = (&self.scheduler, scheduler_handle) {
            scheduler.shutdown();
            match tokio::time::timeout(SCHEDULER_STOP_TIMEOUT, handle).await {
                Ok(Ok(())) => info!("Poll scheduler stopped"),
                Ok(Err(e)) => error!("Poll scheduler task failed: {}", e),
                Err(_) => warn!(
                    "Poll scheduler did not stop within {}s",
                    SCHEDULER_STOP_TIMEOUT.as_secs()
                ),
            }
        }

        self.store.close().await;
        info!("Shutdown complete");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C signal");
            }
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Shutdown signal received, starting graceful shutdown...");
}
