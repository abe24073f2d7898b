//! Greenlight JSON API Server

use std::{process, sync::Arc};

use salvo::{
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use greenlight_app::{
    context::{AppContext, Stores},
    memory::MemoryStore,
    notifications::{LogNotifier, Notifier, WebhookNotifier},
    rate_limit::spawn_sweeper,
};

use crate::{config::ServerConfig, state::State};

mod admission;
mod config;
mod cors;
mod errors;
mod extensions;
mod healthcheck;
mod movies;
mod observability;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod tokens;
mod users;

/// Greenlight JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {init_error}");
        }

        process::exit(1);
    }

    let stores = match config.database.database_url.as_deref() {
        Some(url) => match Stores::from_database_url(url, config.database.pool_settings()).await {
            Ok(stores) => stores,
            Err(init_error) => {
                error!("failed to initialize database: {init_error}");

                process::exit(1);
            }
        },
        None => {
            warn!("DATABASE_URL is not set, records are kept in memory and lost on exit");

            Stores::memory(&Arc::new(MemoryStore::new()))
        }
    };

    let notifier: Arc<dyn Notifier> = match config.notifications.notify_webhook_url.as_deref() {
        Some(url) => Arc::new(WebhookNotifier::new(url)),
        None => Arc::new(LogNotifier),
    };

    let app = AppContext::new(stores, config.limiter.settings(), notifier);

    let background = CancellationToken::new();
    let sweeper = spawn_sweeper(Arc::clone(&app.rate_limiter), background.clone());
    let dispatcher = app.dispatcher.clone();

    let router = router::app_router(State::from_app_context(
        app,
        config.server.environment.as_str(),
    ));

    let doc = OpenApi::new("Greenlight API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let mut service = Service::new(router);

    if let Some(cors) = cors::trusted_origins(&config.cors.trusted_origins()) {
        service = service.hoop(cors);
    }

    let addr = config.socket_addr();

    info!(environment = %config.server.environment, "starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;
    let server = Server::new(listener);
    let handle = server.handle();

    // Listen for shutdown signal
    let signals = background.clone();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, signals).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(service).await;

    background.cancel();

    if let Err(join_error) = sweeper.await {
        error!("rate limit sweeper failed: {join_error}");
    }

    dispatcher.shutdown().await;

    info!("server stopped");
}
