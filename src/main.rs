#![allow(dead_code)]

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderName, Method},
    routing::post,
    BoxError, Router,
};
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use crate::{
    app::{env::Envy, errors::DefaultApiError, util::function_key::FUNCTION_KEY_HEADER},
    queues::{azure::client::AzureQueueClient, queue_service::QueueService},
};

mod app;
mod queues;
mod transactions;

// Largest message the queue service accepts.
static MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub envy: Arc<Envy>,
    pub queue_service: Option<Arc<dyn QueueService>>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(FUNCTION_KEY_HEADER)])
        .allow_methods([Method::POST]);

    Router::new()
        .route(
            "/api/SendMessage",
            post(transactions::controller::send_message),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // environment
    let app_env = env::var("APP_ENV").unwrap_or("development".to_string());
    let _ = dotenvy::from_filename(format!(".env.{}", app_env));
    let envy = match envy::from_env::<Envy>() {
        Ok(config) => config,
        Err(e) => panic!("{:#?}", e),
    };

    // properties
    let port = envy.port.to_owned().unwrap_or(7071);
    let rate_limit = envy.rate_limit_per_sec.to_owned().unwrap_or(100);

    let queue_service: Option<Arc<dyn QueueService>> = match envy.queue_connection_string() {
        Some(connection_string) => {
            let client = AzureQueueClient::from_connection_string(connection_string)
                .expect("invalid AzureWebJobsStorage connection string");
            tracing::info!("queue endpoint {}", client.connection.queue_endpoint);
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("AzureWebJobsStorage is not configured, SendMessage will fail");
            None
        }
    };

    if envy.function_key().is_none() {
        if envy.auth_disabled() {
            tracing::warn!("AUTH_DISABLED is set, SendMessage accepts requests without a function key");
        } else {
            tracing::error!("FUNCTION_KEY is not configured, SendMessage will refuse every request");
        }
    }

    let state = AppState {
        envy: Arc::new(envy),
        queue_service,
    };

    // app
    let app = router(Arc::new(state)).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|err: BoxError| async move {
                tracing::error!(%err);
                DefaultApiError::InternalServerError.value()
            }))
            .layer(BufferLayer::new(1024))
            .layer(RateLimitLayer::new(rate_limit, Duration::from_secs(1))),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    if let Err(e) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!(%e);
    }
}
