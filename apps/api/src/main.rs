mod applications;
mod auth;
mod config;
mod dashboard;
mod db;
mod errors;
mod extract;
mod idempotency;
mod interviews;
mod jobs;
mod models;
mod notify;
mod offers;
mod routes;
mod state;
mod storage;
mod store;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::idempotency::RedisSubmissionGuard;
use crate::notify::{HttpMailer, LogMailer, Notifier};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3ResumeStorage;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let submissions = RedisSubmissionGuard::connect(&redis, config.submission_key_ttl_secs).await?;
    info!("Redis submission guard initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let resumes = S3ResumeStorage::new(s3, config.s3_bucket.clone(), config.s3_public_url.clone());
    info!("S3 resume storage initialized (bucket: {})", config.s3_bucket);

    // Initialize mail delivery
    let notifier: Arc<dyn Notifier> = match &config.mail_api_url {
        Some(url) => {
            info!("Mail relay configured: {url}");
            Arc::new(HttpMailer::new(
                url.clone(),
                config.mail_api_key.clone(),
                config.mail_from.clone(),
            )?)
        }
        None => {
            info!("MAIL_API_URL not set; emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // Build app state
    let state = AppState {
        jobs: store.clone(),
        applications: store.clone(),
        interviews: store.clone(),
        offers: store,
        resumes: Arc::new(resumes),
        notifier,
        submissions: Arc::new(submissions),
        tokens: TokenVerifier::new(&config.auth_signing_key),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to CLIENT_URL once the web client is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "recruit-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
