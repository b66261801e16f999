use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL resumes are served from; defaults to `{S3_ENDPOINT}/{S3_BUCKET}`.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Shared secret used to verify bearer tokens minted by the identity service.
    pub auth_signing_key: String,
    /// Transactional mail relay. When unset, emails are only logged.
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub company_name: String,
    /// Public base URL of this API, used in offer-letter links.
    pub server_url: String,
    /// Base URL of the web client, used in offer accept links.
    pub client_url: String,
    pub submission_key_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let s3_bucket = require_env("S3_BUCKET")?;
        let s3_public_url = optional_env("S3_PUBLIC_URL").unwrap_or_else(|| {
            format!("{}/{}", s3_endpoint.trim_end_matches('/'), s3_bucket)
        });
        let company_name = env_or("COMPANY_NAME", "Our Company");

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket,
            s3_endpoint,
            s3_public_url,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            auth_signing_key: require_env("AUTH_SIGNING_KEY")?,
            mail_api_url: optional_env("MAIL_API_URL"),
            mail_api_key: optional_env("MAIL_API_KEY"),
            mail_from: optional_env("MAIL_FROM")
                .unwrap_or_else(|| format!("{company_name} <no-reply@localhost>")),
            company_name,
            server_url: env_or("SERVER_URL", "http://localhost:8080"),
            client_url: env_or("CLIENT_URL", "http://localhost:5173"),
            submission_key_ttl_secs: env_or("SUBMISSION_KEY_TTL_SECS", "86400")
                .parse::<u64>()
                .context("SUBMISSION_KEY_TTL_SECS must be a number of seconds")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
