//! Duplicate-submission protection for the public apply endpoint.
//!
//! The apply form sends an `idempotencyKey` derived from the job, the
//! candidate email and a per-form nonce. The first request reserves the key;
//! a retry with the same key either replays the stored application or is
//! told the original is still in flight.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

const KEY_PREFIX: &str = "recruit:apply:";
const PENDING: &str = "pending";
const MIN_KEY_LEN: usize = 8;
const MAX_KEY_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The caller owns the key and must `complete` or `release` it.
    Fresh,
    /// Another request with this key has not finished yet.
    Pending,
    /// A request with this key already created this application.
    Completed(Uuid),
}

#[async_trait]
pub trait SubmissionGuard: Send + Sync {
    async fn reserve(&self, key: &str) -> Result<Reservation, AppError>;
    async fn complete(&self, key: &str, application_id: Uuid) -> Result<(), AppError>;
    async fn release(&self, key: &str) -> Result<(), AppError>;
}

pub fn validate_key(key: &str) -> Result<(), AppError> {
    let well_formed = (MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key.len())
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if well_formed {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "idempotencyKey must be {MIN_KEY_LEN}-{MAX_KEY_LEN} characters of letters, digits, '-' or '_'"
        )))
    }
}

/// Reads a stored reservation value.
fn parse_reservation(value: &str) -> Reservation {
    match Uuid::parse_str(value) {
        Ok(id) => Reservation::Completed(id),
        Err(_) => Reservation::Pending,
    }
}

/// Redis-backed guard. Keys expire after `ttl_secs`, after which the
/// database lookup on `idempotency_key` still catches replays.
#[derive(Clone)]
pub struct RedisSubmissionGuard {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisSubmissionGuard {
    pub async fn connect(client: &redis::Client, ttl_secs: u64) -> Result<Self, AppError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn, ttl_secs })
    }
}

#[async_trait]
impl SubmissionGuard for RedisSubmissionGuard {
    async fn reserve(&self, key: &str) -> Result<Reservation, AppError> {
        let redis_key = format!("{KEY_PREFIX}{key}");
        let mut conn = self.conn.clone();

        let claimed: Option<String> = redis::cmd("SET")
            .arg(&redis_key)
            .arg(PENDING)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;
        if claimed.is_some() {
            return Ok(Reservation::Fresh);
        }

        let existing: Option<String> = redis::cmd("GET")
            .arg(&redis_key)
            .query_async(&mut conn)
            .await?;
        let reservation = existing
            .as_deref()
            .map(parse_reservation)
            .unwrap_or(Reservation::Pending);
        debug!(key, ?reservation, "Submission key already reserved");
        Ok(reservation)
    }

    async fn complete(&self, key: &str, application_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(format!("{KEY_PREFIX}{key}"))
            .arg(application_id.to_string())
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn release(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(format!("{KEY_PREFIX}{key}"))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("3f1a9c0b7d2e4f56").is_ok());
        assert!(validate_key("short").is_err());
        assert!(validate_key("has spaces in it").is_err());
        assert!(validate_key(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_parse_reservation() {
        let id = Uuid::new_v4();
        assert_eq!(parse_reservation(&id.to_string()), Reservation::Completed(id));
        assert_eq!(parse_reservation(PENDING), Reservation::Pending);
    }
}
