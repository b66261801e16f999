//! Bearer-token authentication for staff endpoints.
//!
//! Tokens are minted by the identity service and look like
//! `base64url(claims-json).base64url(hmac-sha256)`, signed with the shared
//! `AUTH_SIGNING_KEY`. This module only verifies them and resolves the role.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    /// Expiry as a unix timestamp in seconds.
    exp: i64,
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<[u8]>,
}

impl TokenVerifier {
    pub fn new(signing_key: &str) -> Self {
        Self {
            key: Arc::from(signing_key.as_bytes()),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid signing key: {e}")))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn issue(&self, actor: Actor, ttl: chrono::Duration) -> Result<String, AppError> {
        let claims = Claims {
            sub: actor.user_id,
            role: actor.role,
            exp: (Utc::now() + ttl).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).map_err(|e| AppError::Internal(e.into()))?,
        );
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Actor, AppError> {
        let (payload, signature) = token.split_once('.').ok_or(AppError::Unauthorized)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::Unauthorized)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            debug!("Rejected token with bad signature");
            AppError::Unauthorized
        })?;

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .ok_or(AppError::Unauthorized)?;

        if claims.exp <= Utc::now().timestamp() {
            debug!(user_id = %claims.sub, "Rejected expired token");
            return Err(AppError::Unauthorized);
        }

        Ok(Actor {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn bearer_actor(parts: &Parts, verifier: &TokenVerifier) -> Result<Actor, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;
    verifier.verify(token)
}

/// Any authenticated admin or HR user.
pub struct Staff(pub Actor);

/// An authenticated admin.
pub struct Admin(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for Staff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        bearer_actor(parts, &state.tokens).map(Staff)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let actor = bearer_actor(parts, &state.tokens)?;
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        Ok(Admin(actor))
    }
}
