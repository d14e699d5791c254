//! Session JWT authentication
//!
//! The server never manages passwords or sessions itself: the auth
//! collaborator mints staff tokens through `/api/session/login`
//! (shared-key gated) and the QR flow mints customer tokens. This module
//! verifies tokens and injects an [`Identity`] extension for handlers.

mod capability;

pub use capability::{CONFIRM_CAPABILITIES, Capability, SETTLE_CAPABILITIES};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

const TOKEN_EXPIRY_HOURS: i64 = 12;

/// JWT claims for a Comanda session
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id (staff user id or generated guest id)
    pub sub: String,
    /// Display name used in notifications ("updated_by")
    pub name: String,
    /// Session id; keys the in-memory cart
    pub sid: String,
    /// Assigned tenant, if any (administrators have none)
    pub tenant_id: Option<i64>,
    /// Table bound to a QR customer session
    pub table_id: Option<i64>,
    pub caps: Vec<Capability>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity extracted from the JWT
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub name: String,
    pub session_id: String,
    pub tenant_id: Option<i64>,
    pub table_id: Option<i64>,
    pub capabilities: Vec<Capability>,
}

impl Identity {
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    pub fn has_any(&self, caps: &[Capability]) -> bool {
        caps.iter().any(|c| self.has(*c))
    }

    pub fn is_staff(&self) -> bool {
        self.capabilities.iter().any(|c| c.is_staff())
    }

    pub fn is_customer(&self) -> bool {
        !self.is_staff()
    }

    /// Require a staff capability or fail with `Forbidden`
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("staff capability required".to_string()))
        }
    }
}

/// Create a signed session token
pub fn create_token(
    secret: &str,
    subject: &str,
    name: &str,
    tenant_id: Option<i64>,
    table_id: Option<i64>,
    caps: Vec<Capability>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        name: name.to_string(),
        sid: uuid::Uuid::new_v4().to_string(),
        tenant_id,
        table_id,
        caps,
        exp: (now + chrono::Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and build the request identity
pub fn verify_token(secret: &str, token: &str) -> Result<Identity, AppError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::InvalidToken
    })?;

    let claims = data.claims;
    Ok(Identity {
        subject: claims.sub,
        name: claims.name,
        session_id: claims.sid,
        tenant_id: claims.tenant_id,
        table_id: claims.table_id,
        capabilities: claims.caps,
    })
}

/// Middleware: extract and verify the bearer token, insert [`Identity`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let identity = verify_token(&state.jwt_secret, token)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
