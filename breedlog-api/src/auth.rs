//! Bearer token verification
//!
//! Tokens are issued elsewhere; this service only verifies HS256 signatures,
//! expiry and (optionally) audience, then takes the `sub` claim as the
//! caller's user id. A verified caller seen for the first time gets an
//! empty profile.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use breedlog_common::db::profiles;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// HS256 verifier shared through `AppState`
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        match audience {
            Some(aud) => {
                validation.set_audience(&[aud]);
                validation.set_required_spec_claims(&["exp", "sub", "aud"]);
            }
            None => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&["exp", "sub"]);
            }
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify `token` and return the subject as a user id
    pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ApiError::Unauthorized("Token subject is not a user id".to_string()))
    }
}

/// Authenticated caller, extracted from `Authorization: Bearer <jwt>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let token = bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Malformed Authorization header".to_string()))?;

        let user_id = state.auth.verify(token)?;

        if profiles::register(&state.db, user_id).await? {
            info!("Registered profile for new user {}", user_id);
        }

        Ok(AuthUser { user_id })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
