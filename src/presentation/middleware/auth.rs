//! Authentication Middleware
//!
//! JWT validation for protected routes. Tokens are issued by the external
//! account service; this middleware only verifies them and extracts the
//! caller identity. The subject claim is the username, canonicalized to
//! lowercase here so every downstream lookup sees one casing.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::startup::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Canonical lowercase username
    pub username: String,
}

/// Validate a token and return the canonical username it identifies.
///
/// Shared between the HTTP middleware and the WebSocket upgrade, which
/// receives its token as a query parameter instead of a header.
pub fn decode_username(token: &str, secret: &str) -> Result<String, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    let username = token_data.claims.sub.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::Unauthorized("Invalid token claims".into()));
    }

    Ok(username)
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    // Check for Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let username = decode_username(token, &state.settings.jwt.secret)?;

    // Insert authenticated user into request extensions
    request.extensions_mut().insert(AuthUser { username });

    // Continue to the next handler
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    const SECRET: &str = "test-secret-at-least-32-characters!!";

    fn token_for(sub: &str) -> String {
        let claims = Claims {
            sub: sub.into(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn username_is_canonicalized_to_lowercase() {
        let token = token_for("Alice");
        assert_eq!(decode_username(&token, SECRET).unwrap(), "alice");
    }

    #[test]
    fn garbage_tokens_are_unauthorized() {
        assert!(matches!(
            decode_username("not-a-token", SECRET),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = token_for("alice");
        assert!(matches!(
            decode_username(&token, "another-secret-of-sufficient-size!!"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
