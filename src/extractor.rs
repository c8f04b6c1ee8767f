use axum::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

const SESSION_COOKIE: &str = "auth_token";
const SYSTEM_ADMIN_ROLE: &str = "system_admin";

#[derive(Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    role: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Acting user resolved from the session token.
pub struct AuthUser {
    pub user_id: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_system_admin(&self) -> bool {
        self.role == SYSTEM_ADMIN_ROLE
    }

    pub fn require_system_admin(&self) -> AppResult<()> {
        if self.is_system_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("system admin role required".into()))
        }
    }
}

// Bearer header wins over the session cookie.
fn session_token(parts: &Parts) -> Option<&str> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    bearer.or_else(|| {
        parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())?
            .split(';')
            .find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
            })
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(AppError::Unauthorized)?;
        let secret = crate::config::JWT_SECRET.as_str();
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?
        .claims;
        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }
        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
