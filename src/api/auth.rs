//! Bearer-token authentication.
//!
//! Tokens are HS256-signed JWTs whose `sub` claim names a stored user. The
//! verifier is a pure gate: it checks the header, verifies the signature and
//! expiry against the configured secret, resolves the user, and attaches the
//! resolved identity to the request. It never mutates stored state.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserResponse};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_email;

/// Claims embedded in an access token. `sub` carries the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Sign an access token for a user
pub fn issue_token(
    user_id: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token's signature and expiry, returning its claims.
fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let reason = match e.kind() {
            ErrorKind::ExpiredSignature => "token expired".to_string(),
            ErrorKind::InvalidSignature => "invalid signature".to_string(),
            _ => e.to_string(),
        };
        ApiError::invalid_token().with_detail(reason)
    })
}

/// Extract the bearer token from an Authorization header value.
fn extract_bearer(header: Option<&str>) -> Result<&str, ApiError> {
    let header = header
        .ok_or_else(|| ApiError::missing_credential("Unauthorized. Authentication required."))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::missing_credential("Unauthorized. Authentication required."))?;

    if token.is_empty() {
        return Err(ApiError::missing_credential(
            "Unauthorized. Valid token required.",
        ));
    }

    Ok(token)
}

/// Validate a presented credential and resolve it to a stored user.
pub async fn authenticate(
    state: &AppState,
    authorization: Option<&str>,
) -> Result<UserResponse, ApiError> {
    let token = extract_bearer(authorization)?;
    let claims = verify_token(token, &state.config.auth.jwt_secret)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&claims.sub)
        .fetch_optional(&state.db)
        .await?;

    user.map(UserResponse::from)
        .ok_or_else(|| ApiError::unknown_identity("User not found"))
}

/// Extractor for the authenticated caller. Protected handlers take this as
/// an argument; requests without a valid token never reach them.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for UserResponse {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        authenticate(state, authorization.as_deref()).await
    }
}

/// Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    validate_email(&request.email).map_err(ApiError::validation)?;
    if request.password.chars().count() < 8 {
        return Err(ApiError::validation(
            "password must be at least 8 characters",
        ));
    }

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::duplicate_email(
            "User with this email already exists",
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to register user")
    })?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&now)
    .execute(&state.db)
    .await?;

    tracing::info!(user_email = %request.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse {
                id,
                name: request.name,
                email: request.email,
            },
        }),
    ))
}

/// Login endpoint: verify credentials and issue a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::invalid_credentials("Invalid credentials"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::invalid_credentials("Invalid credentials"));
    }

    let token = issue_token(
        &user.id,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to sign token");
        ApiError::internal("Failed to issue token")
    })?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;
    use crate::config::Config;
    use crate::db::test_pool;

    const SECRET: &str = "test-secret";

    async fn test_state() -> AppState {
        let mut config = Config::default();
        config.auth.jwt_secret = SECRET.to_string();
        AppState::new(config, test_pool().await)
    }

    async fn insert_user(state: &AppState, id: &str, email: &str) {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind("Test User")
        .bind(email)
        .bind(hash_password("hunter2hunter2").unwrap())
        .bind(Utc::now().to_rfc3339())
        .execute(&state.db)
        .await
        .unwrap();
    }

    #[test]
    fn test_extract_bearer() {
        assert!(extract_bearer(Some("Bearer abc123")).is_ok());
        assert_eq!(extract_bearer(Some("Bearer abc123")).unwrap(), "abc123");

        let err = extract_bearer(None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingCredential);

        let err = extract_bearer(Some("Basic abc123")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingCredential);

        let err = extract_bearer(Some("Bearer ")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingCredential);
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token("user-1", SECRET, 1).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("user-1", SECRET, 1).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidToken);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token("user-1", SECRET, -1).unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidToken);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = verify_token("not.a.jwt", SECRET).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidToken);
    }

    #[tokio::test]
    async fn test_authenticate_resolves_user_without_password() {
        let state = test_state().await;
        insert_user(&state, "user-1", "ann@x.com").await;

        let token = issue_token("user-1", SECRET, 1).unwrap();
        let header = format!("Bearer {}", token);
        let user = authenticate(&state, Some(&header)).await.unwrap();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let state = test_state().await;

        let token = issue_token("ghost", SECRET, 1).unwrap();
        let header = format!("Bearer {}", token);
        let err = authenticate(&state, Some(&header)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownIdentity);
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("hunter2hunter2", "not-a-hash"));
    }
}
