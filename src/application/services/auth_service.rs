//! Authentication Service
//!
//! The session authority: issues short-lived access tokens and long-lived
//! refresh tokens bound to a per-user session version, and validates them
//! against the currently stored version.
//!
//! Rotating the opaque version string (rather than keeping a deny-list of
//! individual tokens) gives O(1) global invalidation per user: every token
//! minted under a previous version fails the version check on its next use.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::{SessionStore, User, UserRepository};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and issue their first session
    async fn register(&self, username: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Authenticate credentials and issue a fresh session
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new access token carrying the same
    /// session version. `None` means the caller sent no token at all.
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError>;

    /// Validate an access token, including the session version re-check
    async fn validate_access(&self, access_token: &str) -> Result<Claims, AuthError>;
}

/// Access and refresh token pair issued on registration/login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject username
    pub username: String,
    /// Session version the token was minted under
    #[serde(rename = "sessionVersion")]
    pub session_version: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No token sent")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    /// Signature was valid but the session has been rotated or has lapsed.
    /// Distinguishable from `InvalidToken` so clients know a refresh will
    /// not help and a full re-login is required.
    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// AuthService implementation
pub struct AuthServiceImpl<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    session_store: Arc<S>,
    jwt_settings: JwtSettings,
}

impl<U, S> AuthServiceImpl<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    /// Create a new AuthServiceImpl
    pub fn new(user_repo: Arc<U>, session_store: Arc<S>, jwt_settings: JwtSettings) -> Self {
        Self {
            user_repo,
            session_store,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate a fresh session version, store it with its TTL, and sign
    /// both tokens with the version embedded. Replacing the stored version
    /// is what invalidates any previously issued tokens for the user.
    async fn issue_session(&self, username: &str) -> Result<TokenPair, AuthError> {
        let session_version = Uuid::new_v4().to_string();
        let ttl_seconds = (self.jwt_settings.session_ttl_days * 24 * 60 * 60) as u64;

        self.session_store
            .put(username, &session_version, ttl_seconds)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let access_token = self.mint_access_token(username, &session_version)?;
        let refresh_token = self.mint_refresh_token(username, &session_version)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mint a short-lived access token
    fn mint_access_token(&self, username: &str, version: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            session_version: version.to_string(),
            exp: (now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes))
                .timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.access_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Mint a long-lived refresh token
    fn mint_refresh_token(&self, username: &str, version: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            session_version: version.to_string(),
            exp: (now + Duration::days(self.jwt_settings.refresh_token_expiry_days)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.refresh_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decode a token; bad signature or expiry both surface as InvalidToken
    fn decode_token(&self, token: &str, secret: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Compare the embedded session version against the stored one.
    /// A missing record means the session lapsed; a mismatch means it was
    /// rotated by a newer login.
    async fn check_session_version(&self, claims: &Claims) -> Result<(), AuthError> {
        let current = self
            .session_store
            .current(&claims.username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        match current {
            Some(version) if version == claims.session_version => Ok(()),
            _ => Err(AuthError::SessionExpired),
        }
    }
}

#[async_trait]
impl<U, S> AuthService for AuthServiceImpl<U, S>
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    async fn register(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        if self
            .user_repo
            .exists(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.hash_password(password)?;
        let user = User {
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        self.user_repo
            .create(&user)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(username, "User registered");

        self.issue_session(username).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(username).await
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError> {
        let refresh_token = refresh_token.ok_or(AuthError::NoToken)?;
        let claims = self.decode_token(refresh_token, &self.jwt_settings.refresh_secret)?;

        // The stored version must still match the one the refresh token was
        // minted under; a newer login elsewhere rotates it and this fails.
        self.check_session_version(&claims).await?;

        self.mint_access_token(&claims.username, &claims.session_version)
    }

    async fn validate_access(&self, access_token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode_token(access_token, &self.jwt_settings.access_secret)?;
        self.check_session_version(&claims).await?;
        Ok(claims)
    }
}
