//! Response DTOs
//!
//! Data structures for API response bodies. Wire names are camelCase.

use serde::Serialize;

use crate::application::services::TokenPair;

/// Access + refresh token pair returned on registration and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Single access token returned from a refresh exchange
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Simple status message body
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}
