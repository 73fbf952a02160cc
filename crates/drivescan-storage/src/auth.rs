//! Access tokens for the Drive API
//!
//! Service accounts authenticate with the OAuth2 JWT-bearer grant: a short-lived
//! RS256 assertion signed with the account's private key is exchanged for an
//! access token at the key's `token_uri`.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use drivescan_core::ServiceAccountKey;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::traits::{DirectoryError, DirectoryResult};

/// Read-only Drive scope; the scanner never writes
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Supplies bearer tokens for listing requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> DirectoryResult<String>;
}

/// A fixed token, for local endpoints and tests
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> DirectoryResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Token provider backed by a service-account key, caching the access token
/// until shortly before it expires
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    http_client: Client,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey, http_client: Client) -> Self {
        Self {
            key,
            http_client,
            scope: DRIVE_READONLY_SCOPE.to_string(),
            cached: Mutex::new(None),
        }
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> DirectoryResult<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| DirectoryError::Auth(format!("Invalid private key: {}", e)))?;

        encode(&header, &claims, &encoding_key)
            .map_err(|e| DirectoryError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    async fn exchange(&self, assertion: &str) -> DirectoryResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DirectoryError::Auth(format!(
                "Token endpoint returned {} - {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Malformed token response: {}", e)))
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    #[tracing::instrument(skip(self), fields(client_email = %self.key.client_email))]
    async fn access_token(&self) -> DirectoryResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let assertion = self.sign_assertion(now)?;
        let response = self.exchange(&assertion).await?;

        tracing::debug!(expires_in = response.expires_in, "Obtained Drive access token");

        let token = response.access_token;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: now + ChronoDuration::seconds(response.expires_in),
        });
        Ok(token)
    }
}
