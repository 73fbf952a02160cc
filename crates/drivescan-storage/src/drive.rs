//! Google Drive v3 listing client

use async_trait::async_trait;
use drivescan_core::models::item::FOLDER_MIME_TYPE;
use drivescan_core::{ChildKind, RemoteItem};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenProvider;
use crate::traits::{DirectoryClient, DirectoryError, DirectoryResult};

/// Only the fields the scanner forwards are requested
const LISTING_FIELDS: &str = "nextPageToken, files(id, name)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Drive client that answers `files.list` queries for one parent at a time
pub struct GoogleDriveClient {
    http_client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl Debug for GoogleDriveClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GoogleDriveClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleDriveClient {
    /// Create a client with its own HTTP connection pool.
    ///
    /// `application_name` is sent as the User-Agent of every request.
    pub fn new(
        base_url: &str,
        application_name: &str,
        request_timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> DirectoryResult<Self> {
        let http_client = build_http_client(application_name, request_timeout)?;
        Ok(Self::with_http_client(http_client, base_url, tokens))
    }

    pub fn with_http_client(
        http_client: Client,
        base_url: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Build the `q` expression selecting direct children of one kind
    pub fn listing_query(folder_id: &str, kind: ChildKind) -> String {
        let operator = match kind {
            ChildKind::Folder => "=",
            ChildKind::File => "!=",
        };
        format!(
            "'{}' in parents and mimeType {} '{}'",
            escape_query_literal(folder_id),
            operator,
            FOLDER_MIME_TYPE
        )
    }
}

/// Build the HTTP client shared by listing and token requests
pub fn build_http_client(application_name: &str, request_timeout: Duration) -> DirectoryResult<Client> {
    Client::builder()
        .timeout(request_timeout)
        .user_agent(application_name)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| DirectoryError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Escape a value for use inside a single-quoted query literal
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl DirectoryClient for GoogleDriveClient {
    #[tracing::instrument(skip(self), fields(backend = "google-drive"))]
    async fn list_children(
        &self,
        folder_id: &str,
        kind: ChildKind,
    ) -> DirectoryResult<Vec<RemoteItem>> {
        let token = self.tokens.access_token().await?;
        let query = Self::listing_query(folder_id, kind);

        let response = self
            .http_client
            .get(format!("{}/files", self.base_url))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", LISTING_FIELDS)])
            .send()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(folder_id.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Failed to read response body"));
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;
        let listing: FileList =
            serde_json::from_str(&body).map_err(|e| DirectoryError::Decode(e.to_string()))?;

        if listing.next_page_token.is_some() {
            // Pagination is not followed; large folders are reported partially
            tracing::warn!(
                folder_id = %folder_id,
                kind = %kind,
                returned = listing.files.len(),
                "Listing truncated to first page"
            );
        }

        Ok(listing.files)
    }

    fn backend_name(&self) -> &'static str {
        "google-drive"
    }
}
