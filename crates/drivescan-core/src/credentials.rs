//! Service-account credentials
//!
//! The credential blob arrives base64-encoded through configuration. Each run
//! decodes it into a key file that the directory client reads back.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::CredentialError;

/// File name of the decoded key inside the credentials directory
pub const CREDENTIALS_FILE_NAME: &str = "service-account.json";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account key document that the client needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(bytes: &[u8]) -> Result<Self, CredentialError> {
        serde_json::from_slice(bytes).map_err(CredentialError::Invalid)
    }

    pub async fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CredentialError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&bytes)
    }
}

impl Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Decode the base64 credential blob and write it to `<dir>/service-account.json`.
///
/// Whitespace anywhere in the blob is ignored, so line-wrapped encoder output
/// is accepted. The document is checked to be a service-account key before
/// anything is written. Returns the path of the written file.
#[tracing::instrument(skip(encoded))]
pub async fn decode_credentials(encoded: &str, dir: &Path) -> Result<PathBuf, CredentialError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let decoded = STANDARD.decode(compact)?;
    ServiceAccountKey::from_json(&decoded)?;

    let path = dir.join(CREDENTIALS_FILE_NAME);
    write_private(&path, &decoded)
        .await
        .map_err(|source| CredentialError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), "Credentials written to temp file");
    Ok(path)
}

async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    // `mode` only applies on creation; tighten a file left by an earlier run
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    file.write_all(contents).await?;
    file.flush().await?;
    Ok(())
}
