use drivescan_core::{Config, ScanSettings, ServiceAccountKey};
use std::path::Path;
use std::sync::Arc;

use crate::auth::{ServiceAccountTokenProvider, TokenProvider};
use crate::drive::{build_http_client, GoogleDriveClient};
use crate::traits::{DirectoryClient, DirectoryError, DirectoryResult};

/// Create the Drive client for one run from the decoded key file
pub async fn create_directory_client(
    config: &Config,
    settings: &ScanSettings,
    credentials_path: &Path,
) -> DirectoryResult<Arc<dyn DirectoryClient>> {
    if !credentials_path.is_file() {
        return Err(DirectoryError::Config(format!(
            "Credentials file does not exist: {}",
            credentials_path.display()
        )));
    }

    let key = ServiceAccountKey::from_file(credentials_path)
        .await
        .map_err(|e| DirectoryError::Config(e.to_string()))?;

    let http_client =
        build_http_client(&settings.application_name, config.drive_request_timeout())?;
    let tokens = Arc::new(ServiceAccountTokenProvider::new(key, http_client.clone()));

    Ok(drive_client(config, http_client, tokens))
}

/// Create the Drive client with an externally supplied token source
pub fn create_directory_client_with_tokens(
    config: &Config,
    settings: &ScanSettings,
    tokens: Arc<dyn TokenProvider>,
) -> DirectoryResult<Arc<dyn DirectoryClient>> {
    let http_client =
        build_http_client(&settings.application_name, config.drive_request_timeout())?;
    Ok(drive_client(config, http_client, tokens))
}

fn drive_client(
    config: &Config,
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
) -> Arc<dyn DirectoryClient> {
    let client =
        GoogleDriveClient::with_http_client(http_client, &config.drive_api_base_url, tokens);

    tracing::debug!(
        backend = client.backend_name(),
        base_url = %config.drive_api_base_url,
        "Directory client created"
    );

    Arc::new(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use std::collections::HashMap;

    fn settings() -> (Config, ScanSettings) {
        let vars: HashMap<&str, &str> = [
            ("ROOT_FOLDER_ID", "root"),
            ("APPLICATION_NAME", "drivescan-test"),
            ("API_ENDPOINT", "http://127.0.0.1:9/hook"),
            ("CREDENTIALS", "e30="),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        let settings = config.scan_settings().unwrap();
        (config, settings)
    }

    #[tokio::test]
    async fn test_missing_credentials_file() {
        let (config, settings) = settings();
        let dir = tempfile::tempdir().unwrap();
        let result =
            create_directory_client(&config, &settings, &dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(DirectoryError::Config(_))));
    }

    #[tokio::test]
    async fn test_creates_drive_client() {
        let (config, settings) = settings();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service-account.json");
        std::fs::write(
            &path,
            r#"{"client_email":"svc@example.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();

        let client = create_directory_client(&config, &settings, &path)
            .await
            .unwrap();
        assert_eq!(client.backend_name(), "google-drive");
    }

    #[tokio::test]
    async fn test_supplied_tokens_need_no_key_file() {
        let (config, settings) = settings();
        let client = create_directory_client_with_tokens(
            &config,
            &settings,
            Arc::new(StaticToken::new("local-token")),
        )
        .unwrap();
        assert_eq!(client.backend_name(), "google-drive");
    }
}
