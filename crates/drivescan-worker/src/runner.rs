//! One scheduled scan, built fresh from configuration on every run

use anyhow::Context;
use async_trait::async_trait;
use drivescan_core::{decode_credentials, Config, NoOpNotifier, Notifier};
use drivescan_infra::{HttpNotifier, HttpNotifierConfig, ScheduledTask};
use drivescan_scanner::{RunOutcome, ScanJob, ScanOrchestrator, ScanOrchestratorConfig};
use drivescan_storage::{
    create_directory_client, create_directory_client_with_tokens, DirectoryClient, TokenProvider,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub struct ScanRunner {
    config: Config,
    dry_run: bool,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl ScanRunner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dry_run: false,
            tokens: None,
        }
    }

    /// Authenticate Drive requests with `tokens` instead of the service
    /// account key
    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Scan without posting the result anywhere
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Perform a complete run and return how it ended.
    ///
    /// Configuration and credentials are checked here rather than at startup,
    /// so a bad deployment reports the problem on every tick.
    pub async fn run_once(&self) -> anyhow::Result<RunOutcome> {
        let settings = self
            .config
            .scan_settings()
            .context("Configuration is incomplete")?;

        let credentials_path =
            decode_credentials(&settings.credentials_base64, &self.config.credentials_dir)
                .await
                .context("Failed to prepare service account credentials")?;

        let client: Arc<dyn DirectoryClient> = match &self.tokens {
            Some(tokens) => {
                create_directory_client_with_tokens(&self.config, &settings, tokens.clone())
            }
            None => create_directory_client(&self.config, &settings, &credentials_path).await,
        }
        .context("Failed to create Drive client")?;

        let orchestrator = ScanOrchestrator::new(
            client,
            ScanOrchestratorConfig {
                max_concurrent_traversals: self.config.max_concurrent_traversals,
            },
        );

        let notifier: Arc<dyn Notifier> = if self.dry_run {
            Arc::new(NoOpNotifier)
        } else {
            Arc::new(
                HttpNotifier::new(
                    settings.api_endpoint.clone(),
                    HttpNotifierConfig {
                        timeout: self.config.notify_timeout(),
                        ..Default::default()
                    },
                )
                .context("Failed to create notifier")?,
            )
        };

        ScanJob::new(orchestrator, notifier)
            .run(&settings.root_folder_id)
            .await
            .context("Scan aborted")
    }
}

#[async_trait]
impl ScheduledTask for ScanRunner {
    async fn run(&self) {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("scan_run", %run_id, dry_run = self.dry_run);

        async {
            tracing::info!("Scan run started");
            match self.run_once().await {
                Ok(outcome) => {
                    tracing::info!(?outcome, "Scan run finished");
                }
                Err(e) => {
                    tracing::error!(error = %format!("{:#}", e), "Scan run failed");
                }
            }
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> &str {
        "drive-scan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivescan_core::ConfigError;
    use drivescan_storage::StaticToken;
    use mockito::{Matcher, Mock, ServerGuard};
    use std::collections::HashMap;
    use std::path::Path;

    // {"client_email":"scanner@example.iam.gserviceaccount.com","private_key":"not a pem key"}
    const UNSIGNABLE_KEY_B64: &str = "eyJjbGllbnRfZW1haWwiOiJzY2FubmVyQGV4YW1wbGUuaWFtLmdzZXJ2aWNlYWNjb3VudC5jb20iLCJwcml2YXRlX2tleSI6Im5vdCBhIHBlbSBrZXkifQ==";

    fn config(vars: &[(&str, &str)], dir: &Path) -> Config {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.insert(
            "CREDENTIALS_DIR".to_string(),
            dir.to_string_lossy().into_owned(),
        );
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[tokio::test]
    async fn test_missing_setting_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScanRunner::new(config(
            &[("APPLICATION_NAME", "scanner"), ("API_ENDPOINT", "http://localhost/x")],
            dir.path(),
        ));

        let err = runner.run_once().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Missing("ROOT_FOLDER_ID"))
        ));
    }

    #[tokio::test]
    async fn test_undecodable_credentials_fail_run() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScanRunner::new(config(
            &[
                ("ROOT_FOLDER_ID", "root"),
                ("APPLICATION_NAME", "scanner"),
                ("API_ENDPOINT", "http://localhost/x"),
                ("CREDENTIALS", "%%% not base64 %%%"),
            ],
            dir.path(),
        ));

        let err = runner.run_once().await.unwrap_err();
        assert!(format!("{:#}", err).contains("credentials"));
        assert!(!dir.path().join("service-account.json").exists());
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_run_without_notifying() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let listing = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let hook = server
            .mock("POST", "/hook")
            .expect(0)
            .create_async()
            .await;

        let base_url = server.url();
        let endpoint = format!("{}/hook", base_url);
        let runner = ScanRunner::new(config(
            &[
                ("ROOT_FOLDER_ID", "root"),
                ("APPLICATION_NAME", "scanner"),
                ("API_ENDPOINT", endpoint.as_str()),
                ("CREDENTIALS", UNSIGNABLE_KEY_B64),
                ("DRIVE_API_BASE_URL", base_url.as_str()),
            ],
            dir.path(),
        ));

        let err = runner.run_once().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Scan aborted"));
        assert!(dir.path().join("service-account.json").is_file());
        listing.assert_async().await;
        hook.assert_async().await;
    }

    async fn listing(server: &mut ServerGuard, query: &str, body: &str) -> Mock {
        server
            .mock("GET", "/files")
            .match_query(Matcher::UrlEncoded("q".into(), query.into()))
            .match_header("authorization", "Bearer local-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// root -> A (f1, f2)
    async fn drive_with_one_subfolder(server: &mut ServerGuard) -> Vec<Mock> {
        vec![
            listing(
                server,
                "'root' in parents and mimeType = 'application/vnd.google-apps.folder'",
                r#"{"files":[{"id":"A","name":"Inbox"}]}"#,
            )
            .await,
            listing(
                server,
                "'A' in parents and mimeType != 'application/vnd.google-apps.folder'",
                r#"{"files":[{"id":"f1","name":"a.txt"},{"id":"f2","name":"b.txt"}]}"#,
            )
            .await,
            listing(
                server,
                "'A' in parents and mimeType = 'application/vnd.google-apps.folder'",
                r#"{"files":[]}"#,
            )
            .await,
        ]
    }

    fn runner_for(server_url: &str, dir: &Path) -> ScanRunner {
        let endpoint = format!("{}/hook", server_url);
        ScanRunner::new(config(
            &[
                ("ROOT_FOLDER_ID", "root"),
                ("APPLICATION_NAME", "scanner"),
                ("API_ENDPOINT", endpoint.as_str()),
                ("CREDENTIALS", UNSIGNABLE_KEY_B64),
                ("DRIVE_API_BASE_URL", server_url),
            ],
            dir,
        ))
        .with_token_provider(Arc::new(StaticToken::new("local-token")))
    }

    #[tokio::test]
    async fn test_found_files_are_posted_to_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let listings = drive_with_one_subfolder(&mut server).await;
        let hook = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "files": [
                    {"id": "f1", "name": "a.txt"},
                    {"id": "f2", "name": "b.txt"}
                ]
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let base_url = server.url();
        let outcome = runner_for(&base_url, dir.path()).run_once().await.unwrap();

        assert!(matches!(outcome, RunOutcome::Notified { files: 2, failures: 0 }));
        for mock in &listings {
            mock.assert_async().await;
        }
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn test_dry_run_scans_without_posting() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let listings = drive_with_one_subfolder(&mut server).await;
        let hook = server
            .mock("POST", "/hook")
            .expect(0)
            .create_async()
            .await;

        let base_url = server.url();
        let outcome = runner_for(&base_url, dir.path())
            .dry_run(true)
            .run_once()
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Notified { files: 2, .. }));
        for mock in &listings {
            mock.assert_async().await;
        }
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn test_scheduled_run_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScanRunner::new(config(&[], dir.path()));

        ScheduledTask::run(&runner).await;
        assert_eq!(runner.name(), "drive-scan");
    }
}
