//! HTTP delivery of scan notifications

use async_trait::async_trait;
use drivescan_core::{NotificationPayload, Notifier, NotifyError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Configuration for the HTTP notifier
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Deadline for the whole call, connect through response body
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpNotifierConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            user_agent: format!("drivescan-notifier/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Posts the run's file list as JSON to a fixed endpoint. One attempt, no retry.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    http_client: Client,
    endpoint: Url,
    config: HttpNotifierConfig,
}

impl HttpNotifier {
    pub fn new(endpoint: Url, config: HttpNotifierConfig) -> Result<Self, NotifyError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                NotifyError::Transport(format!("Failed to create HTTP client for notifications: {}", e))
            })?;

        Ok(Self {
            http_client,
            endpoint,
            config,
        })
    }

    fn classify(&self, error: reqwest::Error) -> NotifyError {
        if error.is_timeout() {
            NotifyError::Timeout(self.config.timeout)
        } else {
            NotifyError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[tracing::instrument(
        skip(self, payload),
        fields(endpoint = %self.endpoint, file_count = payload.files.len())
    )]
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let body = serde_json::to_string(payload)?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(status_code = status.as_u16(), "Notification delivered");
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Failed to read response body"));
        Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use drivescan_core::FileRecord;
    use mockito::Matcher;
    use std::time::Instant;
    use tokio::net::TcpListener;

    fn payload() -> NotificationPayload {
        NotificationPayload::new(
            vec![
                FileRecord::new("f1", "a.txt"),
                FileRecord::new("f2", "b.txt"),
            ],
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    fn notifier(url: &str, timeout: Duration) -> HttpNotifier {
        HttpNotifier::new(
            Url::parse(url).unwrap(),
            HttpNotifierConfig {
                timeout,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = HttpNotifierConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert!(config.user_agent.starts_with("drivescan-notifier/"));
    }

    #[tokio::test]
    async fn test_posts_json_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/new-files")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "timestamp": "2024-05-01T12:00:00Z",
                "files": [
                    {"id": "f1", "name": "a.txt"},
                    {"id": "f2", "name": "b.txt"}
                ]
            })))
            .with_status(202)
            .create_async()
            .await;

        notifier(&format!("{}/new-files", server.url()), Duration::from_secs(2))
            .notify(&payload())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/new-files")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = notifier(&format!("{}/new-files", server.url()), Duration::from_secs(2))
            .notify(&payload())
            .await
            .unwrap_err();
        match err {
            NotifyError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        // Accept connections but never write a response
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let started = Instant::now();
        let err = notifier(&format!("http://{}/new-files", addr), Duration::from_millis(300))
            .notify(&payload())
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "expected timeout, got {:?}", err);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = notifier(&format!("http://{}/new-files", addr), Duration::from_secs(2))
            .notify(&payload())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
