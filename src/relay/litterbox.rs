use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::{Result, SubfetchError};
use super::RelayHost;

/// Litterbox (catbox.moe) temporary file host
pub struct LitterboxHost {
    client: Client,
    endpoint: String,
    retention: String,
}

impl LitterboxHost {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(SubfetchError::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            retention: config.retention.clone(),
        })
    }

    fn form(&self, file_name: String, data: Vec<u8>) -> Form {
        Form::new()
            .text("reqtype", "fileupload")
            .text("time", self.retention.clone())
            .part("fileToUpload", Part::bytes(data).file_name(file_name))
    }
}

#[async_trait]
impl RelayHost for LitterboxHost {
    async fn upload(&self, path: &Path) -> Result<String> {
        let data = tokio::fs::read(path).await
            .map_err(|e| SubfetchError::RelayFailed(format!("Failed to read {}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        debug!("Uploading {} ({} bytes) to {}", file_name, data.len(), self.endpoint);

        let response = self.client
            .post(&self.endpoint)
            .multipart(self.form(file_name, data))
            .send()
            .await
            .map_err(|e| SubfetchError::RelayFailed(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubfetchError::RelayFailed(format!("Failed to read relay response: {}", e)))?;

        if !status.is_success() {
            return Err(SubfetchError::RelayFailed(format!(
                "Relay host error {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(body.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{response, serve_once};

    fn host(endpoint: String) -> LitterboxHost {
        let config = RelayConfig {
            endpoint,
            ..Config::default().relay
        };
        LitterboxHost::new(&config).unwrap()
    }

    fn media_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("clip_0123abcd.mp4");
        std::fs::write(&path, b"mp4").unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_sends_form_and_returns_trimmed_link() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) =
            serve_once(&response("200 OK", "https://litter.catbox.moe/abc.mp4\n")).await;

        let link = host(url).upload(&media_file(dir.path())).await.unwrap();
        assert_eq!(link, "https://litter.catbox.moe/abc.mp4");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST "));
        assert!(request.contains("name=\"reqtype\""));
        assert!(request.contains("fileupload"));
        assert!(request.contains("name=\"time\""));
        assert!(request.contains("1h"));
        assert!(request.contains("name=\"fileToUpload\""));
        assert!(request.contains("filename=\"clip_0123abcd.mp4\""));
    }

    #[tokio::test]
    async fn test_error_status_is_relay_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (url, _server) =
            serve_once(&response("503 Service Unavailable", "down for maintenance")).await;

        let err = host(url).upload(&media_file(dir.path())).await.unwrap_err();
        assert!(matches!(err, SubfetchError::RelayFailed(_)));
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("down for maintenance"));
    }

    #[tokio::test]
    async fn test_missing_file_is_relay_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = host("http://127.0.0.1:9".to_string())
            .upload(&dir.path().join("gone.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubfetchError::RelayFailed(_)));
    }

    #[tokio::test]
    async fn test_truncated_body_is_relay_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Promises more bytes than it sends, then closes
        let (url, _server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nhttps://lit",
        )
        .await;

        let err = host(url).upload(&media_file(dir.path())).await.unwrap_err();
        assert!(matches!(err, SubfetchError::RelayFailed(_)));
        assert!(err.to_string().contains("Failed to read relay response"));
    }
}
