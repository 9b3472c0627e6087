use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Result, SubfetchError};
use super::RemoteFetch;

/// Size probe and downloader over plain HTTP
pub struct HttpRemoteFetch {
    client: Client,
}

impl HttpRemoteFetch {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(SubfetchError::Http)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetch for HttpRemoteFetch {
    async fn size_of(&self, url: &str) -> Result<u64> {
        debug!("Probing size of {}", url);

        let response = self.client
            .head(url)
            .send()
            .await
            .map_err(|e| SubfetchError::ProbeFailed(format!("HEAD {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SubfetchError::ProbeFailed(format!(
                "HEAD {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        // Read the header directly; the body length of a HEAD response is zero
        let size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| SubfetchError::ProbeFailed(format!("{} has no content length", url)))?;

        debug!("{} is {} bytes", url, size);
        Ok(size)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Downloading {} to {}", url, dest.display());

        let mut response = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| SubfetchError::DownloadFailed(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SubfetchError::DownloadFailed(format!(
                "GET {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SubfetchError::DownloadFailed(format!("Reading {} failed: {}", url, e)))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{response, serve_once};

    fn fetch() -> HttpRemoteFetch {
        HttpRemoteFetch::new("subfetch-test").unwrap()
    }

    #[tokio::test]
    async fn test_size_of_reads_content_length() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 1234\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert_eq!(fetch().size_of(&format!("{}/DASH_720.mp4", url)).await.unwrap(), 1234);
        assert!(server.await.unwrap().starts_with("HEAD /DASH_720.mp4"));
    }

    #[tokio::test]
    async fn test_size_of_without_content_length_is_probe_failure() {
        let (url, _server) =
            serve_once("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n").await;

        let err = fetch().size_of(&url).await.unwrap_err();
        assert!(matches!(err, SubfetchError::ProbeFailed(_)));
        assert!(err.to_string().contains("no content length"));
    }

    #[tokio::test]
    async fn test_size_of_error_status_is_probe_failure() {
        let (url, _server) = serve_once(&response("503 Service Unavailable", "")).await;

        let err = fetch().size_of(&url).await.unwrap_err();
        assert!(matches!(err, SubfetchError::ProbeFailed(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cat.png");
        let (url, _server) = serve_once(&response("200 OK", "PNGDATA")).await;

        fetch().download(&url, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"PNGDATA");
    }

    #[tokio::test]
    async fn test_download_error_status_is_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cat.png");
        let (url, _server) = serve_once(&response("404 Not Found", "gone")).await;

        let err = fetch().download(&url, &dest).await.unwrap_err();
        assert!(matches!(err, SubfetchError::DownloadFailed(_)));
        assert!(err.to_string().contains("404"));
        assert!(!dest.exists());
    }
}
