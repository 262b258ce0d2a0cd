//! HTTP client wrapper.
//!
//! Failures are reported once and never retried; a caller that wants retries
//! has to loop itself.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response};
use std::io::Write;

/// HTTP client shared by the release source and the archive acquirer.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sends a GET request. The status code is left for the caller to judge.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}...", url);
        self.client
            .get(url)
            .send()
            .await
            .context("Failed to send request")
    }

    /// Streams the body of a successful GET into `writer`, returning the byte count.
    #[tracing::instrument(skip(self, writer))]
    pub async fn download_to<W: Write + ?Sized>(&self, url: &str, writer: &mut W) -> Result<u64> {
        let mut response = self.get_success(url).await?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }

    /// Buffers the whole body of a successful GET in memory.
    #[tracing::instrument(skip(self))]
    pub async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_success(url).await?;
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!("Read {} bytes into memory", body.len());
        Ok(body.to_vec())
    }

    async fn get_success(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        response
            .error_for_status()
            .with_context(|| format!("Server rejected download of {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_non_success_status_untouched() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(403)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let response = client.get(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status().as_u16(), 403);
    }

    #[tokio::test]
    async fn test_download_to_streams_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/archive.tar.gz")
            .with_status(200)
            .with_body("archive bytes")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut sink = Vec::new();
        let bytes = client
            .download_to(&format!("{}/archive.tar.gz", url), &mut sink)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 13);
        assert_eq!(sink, b"archive bytes");
    }

    #[tokio::test]
    async fn test_download_to_fails_on_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/missing.tar.gz")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut sink = Vec::new();
        let result = client
            .download_to(&format!("{}/missing.tar.gz", url), &mut sink)
            .await;

        // One request only: no retries
        mock.assert_async().await;
        assert!(result.is_err());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_download_bytes() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/file")
            .with_status(200)
            .with_body(vec![1u8, 2, 3])
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let body = client.download_bytes(&format!("{}/file", url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_bytes_server_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/file")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.download_bytes(&format!("{}/file", url)).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }
}
