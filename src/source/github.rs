//! GitHub release API source.

use async_trait::async_trait;
use log::{debug, error};

use crate::error::ResolutionFailure;
use crate::http::HttpClient;

use super::{Release, ReleaseAsset, ReleaseSource, RepoId};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    /// `GET /repos/{owner}/{repo}/releases/latest`
    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub html_url: String,
        pub name: Option<String>,
        pub tag_name: String,
        pub assets: Vec<Asset>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub name: String,
        pub browser_download_url: String,
    }
}

impl From<api::Release> for Release {
    fn from(release: api::Release) -> Self {
        Release {
            name: release.name,
            web_url: release.html_url,
            tag: release.tag_name,
            assets: release
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    name: asset.name,
                    download_url: asset.browser_download_url,
                })
                .collect(),
        }
    }
}

/// GitHub source implementation.
pub struct GitHubSource {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubSource {
    /// Create a new GitHub source with default API URL.
    pub fn new(http_client: HttpClient) -> Self {
        Self::with_api_url(http_client, DEFAULT_API_URL)
    }

    /// Create a new GitHub source with custom API URL.
    pub fn with_api_url(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn latest_release_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, repo.owner, repo.repo
        )
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    #[tracing::instrument(skip(self))]
    async fn latest_release(&self, repo: &RepoId) -> Result<Release, ResolutionFailure> {
        let url = self.latest_release_url(repo);
        debug!("Fetching latest release from {}...", url);

        let response = self
            .http_client
            .get(&url)
            .await
            .map_err(|source| ResolutionFailure::Request {
                url: url.clone(),
                source,
            })?;

        // The body of a failed request is never decoded
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ResolutionFailure::Status {
                status: status.as_u16(),
            });
        }

        let release = response.json::<api::Release>().await.map_err(|e| {
            error!("Failed to decode GitHub releases/latest response from {}", url);
            ResolutionFailure::Decode(e)
        })?;

        Ok(release.into())
    }
}
