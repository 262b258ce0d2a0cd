//! Hosting-service release lookups.
//!
//! Only GitHub repository URLs are resolved through a release API. Any other
//! URL is downloaded as-is by the acquirer.

mod github;

use async_trait::async_trait;
use reqwest::Url;
use std::fmt;

use crate::error::ResolutionFailure;

pub use github::{DEFAULT_API_URL, GitHubSource};

/// Host whose repository URLs are resolved through the release API.
pub const GITHUB_HOST: &str = "github.com";

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    /// Recognizes `https://github.com/<owner>/<repo>`: exactly two non-empty path
    /// segments after the host. Anything else is not a repository reference.
    pub fn from_url(url: &Url) -> Option<Self> {
        if url.host_str() != Some(GITHUB_HOST) {
            return None;
        }

        let segments: Vec<&str> = url.path_segments()?.collect();
        match segments.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Some(RepoId {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One downloadable asset of a release.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseAsset {
    pub name: String,
    pub download_url: String,
}

/// The latest release of a repository.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Release {
    /// Display name; may be absent on the service side
    pub name: Option<String>,
    /// Human-readable release page
    pub web_url: String,
    /// Version tag (e.g., "v1.0.0")
    pub tag: String,
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Name to show the operator, falling back to the tag.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the latest release of a repository.
    async fn latest_release(&self, repo: &RepoId) -> Result<Release, ResolutionFailure>;
}
