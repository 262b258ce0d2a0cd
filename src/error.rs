//! Error taxonomy for the install pipeline.
//!
//! Every fatal variant names the locator or path involved, so a failure
//! printed at the top level identifies the stage that stopped the install.
//! Individual link failures are not errors: see [`LinkWarning`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(
        "a package name and version must both be non-empty single path components (name: {name:?}, version: {version:?})"
    )]
    InvalidIdentity { name: String, version: String },

    #[error("invalid package locator {locator:?}: {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("failed to resolve a release asset for {locator}")]
    Resolution {
        locator: String,
        #[source]
        source: ResolutionFailure,
    },

    #[error("failed to acquire archive from {locator}")]
    Acquisition {
        locator: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("archive {} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied while opening archive {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to prepare store directory {}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to extract archive into {}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl InstallError {
    /// Short name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            InstallError::InvalidIdentity { .. } | InstallError::InvalidLocator { .. } => "input",
            InstallError::Resolution { .. } => "resolution",
            InstallError::Acquisition { .. }
            | InstallError::NotFound { .. }
            | InstallError::PermissionDenied { .. } => "acquisition",
            InstallError::Store { .. } => "store",
            InstallError::Extraction { .. } => "extraction",
        }
    }
}

/// Why a hosting-service locator could not be turned into a download URL.
#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "GitHub returned non-OK status {status}. This is most likely a rate limit imposed by the API; provide the URL of the release archive directly instead"
    )]
    Status { status: u16 },

    #[error("failed to decode the latest release response")]
    Decode(#[source] reqwest::Error),

    #[error("no release asset matches {platform}. Available assets:\n  {available}")]
    NoCandidates { platform: String, available: String },

    #[error(
        "{count} release assets match {platform} and no operator is available to choose; pass the asset URL directly"
    )]
    Ambiguous { count: usize, platform: String },

    #[error("asset selection was aborted")]
    Selection(#[source] anyhow::Error),
}

/// A single link that could not be created. Never aborts an install.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkWarning {
    pub source: PathBuf,
    pub link: PathBuf,
    pub reason: String,
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not link {} -> {}: {}",
            self.link.display(),
            self.source.display(),
            self.reason
        )
    }
}
