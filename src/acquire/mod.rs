//! Archive acquisition.
//!
//! Remote URLs and local files both end up as an [`AcquiredArchive`]: one open
//! byte source, plus the file backing it when there is one. Whoever receives the
//! archive must hand it to [`crate::cleanup::cleanup`] exactly once.

use log::{debug, info, warn};
use reqwest::Url;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::cleanup::SharedCleanupContext;
use crate::error::InstallError;
use crate::http::HttpClient;
use crate::package::disambiguator;
use crate::runtime::Runtime;

/// Where a remote archive is buffered before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquireMode {
    /// Stream into a temporary file and read it back.
    Disk,
    /// Hold the whole body in memory; nothing is written to disk.
    #[default]
    Memory,
}

pub struct AcquiredArchive {
    reader: Option<Box<dyn Read + Send>>,
    origin: Option<PathBuf>,
    retain: bool,
}

impl AcquiredArchive {
    pub fn new(reader: Box<dyn Read + Send>, origin: Option<PathBuf>, retain: bool) -> Self {
        Self {
            reader: Some(reader),
            origin,
            retain,
        }
    }

    /// The file backing the byte source, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn retain(&self) -> bool {
        self.retain
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Hand the byte source to a consumer. Returns `None` once taken.
    pub fn take_reader(&mut self) -> Option<Box<dyn Read + Send>> {
        self.reader.take()
    }

    pub(crate) fn into_parts(self) -> (Option<Box<dyn Read + Send>>, Option<PathBuf>, bool) {
        (self.reader, self.origin, self.retain)
    }
}

impl fmt::Debug for AcquiredArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquiredArchive")
            .field("open", &self.is_open())
            .field("origin", &self.origin)
            .field("retain", &self.retain)
            .finish()
    }
}

pub struct Acquirer<'a, R: Runtime> {
    runtime: &'a R,
    http: &'a HttpClient,
    cleanup_ctx: Option<SharedCleanupContext>,
}

impl<'a, R: Runtime> Acquirer<'a, R> {
    pub fn new(runtime: &'a R, http: &'a HttpClient) -> Self {
        Self {
            runtime,
            http,
            cleanup_ctx: None,
        }
    }

    /// Register temporary downloads here so an interrupt handler can remove them.
    pub fn with_cleanup(mut self, cleanup_ctx: SharedCleanupContext) -> Self {
        self.cleanup_ctx = Some(cleanup_ctx);
        self
    }

    /// Download `url`. In disk mode the temporary file is deleted by cleanup unless `retain`.
    #[tracing::instrument(skip(self))]
    pub async fn from_remote(
        &self,
        url: &str,
        mode: AcquireMode,
        retain: bool,
    ) -> Result<AcquiredArchive, InstallError> {
        info!("Downloading {}...", url);
        match mode {
            AcquireMode::Memory => {
                let body = self
                    .http
                    .download_bytes(url)
                    .await
                    .map_err(|source| acquisition_error(url, source))?;
                Ok(AcquiredArchive::new(Box::new(Cursor::new(body)), None, false))
            }
            AcquireMode::Disk => self.download_to_temp(url, retain).await,
        }
    }

    async fn download_to_temp(&self, url: &str, retain: bool) -> Result<AcquiredArchive, InstallError> {
        let origin = self.temp_path(url);
        debug!("Buffering download in {:?}", origin);

        let mut file = self
            .runtime
            .create_file(&origin)
            .map_err(|source| acquisition_error(url, source))?;
        if !retain {
            self.track(&origin);
        }

        let downloaded = self.http.download_to(url, &mut *file).await;
        drop(file);
        if let Err(source) = downloaded {
            self.discard(&origin);
            return Err(acquisition_error(url, source));
        }

        let reader = match self.runtime.open(&origin) {
            Ok(reader) => reader,
            Err(source) => {
                self.discard(&origin);
                return Err(acquisition_error(url, source));
            }
        };

        if retain {
            warn!("The downloaded archive will be kept at {:?}", origin);
        }
        Ok(AcquiredArchive::new(reader, Some(origin), retain))
    }

    /// Open a local archive. Unless `retain`, the file is deleted after the install.
    #[tracing::instrument(skip(self))]
    pub fn from_local(&self, path: &Path, retain: bool) -> Result<AcquiredArchive, InstallError> {
        let reader = self.runtime.open(path).map_err(|source| {
            let kind = source
                .chain()
                .find_map(|cause| cause.downcast_ref::<io::Error>())
                .map(io::Error::kind);
            match kind {
                Some(io::ErrorKind::NotFound) => InstallError::NotFound {
                    path: path.to_path_buf(),
                },
                Some(io::ErrorKind::PermissionDenied) => InstallError::PermissionDenied {
                    path: path.to_path_buf(),
                },
                _ => InstallError::Acquisition {
                    locator: path.display().to_string(),
                    source,
                },
            }
        })?;

        if !retain {
            warn!("{:?} will be deleted after the install", path);
        }
        Ok(AcquiredArchive::new(reader, Some(path.to_path_buf()), retain))
    }

    /// `<temp_dir>/<token>-<url basename>`, picking a new token while the name is taken.
    fn temp_path(&self, url: &str) -> PathBuf {
        let base = url_basename(url);
        let temp_dir = self.runtime.temp_dir();
        loop {
            let candidate = temp_dir.join(format!("{}-{}", disambiguator(), base));
            if !self.runtime.exists(&candidate) {
                return candidate;
            }
        }
    }

    fn track(&self, path: &Path) {
        if let Some(ctx) = &self.cleanup_ctx
            && let Ok(mut guard) = ctx.lock()
        {
            guard.add(path.to_path_buf());
        }
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = self.runtime.remove_file(path) {
            debug!("Failed to remove partial download {:?}: {:#}", path, e);
        }
        if let Some(ctx) = &self.cleanup_ctx
            && let Ok(mut guard) = ctx.lock()
        {
            guard.remove(path);
        }
    }
}

fn acquisition_error(url: &str, source: anyhow::Error) -> InstallError {
    InstallError::Acquisition {
        locator: url.to_string(),
        source,
    }
}

fn url_basename(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .next_back()
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "archive".to_string())
}
