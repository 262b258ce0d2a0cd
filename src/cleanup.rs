//! Release of acquired archives.
//!
//! [`cleanup`] is the single exit point for an [`AcquiredArchive`]: it takes the
//! archive by value, so it cannot run twice for the same acquisition. It never
//! fails; problems are logged so they cannot mask the error being unwound.
//!
//! [`CleanupContext`] covers the one path `cleanup` cannot: the process being
//! interrupted while an install is in flight.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::acquire::AcquiredArchive;
use crate::runtime::Runtime;

/// Close the archive handle if still open and delete its backing file unless retained.
#[tracing::instrument(skip(runtime, archive))]
pub fn cleanup<R: Runtime + ?Sized>(runtime: &R, archive: AcquiredArchive) {
    let (reader, origin, retain) = archive.into_parts();

    if let Some(reader) = reader {
        debug!("Closing archive handle");
        drop(reader);
    }

    match origin {
        Some(path) if !retain => {
            debug!("Deleting archive {:?}", path);
            if let Err(e) = runtime.remove_file(&path) {
                warn!("Failed to delete archive {:?}: {:#}", path, e);
            }
        }
        Some(path) => debug!("Keeping archive {:?}", path),
        None => {}
    }
}

/// Temporary archives to delete if the process is interrupted.
#[derive(Debug, Default)]
pub struct CleanupContext {
    paths: Vec<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Forget a path, e.g. once it has been deleted through the normal path.
    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Delete every registered file. Missing files are ignored.
    pub fn cleanup(&self) {
        for path in &self.paths {
            debug!("Cleaning up: {:?}", path);
            let _ = std::fs::remove_file(path);
        }
    }
}

pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}
