//! Store extraction and linking.
//!
//! The installer owns everything between an acquired archive and an
//! [`InstalledPackage`]: store directory, extraction, layout detection, links.
//! It does not release the archive; that is left to the caller so it happens
//! on every path.

mod layout;
mod link;

use log::{debug, info};
use std::path::Path;

use crate::acquire::AcquiredArchive;
use crate::archive::Extractor;
use crate::error::InstallError;
use crate::package::{InstalledPackage, PackageIdentity};
use crate::runtime::Runtime;

pub use layout::{LAYOUT_MARKERS, Layout, detect_layout};
pub use link::{link_canonical, link_executables};

pub struct Installer<'a, R: Runtime, E: Extractor> {
    runtime: &'a R,
    extractor: &'a E,
    store_root: &'a Path,
    link_root: &'a Path,
}

impl<'a, R: Runtime, E: Extractor> Installer<'a, R, E> {
    pub fn new(runtime: &'a R, extractor: &'a E, store_root: &'a Path, link_root: &'a Path) -> Self {
        Self {
            runtime,
            extractor,
            store_root,
            link_root,
        }
    }

    /// Extract `archive` under the store and link it into the link root.
    ///
    /// Consumes the archive's byte source. A failed extraction leaves the
    /// partially filled store directory in place.
    #[tracing::instrument(skip(self, archive))]
    pub fn install(
        &self,
        archive: &mut AcquiredArchive,
        identity: &PackageIdentity,
    ) -> Result<InstalledPackage, InstallError> {
        let store_path = self.store_root.join(identity.store_relative_path());

        debug!("Creating store directory {:?}", store_path);
        self.runtime
            .create_dir_all(&store_path)
            .map_err(|source| InstallError::Store {
                path: store_path.clone(),
                source,
            })?;

        let reader = archive.take_reader().ok_or_else(|| InstallError::Extraction {
            path: store_path.clone(),
            source: anyhow::anyhow!("archive stream was already consumed"),
        })?;

        info!("Extracting {} into {:?}", identity, store_path);
        self.extractor
            .extract(reader, &store_path)
            .map_err(|source| InstallError::Extraction {
                path: store_path.clone(),
                source,
            })?;

        let layout = detect_layout(&store_path).map_err(|source| InstallError::Store {
            path: store_path.clone(),
            source,
        })?;

        let warnings = match &layout {
            Layout::Canonical { root, link_sources } => {
                info!("Linking {} director(ies) from {:?}", link_sources.len(), root);
                link_canonical(self.runtime, root, link_sources, self.link_root)
            }
            Layout::Executables(executables) => {
                info!("Linking {} executable(s) into bin", executables.len());
                link_executables(self.runtime, executables, self.link_root)
            }
        };

        Ok(InstalledPackage {
            identity: identity.clone(),
            store_path,
            link_root: self.link_root.to_path_buf(),
            linked: true,
            warnings,
        })
    }
}
