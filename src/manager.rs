use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::acquire::AcquiredArchive;
use crate::archive::Extractor;
use crate::cleanup::cleanup;
use crate::error::InstallError;
use crate::install::Installer;
use crate::package::{InstalledPackage, PackageIdentity};
use crate::runtime::Runtime;

/// Per-invocation install context: where packages go, where links go, and
/// whether an operator can be asked to choose.
pub struct PackageManager<R: Runtime, E: Extractor> {
    runtime: R,
    extractor: E,
    store_root: PathBuf,
    link_root: PathBuf,
    interactive: bool,
}

impl<R: Runtime, E: Extractor> PackageManager<R, E> {
    /// Ensure both roots exist, then remember their canonical paths.
    #[tracing::instrument(skip(runtime, extractor))]
    pub fn new(
        runtime: R,
        extractor: E,
        store_root: &Path,
        link_root: &Path,
        interactive: bool,
    ) -> Result<Self, InstallError> {
        let store_root = prepare_root(&runtime, store_root)?;
        let link_root = prepare_root(&runtime, link_root)?;
        debug!("Store root: {:?}, link root: {:?}", store_root, link_root);

        Ok(Self {
            runtime,
            extractor,
            store_root,
            link_root,
            interactive,
        })
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    pub fn link_root(&self) -> &Path {
        &self.link_root
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Install `archive` as `identity`. The archive is released whatever the outcome.
    #[tracing::instrument(skip(self, archive))]
    pub fn install(
        &self,
        mut archive: AcquiredArchive,
        identity: &PackageIdentity,
    ) -> Result<InstalledPackage, InstallError> {
        let installer = Installer::new(
            &self.runtime,
            &self.extractor,
            &self.store_root,
            &self.link_root,
        );
        let result = installer.install(&mut archive, identity);
        cleanup(&self.runtime, archive);

        if let Ok(installed) = &result {
            info!("Installed {} into {:?}", identity, installed.store_path);
        }
        result
    }
}

fn prepare_root<R: Runtime>(runtime: &R, root: &Path) -> Result<PathBuf, InstallError> {
    let store_error = |source| InstallError::Store {
        path: root.to_path_buf(),
        source,
    };
    runtime.create_dir_all(root).map_err(store_error)?;
    runtime.canonicalize(root).map_err(store_error)
}
