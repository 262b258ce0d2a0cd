//! Package records before and after installation.

mod identity;

use std::path::PathBuf;

use crate::error::LinkWarning;

pub use identity::{PackageIdentity, disambiguator};

/// A package that has been extracted into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledPackage {
    pub identity: PackageIdentity,
    /// `store_root/name/version/disambiguator`
    pub store_path: PathBuf,
    pub link_root: PathBuf,
    /// True once linking ran to completion, even if some links failed.
    pub linked: bool,
    /// Links that could not be created.
    pub warnings: Vec<LinkWarning>,
}

impl InstalledPackage {
    pub fn is_fully_linked(&self) -> bool {
        self.linked && self.warnings.is_empty()
    }
}
