use rand::Rng;
use std::fmt;
use std::path::PathBuf;

use crate::error::InstallError;

const DISAMBIGUATOR_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ123456789";
const DISAMBIGUATOR_LEN: usize = 5;

/// Generates a short token for file names. Not unique on its own: it only
/// separates repeated installs of the same name and version.
pub fn disambiguator() -> String {
    let mut rng = rand::rng();
    (0..DISAMBIGUATOR_LEN)
        .map(|_| DISAMBIGUATOR_ALPHABET[rng.random_range(0..DISAMBIGUATOR_ALPHABET.len())] as char)
        .collect()
}

fn is_path_component(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\'])
}

/// Name, version and disambiguator of a package about to be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    name: String,
    version: String,
    disambiguator: String,
}

impl PackageIdentity {
    /// Fails unless both `name` and `version` are non-empty and each stays a
    /// single directory under the store (no separators, no `.` or `..`).
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, InstallError> {
        let name = name.into();
        let version = version.into();
        if !is_path_component(&name) || !is_path_component(&version) {
            return Err(InstallError::InvalidIdentity { name, version });
        }

        Ok(Self {
            name,
            version,
            disambiguator: disambiguator(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn disambiguator(&self) -> &str {
        &self.disambiguator
    }

    /// `name/version/disambiguator`, relative to the store root.
    pub fn store_relative_path(&self) -> PathBuf {
        [&self.name, &self.version, &self.disambiguator]
            .iter()
            .collect()
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
