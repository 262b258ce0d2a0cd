//! Process environment lookups used to locate the default roots and the
//! scratch directory for downloads.

use log::debug;
use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn home_dir_impl(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    /// Honors `TMPDIR` (or `TEMP` on Windows), which is where disk-mode
    /// downloads land.
    #[tracing::instrument(skip(self))]
    pub(crate) fn temp_dir_impl(&self) -> PathBuf {
        env::temp_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_privileged_impl(&self) -> bool {
        let privileged = running_elevated();
        if privileged {
            debug!("Process has administrator privileges");
        }
        privileged
    }
}

#[cfg(unix)]
fn running_elevated() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(windows)]
fn running_elevated() -> bool {
    is_elevated::is_elevated()
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_unset_variable_is_an_error() {
        assert!(RealRuntime.env_var("INFPM_SURELY_UNSET_VARIABLE").is_err());
        assert!(RealRuntime.env_var("PATH").is_ok());
    }

    #[test]
    fn test_temp_dir_is_usable_for_downloads() {
        let temp = RealRuntime.temp_dir();
        assert!(temp.is_absolute());
        assert!(temp.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_privilege_follows_effective_uid() {
        assert_eq!(
            RealRuntime.is_privileged(),
            nix::unistd::geteuid().as_raw() == 0
        );
    }
}
