use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::LinkWarning;
use crate::runtime::Runtime;

/// Mirror each link source under `link_root`, at its path relative to `root`.
/// Directories are created, files are symlinked. Failures are collected, never fatal.
#[tracing::instrument(skip(runtime, link_sources))]
pub fn link_canonical<R: Runtime + ?Sized>(
    runtime: &R,
    root: &Path,
    link_sources: &[PathBuf],
    link_root: &Path,
) -> Vec<LinkWarning> {
    let mut warnings = Vec::new();

    for source in link_sources {
        let mut walker = WalkDir::new(source).sort_by_file_name().into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(source).to_path_buf();
                    warnings.push(warning(path, link_root.to_path_buf(), e.to_string()));
                    continue;
                }
            };

            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => {
                    warnings.push(warning(
                        entry.path().to_path_buf(),
                        link_root.to_path_buf(),
                        format!("not inside the package root {}", root.display()),
                    ));
                    walker.skip_current_dir();
                    continue;
                }
            };
            let target = link_root.join(relative);

            if entry.file_type().is_dir() {
                if let Err(e) = runtime.create_dir_all(&target) {
                    warnings.push(warning(entry.into_path(), target, format!("{:#}", e)));
                    walker.skip_current_dir();
                }
            } else {
                debug!("Linking {:?} -> {:?}", target, entry.path());
                if let Err(e) = runtime.symlink(entry.path(), &target) {
                    warnings.push(warning(entry.into_path(), target, format!("{:#}", e)));
                }
            }
        }
    }

    log_warnings(&warnings);
    warnings
}

/// Link every executable as `link_root/bin/<file name>`.
#[tracing::instrument(skip(runtime, executables))]
pub fn link_executables<R: Runtime + ?Sized>(
    runtime: &R,
    executables: &[PathBuf],
    link_root: &Path,
) -> Vec<LinkWarning> {
    let mut warnings = Vec::new();
    let bin_dir = link_root.join("bin");

    if !executables.is_empty()
        && let Err(e) = runtime.create_dir_all(&bin_dir)
    {
        warn!("Failed to create {:?}: {:#}", bin_dir, e);
    }

    for executable in executables {
        let Some(file_name) = executable.file_name() else {
            continue;
        };
        let target = bin_dir.join(file_name);

        debug!("Linking {:?} -> {:?}", target, executable);
        if let Err(e) = runtime.symlink(executable, &target) {
            warnings.push(warning(executable.clone(), target, format!("{:#}", e)));
        }
    }

    log_warnings(&warnings);
    warnings
}

fn warning(source: PathBuf, link: PathBuf, reason: String) -> LinkWarning {
    LinkWarning {
        source,
        link,
        reason,
    }
}

fn log_warnings(warnings: &[LinkWarning]) {
    for warning in warnings {
        warn!("{}", warning);
    }
}
