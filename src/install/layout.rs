use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names that mark the root of a conventional prefix layout.
pub const LAYOUT_MARKERS: [&str; 3] = ["bin", "lib", "share"];

/// How an extracted package should be exposed in the link root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// A directory holding `bin`, `lib` or `share`. Each link source is linked
    /// at its path relative to `root`.
    Canonical {
        root: PathBuf,
        link_sources: Vec<PathBuf>,
    },
    /// No marker directory anywhere: every executable file goes to `bin`.
    Executables(Vec<PathBuf>),
}

/// Walk an extracted tree depth-first, in file name order, to find its layout.
///
/// The first marker directory fixes the canonical root (its parent). From then
/// on every directory met is a link source and is not descended into, including
/// directories that sit outside the canonical root.
#[tracing::instrument]
pub fn detect_layout(extracted: &Path) -> Result<Layout> {
    let mut canonical_root: Option<PathBuf> = None;
    let mut link_sources = Vec::new();
    let mut executables = Vec::new();

    let mut walker = WalkDir::new(extracted)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", extracted))?;

        if !entry.file_type().is_dir() {
            if is_executable(&entry)? {
                executables.push(entry.into_path());
            }
            continue;
        }

        if canonical_root.is_some() {
            link_sources.push(entry.into_path());
            walker.skip_current_dir();
        } else if is_marker(&entry) {
            let root = entry
                .path()
                .parent()
                .unwrap_or(extracted)
                .to_path_buf();
            debug!("Found canonical root {:?}", root);
            canonical_root = Some(root);
            link_sources.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    Ok(match canonical_root {
        Some(root) => Layout::Canonical { root, link_sources },
        None => {
            debug!("No layout marker found, falling back to {} executable(s)", executables.len());
            Layout::Executables(executables)
        }
    })
}

fn is_marker(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| LAYOUT_MARKERS.contains(&name))
}

#[cfg(unix)]
fn is_executable(entry: &DirEntry) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = entry
        .metadata()
        .with_context(|| format!("Failed to read metadata of {:?}", entry.path()))?;
    Ok(metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(entry: &DirEntry) -> Result<bool> {
    Ok(entry
        .path()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{write_file, write_executable};
    use tempfile::tempdir;

    #[test]
    fn test_detects_canonical_root_with_bin_and_lib() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_executable(&root.join("pkgroot/bin/tool"))?;
        write_file(&root.join("pkgroot/lib/libfoo.so"))?;

        let layout = detect_layout(root)?;

        assert_eq!(
            layout,
            Layout::Canonical {
                root: root.join("pkgroot"),
                link_sources: vec![root.join("pkgroot/bin"), root.join("pkgroot/lib")],
            }
        );
        Ok(())
    }

    #[test]
    fn test_marker_at_top_level_makes_extraction_dir_the_root() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("share/man/tool.1"))?;

        let layout = detect_layout(root)?;

        assert_eq!(
            layout,
            Layout::Canonical {
                root: root.to_path_buf(),
                link_sources: vec![root.join("share")],
            }
        );
        Ok(())
    }

    #[test]
    fn test_directories_after_discovery_become_link_sources() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("a/bin/tool"))?;
        write_file(&root.join("a/include/tool.h"))?;
        write_file(&root.join("z/docs/readme"))?;

        let layout = detect_layout(root)?;

        // "z" is visited after the root was fixed, so it is captured but not descended.
        assert_eq!(
            layout,
            Layout::Canonical {
                root: root.join("a"),
                link_sources: vec![root.join("a/bin"), root.join("a/include"), root.join("z")],
            }
        );
        Ok(())
    }

    #[test]
    fn test_marker_subtrees_are_not_descended() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("pkg/lib/bin/nested"))?;

        match detect_layout(root)? {
            Layout::Canonical { link_sources, .. } => {
                assert_eq!(link_sources, vec![root.join("pkg/lib")]);
            }
            other => panic!("Expected canonical layout, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_falls_back_to_executables() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_executable(&root.join("tool-v1/tool"))?;
        write_file(&root.join("tool-v1/README.md"))?;

        let layout = detect_layout(root)?;

        assert_eq!(layout, Layout::Executables(vec![root.join("tool-v1/tool")]));
        Ok(())
    }

    #[test]
    fn test_marker_names_must_match_exactly() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("bins/readme"))?;
        write_file(&root.join("library/readme"))?;

        assert_eq!(detect_layout(root)?, Layout::Executables(vec![]));
        Ok(())
    }

    #[test]
    fn test_empty_tree() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(detect_layout(dir.path())?, Layout::Executables(vec![]));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(!missing.exists());
        assert!(detect_layout(&missing).is_err());
    }
}
