use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Unpack a zip stream. Entries escaping `extract_to` are skipped.
pub(super) fn unpack<R: Read>(mut reader: R, extract_to: &Path) -> Result<()> {
    // ZipArchive needs Read + Seek, so the central directory has to be in memory.
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .context("Failed to read zip archive")?;

    let mut archive =
        ZipArchive::new(Cursor::new(buffer)).context("Failed to parse ZIP archive")?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read ZIP entry {}", i))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("Skipping entry with invalid path: {}", entry.name());
                continue;
            }
        };
        let full_path = extract_to.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&full_path)
                .with_context(|| format!("Failed to create directory {:?}", full_path))?;
            continue;
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let mut dest_file = fs::File::create(&full_path)
            .with_context(|| format!("Failed to create file {:?}", full_path))?;
        std::io::copy(&mut entry, &mut dest_file)
            .with_context(|| format!("Failed to extract file {:?}", full_path))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(mode & 0o777);
            if let Err(e) = fs::set_permissions(&full_path, permissions) {
                debug!("Failed to set permissions on {:?}: {}", full_path, e);
            }
        }
    }

    info!("Extraction complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn create_test_archive(files: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    #[test]
    fn test_unpack_keeps_top_level_directories() -> Result<()> {
        let dir = tempdir()?;
        let archive = create_test_archive(&[("foo/file1.txt", "foo1"), ("bar/file2.txt", "bar2")])?;

        unpack(archive.as_slice(), dir.path())?;

        assert_eq!(fs::read_to_string(dir.path().join("foo/file1.txt"))?, "foo1");
        assert_eq!(fs::read_to_string(dir.path().join("bar/file2.txt"))?, "bar2");
        Ok(())
    }

    #[test]
    fn test_unpack_with_directory_entries() -> Result<()> {
        let dir = tempdir()?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.add_directory("pkg/share/empty/", options)?;
        zip.start_file("pkg/share/doc.txt", options)?;
        zip.write_all(b"nested file")?;
        let archive = zip.finish()?.into_inner();

        unpack(archive.as_slice(), dir.path())?;

        assert!(dir.path().join("pkg/share/empty").is_dir());
        assert_eq!(
            fs::read_to_string(dir.path().join("pkg/share/doc.txt"))?,
            "nested file"
        );
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_unpack_preserves_file_permissions() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let executable: FileOptions<()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o755);
        zip.start_file("tool/run.sh", executable)?;
        zip.write_all(b"#!/bin/sh\necho hello")?;
        let regular: FileOptions<()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        zip.start_file("tool/config.txt", regular)?;
        zip.write_all(b"some config")?;
        let archive = zip.finish()?.into_inner();

        unpack(archive.as_slice(), dir.path())?;

        let script_mode = fs::metadata(dir.path().join("tool/run.sh"))?.permissions().mode();
        assert!(
            script_mode & 0o111 != 0,
            "Expected run.sh to be executable, but mode was {:o}",
            script_mode
        );
        let config_mode = fs::metadata(dir.path().join("tool/config.txt"))?
            .permissions()
            .mode();
        assert!(
            config_mode & 0o111 == 0,
            "Expected config.txt to NOT be executable, but mode was {:o}",
            config_mode
        );
        Ok(())
    }

    #[test]
    fn test_unpack_skips_entries_escaping_destination() -> Result<()> {
        let dir = tempdir()?;
        let dest = dir.path().join("dest");
        fs::create_dir(&dest)?;
        let archive = create_test_archive(&[("../evil.txt", "nope"), ("ok.txt", "fine")])?;

        unpack(archive.as_slice(), &dest)?;

        assert!(!dir.path().join("evil.txt").exists());
        assert_eq!(fs::read_to_string(dest.join("ok.txt"))?, "fine");
        Ok(())
    }

    #[test]
    fn test_unpack_corrupted_archive() {
        let dir = tempdir().unwrap();
        let result = unpack(&b"PK\x03\x04corrupted data"[..], dir.path());
        assert!(result.is_err());
    }
}
