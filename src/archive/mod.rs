mod tar;
mod zip;

use anyhow::{Result, bail};
use log::debug;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Materializes an archive byte stream under a destination directory.
#[cfg_attr(test, mockall::automock)]
pub trait Extractor: Send + Sync {
    /// Extract everything in `reader` into `extract_to`, which must already exist.
    fn extract(&self, reader: Box<dyn Read + Send>, extract_to: &Path) -> Result<()>;
}

/// Archive encodings recognized from the first bytes of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
    Tar,
}

impl ArchiveFormat {
    const GZIP_MAGIC: &'static [u8] = &[0x1f, 0x8b];
    const ZIP_MAGIC: &'static [u8] = b"PK\x03\x04";

    /// Anything that is neither gzip nor zip is assumed to be a plain tar stream.
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(Self::GZIP_MAGIC) {
            ArchiveFormat::TarGz
        } else if head.starts_with(Self::ZIP_MAGIC) {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::Tar
        }
    }
}

/// Dispatcher that picks the unpacker from the stream contents, so in-memory
/// downloads without a file name are handled the same as files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ArchiveExtractor {
    #[tracing::instrument(skip(self, reader))]
    fn extract(&self, reader: Box<dyn Read + Send>, extract_to: &Path) -> Result<()> {
        let mut reader = BufReader::new(reader);
        let head = reader.fill_buf()?;
        if head.is_empty() {
            bail!("Archive is empty");
        }

        let format = ArchiveFormat::sniff(head);
        debug!("Extracting {:?} stream into {:?}...", format, extract_to);

        match format {
            ArchiveFormat::TarGz => tar::unpack(flate2::read::GzDecoder::new(reader), extract_to),
            ArchiveFormat::Zip => zip::unpack(reader, extract_to),
            ArchiveFormat::Tar => tar::unpack(reader, extract_to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{tar_gz, tar_plain};
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn boxed(bytes: Vec<u8>) -> Box<dyn Read + Send> {
        Box::new(Cursor::new(bytes))
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ArchiveFormat::sniff(&[0x1f, 0x8b, 0x08]), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::sniff(b"PK\x03\x04rest"), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::sniff(b"pkgroot/bin/tool"), ArchiveFormat::Tar);
        assert_eq!(ArchiveFormat::sniff(&[0x1f]), ArchiveFormat::Tar);
    }

    #[test]
    fn test_extractor_dispatches_to_tar_gz() -> Result<()> {
        let dir = tempdir()?;
        let archive = tar_gz(&[("pkgroot/bin/tool", "#!/bin/sh\n", 0o755)]);

        ArchiveExtractor::new().extract(boxed(archive), dir.path())?;

        let extracted = dir.path().join("pkgroot/bin/tool");
        assert_eq!(fs::read_to_string(extracted)?, "#!/bin/sh\n");
        Ok(())
    }

    #[test]
    fn test_extractor_dispatches_to_plain_tar() -> Result<()> {
        let dir = tempdir()?;
        let archive = tar_plain(&[("README", "hello", 0o644)]);

        ArchiveExtractor::new().extract(boxed(archive), dir.path())?;

        assert_eq!(fs::read_to_string(dir.path().join("README"))?, "hello");
        Ok(())
    }

    #[test]
    fn test_extractor_dispatches_to_zip() -> Result<()> {
        use ::zip::CompressionMethod;
        use ::zip::ZipWriter;
        use ::zip::write::FileOptions;
        use std::io::Write;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file("tool/README", options)?;
        zip.write_all(b"from zip")?;
        let archive = zip.finish()?.into_inner();

        let dir = tempdir()?;
        ArchiveExtractor::new().extract(boxed(archive), dir.path())?;

        assert_eq!(fs::read_to_string(dir.path().join("tool/README"))?, "from zip");
        Ok(())
    }

    #[test]
    fn test_empty_stream_is_an_error() {
        let dir = tempdir().unwrap();
        let result = ArchiveExtractor::new().extract(boxed(Vec::new()), dir.path());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_garbage_stream_is_an_error() {
        let dir = tempdir().unwrap();
        let result = ArchiveExtractor::new().extract(boxed(vec![0xab; 2048]), dir.path());
        assert!(result.is_err());
    }
}
