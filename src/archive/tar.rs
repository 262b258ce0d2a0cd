use anyhow::{Context, Result};
use log::info;
use std::io::Read;
use std::path::Path;
use tar::Archive;

/// Unpack a (decompressed) tar stream. Mode bits are kept, minus setuid/setgid/sticky.
pub(super) fn unpack<R: Read>(reader: R, extract_to: &Path) -> Result<()> {
    let mut archive = Archive::new(reader);
    archive
        .unpack(extract_to)
        .with_context(|| format!("Failed to unpack tar archive into {:?}", extract_to))?;

    info!("Extraction complete.");
    Ok(())
}
