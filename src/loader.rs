//! Ordered texture-source fallback.
//!
//! Textures may ship inside a packed (optionally password protected) zip
//! archive or as loose files in the texture directory. Sources are tried
//! in a fixed order and the first success wins.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::result::ZipError;

use crate::config::ArchiveSource;

/// One place a texture's bytes can come from.
#[derive(Debug, Clone)]
pub enum TextureSource {
    Archive(ArchiveSource),
    Directory(PathBuf),
}

/// Reads one entry out of a packed zip archive.
///
/// `Ok(None)` means the archive or the entry does not exist; callers treat
/// that differently from a broken or unreadable archive, which is an `Err`.
pub fn read_archive_entry(
    archive_path: &Path,
    entry: &str,
    password: Option<&str>,
) -> Result<Option<Vec<u8>>, ZipError> {
    if !archive_path.is_file() {
        return Ok(None);
    }

    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let result = match password {
        Some(password) => archive.by_name_decrypt(entry, password.as_bytes()),
        None => archive.by_name(entry),
    };
    let mut entry_file = match result {
        Ok(entry_file) => entry_file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut bytes = Vec::with_capacity(entry_file.size() as usize);
    entry_file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn reads_existing_entry() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("data.zip");
        write_archive(&archive, &[("player.png", b"pixels")]);

        let bytes = read_archive_entry(&archive, "player.png", None).unwrap();
        assert_eq!(bytes.as_deref(), Some(b"pixels".as_slice()));
    }

    #[test]
    fn missing_entry_is_none() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("data.zip");
        write_archive(&archive, &[("player.png", b"pixels")]);

        let bytes = read_archive_entry(&archive, "enemy.png", None).unwrap();
        assert!(bytes.is_none());
    }

    #[test]
    fn missing_archive_is_none() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("nope.zip");

        let bytes = read_archive_entry(&archive, "player.png", None).unwrap();
        assert!(bytes.is_none());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("data.zip");
        fs::write(&archive, b"this is not a zip file").unwrap();

        let result = read_archive_entry(&archive, "player.png", None);
        assert!(result.is_err());
    }
}
