use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Replace `path` with `contents` in one step.
///
/// Bytes go to a temp file in the same directory, which is then renamed
/// over the target. On any failure the previous file is left untouched.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    atomic_write_with(path, |file| file.write_all(contents))?;
    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Like [`atomic_write`], with `fill` producing the new contents.
///
/// If `fill` fails, the temp file is dropped and `path` keeps its old bytes.
pub fn atomic_write_with<F>(path: &Path, fill: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| ExportError::io(path, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| ExportError::io(path, e))?;
    fill(tmp.as_file_mut()).map_err(|e| ExportError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| ExportError::io(path, e))?;
    tmp.persist(path).map_err(|e| ExportError::io(path, e.error))?;
    Ok(())
}
