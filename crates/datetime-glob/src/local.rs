//! `WalkerFs` over the local filesystem.

use std::fs;
use std::io;
use std::path::Path;

use crate::{WalkerDirEntry, WalkerError, WalkerFs};

/// The real filesystem, read through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

/// A directory entry listed by [`LocalFs`].
#[derive(Debug, Clone)]
pub struct LocalDirEntry {
    name: String,
    is_dir: bool,
}

impl WalkerDirEntry for LocalDirEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }
}

impl WalkerFs for LocalFs {
    type DirEntry = LocalDirEntry;

    fn list_dir(&self, path: &Path) -> Result<Vec<LocalDirEntry>, WalkerError> {
        let read_dir = fs::read_dir(path).map_err(|e| walker_error(path, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| walker_error(path, e))?;

            // patterns are UTF-8, so such names can never match
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::trace!(dir = %path.display(), name = ?raw, "skipping non-UTF-8 entry");
                    continue;
                }
            };

            let file_type = entry.file_type().map_err(|e| walker_error(&entry.path(), e))?;
            let is_dir = if file_type.is_symlink() {
                // a dangling link is not a directory
                fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir())
            } else {
                file_type.is_dir()
            };

            entries.push(LocalDirEntry { name, is_dir });
        }

        Ok(entries)
    }
}

fn walker_error(path: &Path, err: io::Error) -> WalkerError {
    let path = path.display().to_string();
    match err.kind() {
        io::ErrorKind::NotFound => WalkerError::NotFound(path),
        io::ErrorKind::PermissionDenied => WalkerError::PermissionDenied(path),
        _ => WalkerError::Io(format!("{path}: {err}")),
    }
}
