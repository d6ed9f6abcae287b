//! Trade file discovery.
//!
//! Walks the trades directory recursively and returns every regular file,
//! sorted, so chunking and tie-breaking see the same order on every run.
//! Symlinked files are followed; symlinked directories are not descended into.
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use volatility_common::Result;

/// Collect all regular files below `root`.
///
/// A missing or unreadable `root` is an error; unreadable subdirectories are
/// logged and skipped.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut is_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if is_root => return Err(e.into()),
            Err(e) => {
                warn!("Cannot read directory {}: {}", dir.display(), e);
                continue;
            }
        };
        is_root = false;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot read entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
