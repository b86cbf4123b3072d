//! File access used by the PSU accessors.
//!
//! Sysfs reads are best effort: a file that is missing or unreadable is simply "no value this cycle".
//! The [FileReader] trait lets the sensor logic run against an in-memory tree in tests.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use walkdir::WalkDir;

/// Read-only access to a tree of small text files.
pub trait FileReader {
    /// Return the trimmed contents of `path`, or `None` if it cannot be read.
    fn read_text(&self, path: &Path) -> Option<String>;

    fn exists(&self, path: &Path) -> bool;

    /// Every regular file below `directory`, recursively, in enumeration order.
    ///
    /// Empty if `directory` does not exist.
    fn list_files(&self, directory: &Path) -> Vec<PathBuf>;
}

/// [FileReader] over the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysfsFileReader;

impl FileReader for SysfsFileReader {
    fn read_text(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) => Some(text.trim().to_owned()),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!("Could not read {}: {}", path.display(), e);
                }
                None
            }
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, directory: &Path) -> Vec<PathBuf> {
        // Symlinked directories (`device`, `subsystem`) lead out of this device, don't descend them.
        WalkDir::new(directory)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping entry under {}: {}", directory.display(), e);
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir() && entry.path().is_file())
            .map(|entry| entry.into_path())
            .collect()
    }
}
