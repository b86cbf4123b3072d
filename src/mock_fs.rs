//! We use this mocking module in unit tests to emulate sysfs and the PSU EEPROMs.

use std::{
    cell::Cell,
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    eeprom::{EepromDecoder, EepromField, EepromInfo},
    error::{Error, Result},
    sysfs::FileReader,
};

/// In-memory file tree. Files are listed in insertion order, like an unsorted directory read.
#[derive(Debug, Default)]
pub struct MockFiles {
    files: Vec<(PathBuf, String)>,
}

impl MockFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = content,
            None => self.files.push((path, content)),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn remove(&mut self, path: impl AsRef<Path>) {
        self.files.retain(|(p, _)| p != path.as_ref());
    }
}

impl FileReader for MockFiles {
    fn read_text(&self, path: &Path) -> Option<String> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.trim().to_owned())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.iter().any(|(p, _)| p == path)
    }

    fn list_files(&self, directory: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|(p, _)| p.starts_with(directory) && p != directory)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

/// EEPROM images held in memory, keyed by their sysfs path.
#[derive(Debug, Default)]
pub struct MockEeprom {
    images: HashMap<PathBuf, Vec<u8>>,
    /// Number of decode calls made, so tests can check nothing is cached.
    decode_count: Cell<usize>,
}

impl MockEeprom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>, image: Vec<u8>) -> Self {
        self.images.insert(path.into(), image);
        self
    }

    pub fn decode_count(&self) -> usize {
        self.decode_count.get()
    }
}

impl EepromDecoder for MockEeprom {
    fn decode(
        &self,
        path: &Path,
        format: &[EepromField],
        start_offset: usize,
    ) -> Result<EepromInfo> {
        self.decode_count.set(self.decode_count.get() + 1);
        let image = self.images.get(path).ok_or_else(|| Error::Io {
            path: path.to_owned(),
            source: std::io::ErrorKind::NotFound.into(),
        })?;
        EepromInfo::decode(image, format, start_offset, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_trims() {
        let files = MockFiles::new().with_file("/hwmon/in1_input", "12000\n");
        assert_eq!(
            files.read_text(Path::new("/hwmon/in1_input")).as_deref(),
            Some("12000")
        );
        assert_eq!(files.read_text(Path::new("/hwmon/in2_input")), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut files = MockFiles::new().with_file("/a", "1");
        files.insert("/a", "2");
        assert_eq!(files.read_text(Path::new("/a")).as_deref(), Some("2"));
        assert_eq!(files.list_files(Path::new("/")).len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut files = MockFiles::new().with_file("/a", "1");
        files.remove("/a");
        assert!(!files.exists(Path::new("/a")));
    }

    #[test]
    fn test_list_files_keeps_insertion_order() {
        let files = MockFiles::new()
            .with_file("/hwmon/hwmon2/in2_label", "vin")
            .with_file("/other/in1_label", "vout1")
            .with_file("/hwmon/hwmon2/in1_label", "vout1");

        assert_eq!(
            files.list_files(Path::new("/hwmon")),
            vec![
                PathBuf::from("/hwmon/hwmon2/in2_label"),
                PathBuf::from("/hwmon/hwmon2/in1_label"),
            ]
        );
        // Path prefix matching is by component, not by string.
        assert!(files.list_files(Path::new("/hwm")).is_empty());
    }

    #[test]
    fn test_missing_eeprom_image() {
        let eeprom = MockEeprom::new();
        let result = eeprom.decode(Path::new("/eeprom"), &[], 0);
        assert!(matches!(result, Err(Error::Io { .. })));
        assert_eq!(eeprom.decode_count(), 1);
    }
}
