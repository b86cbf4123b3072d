//! Decoding of the identity fields stored in a PSU's i2c EEPROM.
//!
//! The layout is a flat sequence of fixed-width fields. Text fields are padded with NUL, `0xFF` or spaces,
//! skipped fields are reserved bytes we don't interpret.

use std::{fs, path::Path};

use crate::error::{Error, Result};

/// Longest text field we will decode.
pub const EEPROM_FIELD_MAX: usize = 32;

/// Byte offset of the first field in the PSU EEPROM.
pub const PSU_EEPROM_START_OFFSET: usize = 48;

pub const SERIAL_NUMBER: &str = "Serial Number";
pub const MODEL: &str = "Model";
pub const PART_NUMBER: &str = "Part Number";

/// Layout of the E1031 PSU EEPROM, starting at [PSU_EEPROM_START_OFFSET].
pub const PSU_EEPROM_FORMAT: [EepromField; 4] = [
    EepromField::text(SERIAL_NUMBER, 16),
    EepromField::skip("burn", 16),
    EepromField::text(MODEL, 16),
    EepromField::text(PART_NUMBER, 16),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `'s'`: printable text.
    Text,
    /// `'x'`: reserved bytes.
    Skip,
}

/// One entry of an EEPROM layout: name, kind and width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub len: usize,
}

impl EepromField {
    pub const fn text(name: &'static str, len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            len,
        }
    }

    pub const fn skip(name: &'static str, len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Skip,
            len,
        }
    }
}

/// Text fields decoded from an EEPROM, in layout order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EepromInfo {
    fields: Vec<(&'static str, heapless::String<EEPROM_FIELD_MAX>)>,
}

impl EepromInfo {
    /// Look up a decoded text field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.field(SERIAL_NUMBER)
    }

    pub fn model(&self) -> Option<&str> {
        self.field(MODEL)
    }

    pub fn part_number(&self) -> Option<&str> {
        self.field(PART_NUMBER)
    }

    /// Decode `format` from `bytes`, starting at `start_offset`.
    ///
    /// `path` is only used for error reporting.
    pub fn decode(
        bytes: &[u8],
        format: &[EepromField],
        start_offset: usize,
        path: &Path,
    ) -> Result<Self> {
        let needed = start_offset + format.iter().map(|f| f.len).sum::<usize>();
        if bytes.len() < needed {
            return Err(Error::EepromTruncated {
                path: path.to_owned(),
                needed,
                actual: bytes.len(),
            });
        }

        let mut fields = Vec::new();
        let mut offset = start_offset;
        for field in format {
            let raw = &bytes[offset..offset + field.len];
            offset += field.len;

            if field.kind == FieldKind::Skip {
                continue;
            }
            if field.len > EEPROM_FIELD_MAX {
                return Err(Error::FieldTooLong {
                    field: field.name,
                    len: field.len,
                });
            }

            let text = String::from_utf8_lossy(strip_padding(raw));
            let mut value = heapless::String::new();
            value.push_str(text.trim()).map_err(|_| Error::FieldTooLong {
                field: field.name,
                len: text.len(),
            })?;
            fields.push((field.name, value));
        }

        Ok(Self { fields })
    }
}

/// Drop trailing NUL and erased-flash (`0xFF`) bytes.
fn strip_padding(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|b| *b != 0x00 && *b != 0xFF)
        .map_or(0, |i| i + 1);
    &raw[..end]
}

/// Something that can decode an EEPROM image into its identity fields.
pub trait EepromDecoder {
    fn decode(
        &self,
        path: &Path,
        format: &[EepromField],
        start_offset: usize,
    ) -> Result<EepromInfo>;
}

/// [EepromDecoder] reading the sysfs `eeprom` file of an i2c EEPROM.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceEeprom;

impl EepromDecoder for DeviceEeprom {
    fn decode(
        &self,
        path: &Path,
        format: &[EepromField],
        start_offset: usize,
    ) -> Result<EepromInfo> {
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        EepromInfo::decode(&bytes, format, start_offset, path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Build a PSU EEPROM image with the given text fields, padded the way the factory writes them.
    pub(crate) fn psu_eeprom_image(serial: &str, model: &str, part: &str) -> Vec<u8> {
        fn padded(text: &str, pad: u8) -> Vec<u8> {
            let mut field = text.as_bytes().to_vec();
            field.resize(16, pad);
            field
        }

        let mut image = vec![0xFF; PSU_EEPROM_START_OFFSET];
        image.extend(padded(serial, 0x00));
        image.extend(vec![0xAA; 16]);
        image.extend(padded(model, b' '));
        image.extend(padded(part, 0xFF));
        image
    }

    #[test]
    fn decode_psu_layout() {
        let image = psu_eeprom_image("R1234567890", "DPS-200AB-22 A", "9011211");
        let info = EepromInfo::decode(
            &image,
            &PSU_EEPROM_FORMAT,
            PSU_EEPROM_START_OFFSET,
            Path::new("eeprom"),
        )
        .unwrap();

        assert_eq!(info.serial_number(), Some("R1234567890"));
        assert_eq!(info.model(), Some("DPS-200AB-22 A"));
        assert_eq!(info.part_number(), Some("9011211"));
        // Skipped fields are not kept.
        assert_eq!(info.field("burn"), None);
    }

    #[test]
    fn decode_truncated_image() {
        let mut image = psu_eeprom_image("R1", "M1", "P1");
        image.truncate(100);

        let result = EepromInfo::decode(
            &image,
            &PSU_EEPROM_FORMAT,
            PSU_EEPROM_START_OFFSET,
            Path::new("eeprom"),
        );
        assert!(matches!(
            result,
            Err(Error::EepromTruncated {
                needed: 112,
                actual: 100,
                ..
            })
        ));
    }

    #[test]
    fn decode_rejects_oversized_field() {
        let format = [EepromField::text("Vendor", 40)];
        let result = EepromInfo::decode(&[b'A'; 40], &format, 0, Path::new("eeprom"));
        assert!(matches!(
            result,
            Err(Error::FieldTooLong {
                field: "Vendor",
                len: 40
            })
        ));
    }

    #[test]
    fn erased_field_is_empty() {
        let image = psu_eeprom_image("", "M1", "P1");
        let info = EepromInfo::decode(
            &image,
            &PSU_EEPROM_FORMAT,
            PSU_EEPROM_START_OFFSET,
            Path::new("eeprom"),
        )
        .unwrap();
        assert_eq!(info.serial_number(), Some(""));
    }

    #[test]
    fn device_eeprom_reads_file() {
        let td = TempDir::new().unwrap();
        let path = td.path().join("eeprom");
        fs::write(&path, psu_eeprom_image("SN42", "MODEL42", "PN42")).unwrap();

        let info = DeviceEeprom
            .decode(&path, &PSU_EEPROM_FORMAT, PSU_EEPROM_START_OFFSET)
            .unwrap();
        assert_eq!(info.serial_number(), Some("SN42"));
        assert_eq!(info.model(), Some("MODEL42"));
    }

    #[test]
    fn device_eeprom_missing_file() {
        let td = TempDir::new().unwrap();
        let result = DeviceEeprom.decode(
            &td.path().join("eeprom"),
            &PSU_EEPROM_FORMAT,
            PSU_EEPROM_START_OFFSET,
        );
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
