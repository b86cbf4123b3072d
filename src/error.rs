//! Our error types for the E1031 PSUs.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for E1031 PSU sysfs and EEPROM access.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid PSU index {0}, platform only has slots 0 and 1")]
    InvalidPsuIndex(u8),
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unparseable sensor value {content:?} in {}", path.display())]
    Parse { path: PathBuf, content: String },
    #[error("EEPROM {} too short: need {needed} bytes, have {actual}", path.display())]
    EepromTruncated {
        path: PathBuf,
        needed: usize,
        actual: usize,
    },
    #[error("EEPROM field {field} is {len} bytes, too long to decode")]
    FieldTooLong { field: &'static str, len: usize },
}
