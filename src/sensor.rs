//! Lookup of PMBus hwmon sensors by label.
//!
//! The hwmon channel numbers a PSU driver assigns are not stable across kernels, so a reading is found
//! in two steps:
//! 1. [locate_labeled_file] scans the hwmon tree for the `*_label` file naming the rail, e.g. `in3_label`
//!    containing `vout1`.
//! 2. [derive_metric_path] takes the channel number from that file name and builds the sibling attribute
//!    path, e.g. `in3_input` or `in3_crit`.

use std::path::{Path, PathBuf};

use log::debug;
use strum_macros::{AsRefStr, EnumIter};

use crate::{
    error::{Error, Result},
    sysfs::FileReader,
};

/// The hwmon sensor types we read, named by their attribute file prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
pub enum SensorKind {
    /// Millivolts.
    #[strum(serialize = "in")]
    Voltage,
    /// Milliamps.
    #[strum(serialize = "curr")]
    Current,
    /// Microwatts.
    #[strum(serialize = "power")]
    Power,
    /// Millidegrees Celsius.
    #[strum(serialize = "temp")]
    Temperature,
}

impl SensorKind {
    /// Divisor from the raw sysfs value to volts, amps, watts or degrees Celsius.
    pub const fn scale(&self) -> f64 {
        match self {
            SensorKind::Voltage | SensorKind::Current | SensorKind::Temperature => 1_000.0,
            SensorKind::Power => 1_000_000.0,
        }
    }
}

/// The per-channel attribute files we read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Attribute {
    Input,
    Crit,
    Lcrit,
    Max,
}

/// A rail label and the file name prefix of the candidates that may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelQuery {
    pub label: &'static str,
    pub file_prefix: &'static str,
}

/// Output voltage rail.
pub const VOUT: LabelQuery = LabelQuery {
    label: "vout1",
    file_prefix: "in",
};

/// Output current rail.
pub const IOUT: LabelQuery = LabelQuery {
    label: "iout1",
    file_prefix: "cur",
};

/// Output power rail.
pub const POUT: LabelQuery = LabelQuery {
    label: "pout1",
    file_prefix: "power",
};

/// Return the first file under `directory` whose name starts with `file_prefix` and whose contents
/// contain `label`.
///
/// Files are visited in whatever order the tree enumerates them, so the result is only deterministic
/// when at most one file matches. A missing directory is simply no match.
pub fn locate_labeled_file<F: FileReader + ?Sized>(
    files: &F,
    directory: &Path,
    label: &str,
    file_prefix: &str,
) -> Option<PathBuf> {
    let found = files.list_files(directory).into_iter().find(|path| {
        let name_matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(file_prefix));
        name_matches
            && files
                .read_text(path)
                .is_some_and(|content| content.contains(label))
    });

    if found.is_none() {
        debug!(
            "No {}* file labelled {:?} under {}",
            file_prefix,
            label,
            directory.display()
        );
    }
    found
}

/// The digits of a file name, in order. `in12_label` -> `12`.
pub fn channel_number(path: &Path) -> String {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .chars()
                .filter(char::is_ascii_digit)
                .collect()
        })
        .unwrap_or_default()
}

/// Path of the `attribute` file for the channel `label_path` belongs to, in the same directory.
pub fn derive_metric_path(label_path: &Path, kind: SensorKind, attribute: Attribute) -> PathBuf {
    let name = format!(
        "{}{}_{}",
        kind.as_ref(),
        channel_number(label_path),
        attribute.as_ref()
    );
    match label_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Read an integer sysfs value and scale it to base units.
///
/// `Ok(None)` if the file cannot be read, an error if its contents are not an integer.
pub fn read_scaled<F: FileReader + ?Sized>(
    files: &F,
    path: &Path,
    kind: SensorKind,
) -> Result<Option<f64>> {
    let Some(content) = files.read_text(path) else {
        return Ok(None);
    };
    let raw: i64 = content.parse().map_err(|_| Error::Parse {
        path: path.to_owned(),
        content: content.clone(),
    })?;
    Ok(Some(raw as f64 / kind.scale()))
}
