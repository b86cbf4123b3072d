use std::path::{Path, PathBuf};

use log::{debug, warn};
use strum::IntoEnumIterator;

use crate::{
    eeprom::{DeviceEeprom, EepromDecoder, EepromInfo, PSU_EEPROM_FORMAT, PSU_EEPROM_START_OFFSET},
    error::Result,
    platform::{LedColor, PlatformConfig, PowerSupply, PsuSlot},
    sensor::{
        Attribute, IOUT, LabelQuery, POUT, SensorKind, VOUT, derive_metric_path,
        locate_labeled_file, read_scaled,
    },
    sysfs::{FileReader, SysfsFileReader},
};

/// Used when the driver doesn't expose `in{N}_crit`.
pub const VOLTAGE_HIGH_THRESHOLD_DEFAULT: f64 = 12.6;
/// Used when the driver doesn't expose `in{N}_lcrit`.
pub const VOLTAGE_LOW_THRESHOLD_DEFAULT: f64 = 11.4;
/// Rated output of the E1031 PSUs, in watts.
pub const MAXIMUM_SUPPLIED_POWER_W: f64 = 200.0;

/// One of the two E1031 power supplies.
///
/// All paths are resolved once at construction from the slot tables. Readings are not; every call goes
/// back to sysfs, so polling the same accessor twice repeats the full hwmon scan.
///
/// You can create a Psu over any [FileReader] and [EepromDecoder]; [Psu::new] uses the real filesystem.
pub struct Psu<F: FileReader = SysfsFileReader, E: EepromDecoder = DeviceEeprom> {
    slot: PsuSlot,
    hwmon_dir: PathBuf,
    eeprom_path: PathBuf,
    presence_path: PathBuf,
    status_path: PathBuf,
    files: F,
    eeprom: E,
}

impl Psu {
    /// Create the PSU at `index` (0 or 1) using the default sysfs locations.
    pub fn new(index: u8) -> Result<Self> {
        Self::with_config(index, &PlatformConfig::default())
    }

    /// Create the PSU at `index` (0 or 1) with its files resolved against `config`.
    pub fn with_config(index: u8, config: &PlatformConfig) -> Result<Self> {
        let slot = PsuSlot::try_from(index)?;
        Ok(Self::from_parts(slot, config, SysfsFileReader, DeviceEeprom))
    }

    /// Both PSUs, in slot order.
    pub fn all(config: &PlatformConfig) -> Vec<Self> {
        PsuSlot::iter()
            .map(|slot| Self::from_parts(slot, config, SysfsFileReader, DeviceEeprom))
            .collect()
    }
}

impl<F: FileReader, E: EepromDecoder> Psu<F, E> {
    pub fn from_parts(slot: PsuSlot, config: &PlatformConfig, files: F, eeprom: E) -> Self {
        Self {
            slot,
            hwmon_dir: slot.hwmon_dir(config),
            eeprom_path: slot.eeprom_path(config),
            presence_path: slot.presence_path(config),
            status_path: slot.status_path(config),
            files,
            eeprom,
        }
    }

    pub fn slot(&self) -> PsuSlot {
        self.slot
    }

    pub fn index(&self) -> u8 {
        self.slot.index()
    }

    pub fn hwmon_dir(&self) -> &Path {
        &self.hwmon_dir
    }

    pub fn eeprom_path(&self) -> &Path {
        &self.eeprom_path
    }

    /// Part number from the PSU EEPROM.
    pub fn get_part_number(&self) -> Option<String> {
        self.read_eeprom()?.part_number().map(str::to_owned)
    }

    fn locate(&self, query: LabelQuery) -> Option<PathBuf> {
        locate_labeled_file(&self.files, &self.hwmon_dir, query.label, query.file_prefix)
    }

    /// Locate the rail labelled by `query`, then read its `attribute` file for a `kind` sensor.
    ///
    /// `None` if the rail or the attribute file is missing, or the value is malformed.
    fn read_channel(
        &self,
        query: LabelQuery,
        kind: SensorKind,
        attribute: Attribute,
    ) -> Option<f64> {
        let label_path = self.locate(query)?;
        let path = derive_metric_path(&label_path, kind, attribute);
        self.read_value(&path, kind)
    }

    /// Like [Self::read_channel], but only reads the attribute if the driver exposes it.
    fn read_threshold(
        &self,
        query: LabelQuery,
        kind: SensorKind,
        attribute: Attribute,
    ) -> Option<f64> {
        let label_path = self.locate(query)?;
        let path = derive_metric_path(&label_path, kind, attribute);
        if !self.files.exists(&path) {
            debug!("{}: no {}, using default", self.slot.name(), path.display());
            return None;
        }
        self.read_value(&path, kind)
    }

    fn read_value(&self, path: &Path, kind: SensorKind) -> Option<f64> {
        match read_scaled(&self.files, path, kind) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}: {}", self.slot.name(), e);
                None
            }
        }
    }

    /// A status flag file is set only if it holds exactly `1`. Missing or empty counts as `0`.
    fn read_flag(&self, path: &Path) -> bool {
        let content = self
            .files
            .read_text(path)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "0".to_owned());
        match content.parse::<i64>() {
            Ok(value) => value == 1,
            Err(_) => {
                warn!(
                    "{}: unparseable status {:?} in {}",
                    self.slot.name(),
                    content,
                    path.display()
                );
                false
            }
        }
    }

    fn read_eeprom(&self) -> Option<EepromInfo> {
        match self.eeprom.decode(
            &self.eeprom_path,
            &PSU_EEPROM_FORMAT,
            PSU_EEPROM_START_OFFSET,
        ) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("{}: {}", self.slot.name(), e);
                None
            }
        }
    }
}

impl<F: FileReader, E: EepromDecoder> PowerSupply for Psu<F, E> {
    fn get_name(&self) -> &'static str {
        self.slot.name()
    }

    fn get_presence(&self) -> bool {
        self.read_flag(&self.presence_path)
    }

    fn get_status(&self) -> bool {
        self.read_flag(&self.status_path)
    }

    fn get_model(&self) -> Option<String> {
        self.read_eeprom()?.model().map(str::to_owned)
    }

    fn get_serial(&self) -> Option<String> {
        self.read_eeprom()?.serial_number().map(str::to_owned)
    }

    fn read_voltage(&self) -> f64 {
        self.read_channel(VOUT, SensorKind::Voltage, Attribute::Input)
            .unwrap_or(0.0)
    }

    fn read_current(&self) -> f64 {
        self.read_channel(IOUT, SensorKind::Current, Attribute::Input)
            .unwrap_or(0.0)
    }

    fn read_power(&self) -> f64 {
        self.read_channel(POUT, SensorKind::Power, Attribute::Input)
            .unwrap_or(0.0)
    }

    // The PSU driver has no temperature label; the channel follows the vout1 rail.
    fn read_temperature(&self) -> Option<f64> {
        self.read_channel(VOUT, SensorKind::Temperature, Attribute::Input)
    }

    fn get_temperature_high_threshold(&self) -> Option<f64> {
        self.read_threshold(VOUT, SensorKind::Temperature, Attribute::Max)
    }

    fn get_voltage_high_threshold(&self) -> f64 {
        self.read_threshold(VOUT, SensorKind::Voltage, Attribute::Crit)
            .unwrap_or(VOLTAGE_HIGH_THRESHOLD_DEFAULT)
    }

    fn get_voltage_low_threshold(&self) -> f64 {
        self.read_threshold(VOUT, SensorKind::Voltage, Attribute::Lcrit)
            .unwrap_or(VOLTAGE_LOW_THRESHOLD_DEFAULT)
    }

    /// The E1031 PSU LED is driven by hardware only.
    fn set_status_led(&self, color: LedColor) -> bool {
        debug!("{}: cannot set status LED to {}", self.slot.name(), color);
        false
    }

    fn get_status_led(&self) -> LedColor {
        LedColor::Off
    }

    fn get_position_in_parent(&self) -> i32 {
        -1
    }

    fn is_replaceable(&self) -> bool {
        true
    }

    fn get_maximum_supplied_power(&self) -> f64 {
        MAXIMUM_SUPPLIED_POWER_W
    }

    fn get_num_fans(&self) -> usize {
        self.slot.num_fans()
    }
}
