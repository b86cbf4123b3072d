//! This module describes the fixed E1031 PSU slot layout and the platform interface every PSU implements.

use std::path::{Path, PathBuf};

use strum_macros::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

use crate::error::{Error, Result};

/// Where the i2c devices are exposed by the kernel.
pub const I2C_DEVICES_ROOT: &str = "/sys/bus/i2c/devices";
/// Where the `e1031.smc` platform driver exposes PSU presence and status flags.
pub const PSU_STATUS_DIR: &str = "/sys/devices/platform/e1031.smc";

/// The E1031 has exactly two PSU slots, indexed the way the chassis enumerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[repr(u8)]
pub enum PsuSlot {
    /// Index 0, "PSU-R".
    Right = 0,
    /// Index 1, "PSU-L".
    Left = 1,
}

/// Per-slot constants.
struct SlotTable {
    name: &'static str,
    location: &'static str,
    i2c_bus: u8,
    i2c_addr: &'static str,
    eeprom_addr: &'static str,
    num_fans: usize,
}

const SLOTS: [SlotTable; 2] = [
    SlotTable {
        name: "PSU-R",
        location: "R",
        i2c_bus: 13,
        i2c_addr: "5b",
        eeprom_addr: "53",
        num_fans: 1,
    },
    SlotTable {
        name: "PSU-L",
        location: "L",
        i2c_bus: 12,
        i2c_addr: "5a",
        eeprom_addr: "52",
        num_fans: 1,
    },
];

impl PsuSlot {
    fn table(&self) -> &'static SlotTable {
        &SLOTS[*self as usize]
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Fixed name reported to the chassis manager.
    pub fn name(&self) -> &'static str {
        self.table().name
    }

    /// Location letter used in the status file names, `R` or `L`.
    pub fn location(&self) -> &'static str {
        self.table().location
    }

    pub fn i2c_bus(&self) -> u8 {
        self.table().i2c_bus
    }

    /// PMBus address of the PSU, as the two hex digits used in sysfs names.
    pub fn i2c_addr(&self) -> &'static str {
        self.table().i2c_addr
    }

    pub fn eeprom_addr(&self) -> &'static str {
        self.table().eeprom_addr
    }

    pub fn num_fans(&self) -> usize {
        self.table().num_fans
    }

    /// `{root}/i2c-{bus}/{bus}-00{addr}/hwmon`
    pub fn hwmon_dir(&self, config: &PlatformConfig) -> PathBuf {
        let bus = self.i2c_bus();
        config
            .i2c_devices_root
            .join(format!("i2c-{bus}"))
            .join(format!("{bus}-00{}", self.i2c_addr()))
            .join("hwmon")
    }

    /// `{root}/{bus}-00{eeprom_addr}/eeprom`
    pub fn eeprom_path(&self, config: &PlatformConfig) -> PathBuf {
        config
            .i2c_devices_root
            .join(format!("{}-00{}", self.i2c_bus(), self.eeprom_addr()))
            .join("eeprom")
    }

    pub fn presence_path(&self, config: &PlatformConfig) -> PathBuf {
        config
            .status_dir
            .join(format!("psu{}_prs", self.location()))
    }

    pub fn status_path(&self, config: &PlatformConfig) -> PathBuf {
        config
            .status_dir
            .join(format!("psu{}_status", self.location()))
    }
}

impl TryFrom<u8> for PsuSlot {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(PsuSlot::Right),
            1 => Ok(PsuSlot::Left),
            other => Err(Error::InvalidPsuIndex(other)),
        }
    }
}

impl From<PsuSlot> for u8 {
    fn from(value: PsuSlot) -> Self {
        value as u8
    }
}

/// Root directories the PSU files are resolved against.
///
/// The defaults point at the real sysfs locations. Use [`PlatformConfig::with_root`] to resolve
/// everything under another prefix, e.g. a captured sysfs tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub i2c_devices_root: PathBuf,
    pub status_dir: PathBuf,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            i2c_devices_root: PathBuf::from(I2C_DEVICES_ROOT),
            status_dir: PathBuf::from(PSU_STATUS_DIR),
        }
    }
}

impl PlatformConfig {
    /// Resolve the default sysfs locations under `root` instead of `/`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let reroot = |absolute: &str| root.join(absolute.trim_start_matches('/'));
        Self {
            i2c_devices_root: reroot(I2C_DEVICES_ROOT),
            status_dir: reroot(PSU_STATUS_DIR),
        }
    }
}

/// Status LED colors understood by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum LedColor {
    Green,
    Amber,
    Red,
    Off,
}

/// The method surface a chassis manager expects from every PSU.
///
/// We use the nomenclature that "get" returns identity, configuration or threshold values, whereas "read"
/// returns a measured value.
pub trait PowerSupply {
    /// Name of the device, e.g. `PSU-R`.
    fn get_name(&self) -> &'static str;

    /// Whether a PSU is plugged into this slot.
    fn get_presence(&self) -> bool;

    /// Whether the PSU is operating properly.
    fn get_status(&self) -> bool;

    /// Whether the PSU output is within regulation.
    fn get_powergood_status(&self) -> bool {
        self.get_status()
    }

    fn get_model(&self) -> Option<String>;

    fn get_serial(&self) -> Option<String>;

    /// Output voltage in volts. `0.0` when the sensor is not exposed.
    fn read_voltage(&self) -> f64;

    /// Output current in amperes. `0.0` when the sensor is not exposed.
    fn read_current(&self) -> f64;

    /// Output power in watts. `0.0` when the sensor is not exposed.
    fn read_power(&self) -> f64;

    /// Temperature in degrees Celsius, to the nearest thousandth.
    fn read_temperature(&self) -> Option<f64>;

    fn get_temperature_high_threshold(&self) -> Option<f64>;

    fn get_voltage_high_threshold(&self) -> f64;

    fn get_voltage_low_threshold(&self) -> f64;

    /// Returns `true` if the LED was set.
    fn set_status_led(&self, color: LedColor) -> bool;

    fn get_status_led(&self) -> LedColor;

    /// 1-based position in the parent device, or `-1` if it cannot be determined.
    fn get_position_in_parent(&self) -> i32;

    fn is_replaceable(&self) -> bool;

    /// Rated output power in watts.
    fn get_maximum_supplied_power(&self) -> f64;

    fn get_num_fans(&self) -> usize;
}
