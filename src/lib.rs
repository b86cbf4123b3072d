//! This crate exposes power supply telemetry and identity for the Celestica E1031 switch platform.
//!
//! The E1031 has two hot-swappable PSU slots. Everything here is read from files the kernel already exposes:
//! * PMBus hwmon readings under each PSU's i2c device directory.
//! * Presence and power-good flags from the `e1031.smc` platform driver.
//! * Serial number and model from the PSU's i2c EEPROM.
//!
//! Every accessor reads fresh from sysfs, nothing is cached between calls. Missing sensors are normal and
//! map to fallback values rather than errors.
//!
//! ```no_run
//! use e1031_psu::{PlatformConfig, PowerSupply, Psu};
//!
//! for psu in Psu::all(&PlatformConfig::default()) {
//!     println!("{}: {:.2} V", psu.get_name(), psu.read_voltage());
//! }
//! ```

pub mod eeprom;
pub mod error;
pub mod platform;
pub mod psu;
pub mod sensor;
pub mod sysfs;

#[cfg(test)]
mod mock_fs;

pub use platform::{LedColor, PlatformConfig, PowerSupply, PsuSlot};
pub use psu::Psu;
