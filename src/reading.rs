//! Decoded sensor readings and per-device state.

use std::time::SystemTime;

/// A reading from a SwitchBot Meter (battery-powered thermometer/hygrometer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    /// Temperature in Celsius. The Meter broadcast format cannot represent
    /// negative temperatures; see `decode::decode_meter`.
    pub temperature: f64,
    /// Relative humidity in percent (devices report 0-99).
    pub humidity: u8,
    /// Battery level in percent (devices report 0-100).
    pub battery: u8,
}

/// A reading from a SwitchBot Hub 2. Mains-powered, so no battery level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hub2Reading {
    /// Temperature in Celsius, sign-aware (Hub 2 encodes an explicit sign bit).
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: u8,
}

/// A decoded reading from any supported device type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Meter(MeterReading),
    Hub2(Hub2Reading),
}

impl Reading {
    pub fn temperature(&self) -> f64 {
        match self {
            Reading::Meter(r) => r.temperature,
            Reading::Hub2(r) => r.temperature,
        }
    }

    pub fn humidity(&self) -> u8 {
        match self {
            Reading::Meter(r) => r.humidity,
            Reading::Hub2(r) => r.humidity,
        }
    }

    /// Battery level, present only for Meter devices.
    pub fn battery(&self) -> Option<u8> {
        match self {
            Reading::Meter(r) => Some(r.battery),
            Reading::Hub2(_) => None,
        }
    }
}

/// Latest known state for one device: the reading plus when it arrived.
///
/// The timestamp is recorded on every update but nothing expires on it;
/// a device that stops transmitting leaves its last reading in place until
/// the process exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStatus {
    pub reading: Reading,
    pub last_update: SystemTime,
}
