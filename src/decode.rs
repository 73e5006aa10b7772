//! Advertisement classification and payload decoding for SwitchBot devices.
//!
//! Classification routes on the device-type byte found in a service-data
//! block; decoding turns the type-specific byte layout into physical
//! quantities. Both are pure functions over the [`Advertisement`] event.

use crate::advertisement::Advertisement;
use crate::reading::{Hub2Reading, MeterReading, Reading};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// 128-bit SwitchBot service UUID advertised by the sensor family.
///
/// Matching this in the advertised service list is one of two accepted gates;
/// textual form cba20d00-224d-11e6-9fb8-0002a5d5c51b.
pub const SWITCHBOT_SERVICE_UUID: Uuid = Uuid::from_u128(0xcba20d00_224d_11e6_9fb8_0002a5d5c51b);

/// 16-bit service-data UUID (0xfd3d) used by newer firmware, expanded to the
/// Bluetooth base UUID. Matching a service-data block against this is the
/// other accepted gate; no service-list check is required with it.
pub const SWITCHBOT_SERVICE_DATA_UUID: Uuid = Uuid::from_u128(0x0000fd3d_0000_1000_8000_00805f9b34fb);

/// Device-type code for the Meter, after masking.
pub const DEVICE_TYPE_METER: u8 = 0x54;

/// Device-type code for the Hub 2, after masking.
pub const DEVICE_TYPE_HUB2: u8 = 0x76;

/// The device-type byte carries a flag in its high bit; only the low 7 bits
/// identify the device.
pub const DEVICE_TYPE_MASK: u8 = 0x7f;

/// Minimum service-data length for a decodable Meter broadcast.
pub const METER_MIN_LEN: usize = 6;

/// Minimum manufacturer-data length for a decodable Hub 2 broadcast.
pub const HUB2_MIN_LEN: usize = 18;

/// Device family recognized from the masked device-type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Meter,
    Hub2,
    Unrecognized,
}

impl DeviceKind {
    /// Classify a raw device-type byte (mask applied here).
    pub fn from_type_byte(byte: u8) -> Self {
        match byte & DEVICE_TYPE_MASK {
            DEVICE_TYPE_METER => DeviceKind::Meter,
            DEVICE_TYPE_HUB2 => DeviceKind::Hub2,
            _ => DeviceKind::Unrecognized,
        }
    }
}

/// Reasons a payload is rejected. All of these are silent drops at the
/// pipeline level: no state update, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognized device type {0:#04x}")]
    UnrecognizedDevice(u8),
    #[error("payload too short: {got} bytes, need at least {min}")]
    TruncatedPayload { got: usize, min: usize },
    #[error("hub 2 broadcast without manufacturer data")]
    MissingManufacturerData,
}

/// Decode a Meter service-data payload.
///
/// Layout (after the device-type byte at offset 0):
/// byte 2 battery percent, byte 3 temperature tenths, byte 4 integer degrees
/// (high bit is a flag and is stripped), byte 5 humidity percent (high bit
/// reserved). The integer-degree byte has no sign, so this path cannot
/// produce negative temperatures; that is the documented Meter behavior.
pub fn decode_meter(data: &[u8]) -> Result<MeterReading, DecodeError> {
    if data.len() < METER_MIN_LEN {
        return Err(DecodeError::TruncatedPayload {
            got: data.len(),
            min: METER_MIN_LEN,
        });
    }

    let battery = data[2];
    let temperature = f64::from(data[4] & 0x7f) + f64::from(data[3]) / 10.0;
    let humidity = data[5] & 0x7f;

    Ok(MeterReading {
        temperature,
        humidity,
        battery,
    })
}

/// Decode a Hub 2 manufacturer-data payload.
///
/// Byte 15 low nibble holds temperature tenths, byte 16 low 7 bits the
/// integer degrees. Bit 7 of byte 16 is the sign: SET means above freezing,
/// CLEAR means below freezing (the inverse of the usual convention, kept
/// exactly as the device documents it). Byte 17 low 7 bits is humidity.
pub fn decode_hub2(data: &[u8]) -> Result<Hub2Reading, DecodeError> {
    if data.len() < HUB2_MIN_LEN {
        return Err(DecodeError::TruncatedPayload {
            got: data.len(),
            min: HUB2_MIN_LEN,
        });
    }

    let magnitude = f64::from(data[15] & 0x0f) / 10.0 + f64::from(data[16] & 0x7f);
    let temperature = if data[16] & 0x80 != 0 {
        magnitude
    } else {
        -magnitude
    };
    let humidity = data[17] & 0x7f;

    Ok(Hub2Reading {
        temperature,
        humidity,
    })
}

/// Classify one advertisement and decode the first matching service-data
/// block.
///
/// A block is considered when either gate passes: the advertisement carries
/// the 128-bit SwitchBot service UUID in its service list, or the block
/// itself uses the 16-bit 0xfd3d service-data UUID. Blocks that fail to
/// decode are skipped so later blocks in the same advertisement still get a
/// chance. Returns `None` when nothing matched, which is not an error.
pub fn classify(advertisement: &Advertisement) -> Option<Reading> {
    let service_gate = advertisement
        .service_uuids
        .iter()
        .any(|uuid| *uuid == SWITCHBOT_SERVICE_UUID);

    for (uuid, data) in &advertisement.service_data {
        if !service_gate && *uuid != SWITCHBOT_SERVICE_DATA_UUID {
            continue;
        }
        let Some(&type_byte) = data.first() else {
            continue;
        };

        let outcome = match DeviceKind::from_type_byte(type_byte) {
            DeviceKind::Meter => decode_meter(data).map(Reading::Meter),
            DeviceKind::Hub2 => advertisement
                .manufacturer_data
                .as_deref()
                .ok_or(DecodeError::MissingManufacturerData)
                .and_then(decode_hub2)
                .map(Reading::Hub2),
            DeviceKind::Unrecognized => Err(DecodeError::UnrecognizedDevice(type_byte)),
        };

        match outcome {
            Ok(reading) => return Some(reading),
            Err(err) => {
                debug!(address = %advertisement.address, %err, "dropping service-data block");
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        TEST_ADDR, hub2_advertisement, hub2_payload, meter_advertisement, meter_payload,
    };

    #[test]
    fn test_decode_meter_reference_packet() {
        // 0x64 battery, 0x05 tenths, 0x19 (25) degrees, 0x32 (50) humidity
        let reading = decode_meter(&meter_payload()).unwrap();
        assert_eq!(reading.battery, 100);
        assert_eq!(reading.temperature, 25.5);
        assert_eq!(reading.humidity, 50);
    }

    #[test]
    fn test_decode_meter_strips_flag_bits() {
        let reading = decode_meter(&[0x54, 0x00, 0x64, 0x05, 0x99, 0xb2]).unwrap();
        // 0x99 & 0x7f = 0x19 = 25, 0xb2 & 0x7f = 0x32 = 50
        assert_eq!(reading.temperature, 25.5);
        assert_eq!(reading.humidity, 50);
    }

    #[test]
    fn test_decode_meter_too_short() {
        for len in 0..METER_MIN_LEN {
            let data = vec![0x54; len];
            assert_eq!(
                decode_meter(&data),
                Err(DecodeError::TruncatedPayload {
                    got: len,
                    min: METER_MIN_LEN
                })
            );
        }
    }

    #[test]
    fn test_decode_hub2_below_freezing() {
        // bit 7 of byte 16 clear: below freezing, magnitude 22.2
        let reading = decode_hub2(&hub2_payload(0x02, 0x16, 0x2d)).unwrap();
        assert_eq!(reading.temperature, -22.2);
        assert_eq!(reading.humidity, 45);
    }

    #[test]
    fn test_decode_hub2_above_freezing() {
        // same magnitude with bit 7 set: positive
        let reading = decode_hub2(&hub2_payload(0x02, 0x96, 0x2d)).unwrap();
        assert_eq!(reading.temperature, 22.2);
    }

    #[test]
    fn test_decode_hub2_masks_humidity_flag() {
        let reading = decode_hub2(&hub2_payload(0x00, 0x96, 0xad)).unwrap();
        assert_eq!(reading.humidity, 0x2d);
    }

    #[test]
    fn test_decode_hub2_too_short() {
        let data = vec![0u8; HUB2_MIN_LEN - 1];
        assert_eq!(
            decode_hub2(&data),
            Err(DecodeError::TruncatedPayload {
                got: HUB2_MIN_LEN - 1,
                min: HUB2_MIN_LEN
            })
        );
    }

    #[test]
    fn test_device_kind_masks_high_bit() {
        assert_eq!(DeviceKind::from_type_byte(0x54), DeviceKind::Meter);
        assert_eq!(DeviceKind::from_type_byte(0xd4), DeviceKind::Meter);
        assert_eq!(DeviceKind::from_type_byte(0x76), DeviceKind::Hub2);
        assert_eq!(DeviceKind::from_type_byte(0xf6), DeviceKind::Hub2);
        assert_eq!(DeviceKind::from_type_byte(0x01), DeviceKind::Unrecognized);
    }

    #[test]
    fn test_classify_meter_via_service_data_uuid() {
        let advertisement = meter_advertisement(meter_payload());
        let reading = classify(&advertisement).unwrap();
        assert_eq!(reading.temperature(), 25.5);
        assert_eq!(reading.battery(), Some(100));
    }

    #[test]
    fn test_classify_meter_via_service_uuid_gate() {
        // Block under an arbitrary UUID still matches when the advertised
        // service list carries the SwitchBot service UUID.
        let mut advertisement = meter_advertisement(meter_payload());
        advertisement.service_data[0].0 = Uuid::from_u128(0xdead_beef);
        assert_eq!(classify(&advertisement), None);

        advertisement.service_uuids.push(SWITCHBOT_SERVICE_UUID);
        assert!(classify(&advertisement).is_some());
    }

    #[test]
    fn test_classify_hub2_uses_manufacturer_data() {
        let advertisement = hub2_advertisement(hub2_payload(0x02, 0x96, 0x2d));
        let reading = classify(&advertisement).unwrap();
        assert_eq!(reading.temperature(), 22.2);
        assert_eq!(reading.humidity(), 45);
        assert_eq!(reading.battery(), None);
    }

    #[test]
    fn test_classify_hub2_without_manufacturer_data() {
        let mut advertisement = hub2_advertisement(hub2_payload(0x02, 0x96, 0x2d));
        advertisement.manufacturer_data = None;
        assert_eq!(classify(&advertisement), None);
    }

    #[test]
    fn test_classify_unknown_device_type() {
        // Well-formed, long enough, but device type 0x01 is not ours.
        let mut advertisement = meter_advertisement(meter_payload());
        advertisement.service_data[0].1[0] = 0x01;
        assert_eq!(classify(&advertisement), None);
    }

    #[test]
    fn test_classify_skips_bad_block_and_keeps_scanning() {
        let mut advertisement = meter_advertisement(vec![0x54, 0x00]);
        advertisement
            .service_data
            .push((SWITCHBOT_SERVICE_DATA_UUID, meter_payload()));
        assert!(classify(&advertisement).is_some());
    }

    #[test]
    fn test_classify_empty_advertisement() {
        let advertisement = Advertisement {
            address: TEST_ADDR.to_string(),
            ..Default::default()
        };
        assert_eq!(classify(&advertisement), None);
    }

    #[test]
    fn test_classify_empty_block() {
        let advertisement = meter_advertisement(Vec::new());
        assert_eq!(classify(&advertisement), None);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::TruncatedPayload { got: 3, min: 6 };
        assert_eq!(format!("{}", err), "payload too short: 3 bytes, need at least 6");

        let err = DecodeError::UnrecognizedDevice(0x01);
        assert_eq!(format!("{}", err), "unrecognized device type 0x01");
    }
}
