use crate::advertisement::Advertisement;
use crate::decode::{HUB2_MIN_LEN, SWITCHBOT_SERVICE_DATA_UUID};

/// A stable device address for unit tests.
pub const TEST_ADDR: &str = "AA:BB:CC:DD:EE:FF";

/// The reference Meter broadcast: 100% battery, 25.5 C, 50% humidity.
pub fn meter_payload() -> Vec<u8> {
    vec![0x54, 0x00, 0x64, 0x05, 0x19, 0x32]
}

/// A minimal Hub 2 manufacturer-data payload. `fraction` lands in byte 15,
/// `degrees` (sign bit included) in byte 16, `humidity` in byte 17.
pub fn hub2_payload(fraction: u8, degrees: u8, humidity: u8) -> Vec<u8> {
    let mut data = vec![0u8; HUB2_MIN_LEN];
    data[15] = fraction;
    data[16] = degrees;
    data[17] = humidity;
    data
}

/// An advertisement carrying `payload` in a 0xfd3d service-data block.
pub fn meter_advertisement(payload: Vec<u8>) -> Advertisement {
    Advertisement {
        address: TEST_ADDR.to_string(),
        service_uuids: Vec::new(),
        service_data: vec![(SWITCHBOT_SERVICE_DATA_UUID, payload)],
        manufacturer_data: None,
    }
}

/// A Hub 2 advertisement: the service-data block only routes (device type
/// 0x76); the reading itself sits in the manufacturer data.
pub fn hub2_advertisement(manufacturer_data: Vec<u8>) -> Advertisement {
    Advertisement {
        address: TEST_ADDR.to_string(),
        service_uuids: Vec::new(),
        service_data: vec![(SWITCHBOT_SERVICE_DATA_UUID, vec![0x76])],
        manufacturer_data: Some(manufacturer_data),
    }
}
