//! Advertisement event shape produced by the scan source.

use uuid::Uuid;

/// One broadcast advertisement as seen by the radio stack.
///
/// This is the only input the decoding pipeline works with. The scanner
/// backend fills it from BlueZ device properties; tests build it directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Advertisement {
    /// Stable address of the transmitter in textual form (e.g. "AA:BB:CC:DD:EE:FF").
    /// Used only as a state-store key, never parsed.
    pub address: String,
    /// Service UUIDs advertised alongside the data blocks.
    pub service_uuids: Vec<Uuid>,
    /// Service-data blocks: `(service UUID, payload bytes)` pairs.
    /// Payload length varies per packet and must be length-checked before indexing.
    pub service_data: Vec<(Uuid, Vec<u8>)>,
    /// Manufacturer-specific bytes, if the advertisement carried any.
    /// Distinct from service data; the Hub 2 reading lives here.
    pub manufacturer_data: Option<Vec<u8>>,
}
