//! `switchbot-exporter` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, process exit
//! codes and wiring the HTTP server. The decoding pipeline lives in
//! [`crate::decode`] and [`crate::app`] where it can be tested
//! deterministically with an injected scanner and an injected state store.

pub mod advertisement;
pub mod app;
pub mod decode;
pub mod metrics;
pub mod reading;
pub mod scanner;
pub mod store;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use advertisement::Advertisement;
pub use app::{BluerScanner, RunError, Scanner};
pub use decode::{DecodeError, DeviceKind, classify, decode_hub2, decode_meter};
pub use metrics::{Exporter, MetricsState};
pub use reading::{DeviceStatus, Hub2Reading, MeterReading, Reading};
pub use scanner::ScanError;
pub use store::DeviceStateStore;
