//! Scan source: turns BlueZ advertisements into [`Advertisement`] events.
//!
//! Everything protocol-specific happens downstream in [`crate::decode`];
//! this module only shovels radio events into a channel.

pub mod bluer;

use crate::advertisement::Advertisement;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error type for scanner startup. Once the event loop is running, per-device
/// read failures are logged and skipped rather than surfaced here.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth session/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

/// Channel buffer size for advertisement events. Broadcast intervals are on
/// a human timescale, so a small buffer is plenty.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Start scanning for advertisements using the BlueZ D-Bus backend.
pub async fn start_scan() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    bluer::start_scan().await
}
