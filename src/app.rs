//! Core consume loop: advertisement in, state-store update out.
//!
//! This module is intentionally decoupled from the radio stack and the HTTP
//! server so it can be tested deterministically with an injected scanner and
//! an injected store.

use crate::advertisement::Advertisement;
use crate::decode::classify;
use crate::scanner::ScanError;
use crate::store::DeviceStateStore;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

/// Errors returned by the consume loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Scanner abstraction to enable deterministic unit tests without Bluetooth
/// hardware.
pub trait Scanner: Send + Sync {
    fn start_scan(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>;
}

/// Real scanner implementation backed by BlueZ.
#[derive(Debug, Default, Clone, Copy)]
pub struct BluerScanner;

impl Scanner for BluerScanner {
    fn start_scan(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>
    {
        Box::pin(crate::scanner::start_scan())
    }
}

/// Consume advertisement events until the scanner's channel closes.
///
/// Each event is classified and decoded synchronously; recognized readings
/// overwrite the store entry for their address, everything else is dropped
/// without error. Cancellation is cooperative: dropping this future between
/// events (e.g. from a `tokio::select!`) stops consumption cleanly.
pub async fn run(scanner: &dyn Scanner, store: Arc<DeviceStateStore>) -> Result<(), RunError> {
    let mut advertisements = scanner.start_scan().await?;

    while let Some(advertisement) = advertisements.recv().await {
        if let Some(reading) = classify(&advertisement) {
            info!(
                address = %advertisement.address,
                temperature = reading.temperature(),
                humidity = reading.humidity(),
                battery = reading.battery(),
                "decoded reading"
            );
            store.upsert(&advertisement.address, reading);
        }
    }

    Ok(())
}
