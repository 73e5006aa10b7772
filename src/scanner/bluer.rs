//! BlueZ D-Bus scanning backend.
//!
//! Uses the `bluer` crate to run device discovery through the `bluetoothd`
//! daemon and reads each discovered device's advertised properties into an
//! [`Advertisement`] event.

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, ScanError};
use crate::advertisement::Advertisement;
use bluer::{Adapter, AdapterEvent, Address, Session};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

/// Bluetooth SIG company identifier assigned to Woan Technology, the SwitchBot
/// vendor. BlueZ exposes manufacturer data keyed by company; this is the entry
/// the Hub 2 decoder needs.
pub const SWITCHBOT_COMPANY_ID: u16 = 0x0969;

/// Start device discovery and stream advertisement events.
///
/// Initializes the default adapter and runs discovery until the process
/// exits. Adapter/session failures here are fatal; per-device property read
/// failures afterwards are logged at debug level and skipped.
pub async fn start_scan() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    let mut events = adapter.discover_devices().await?;

    // Spawn a task that owns all Bluetooth state and runs the event loop
    tokio::spawn(async move {
        let _session = session;

        while let Some(event) = events.next().await {
            if let AdapterEvent::DeviceAdded(address) = event {
                if let Err(err) = forward_device(&adapter, address, &tx).await {
                    debug!(%address, %err, "failed to read device properties");
                }
            }
        }
    });

    Ok(rx)
}

/// Read one device's advertised properties and forward them as an event.
async fn forward_device(
    adapter: &Adapter,
    address: Address,
    tx: &mpsc::Sender<Advertisement>,
) -> Result<(), ScanError> {
    let device = adapter.device(address)?;

    let service_uuids = device
        .uuids()
        .await?
        .unwrap_or_default()
        .into_iter()
        .collect();
    let service_data = device
        .service_data()
        .await?
        .unwrap_or_default()
        .into_iter()
        .collect();
    let manufacturer_data = device
        .manufacturer_data()
        .await?
        .and_then(|mut by_company| by_company.remove(&SWITCHBOT_COMPANY_ID));

    let advertisement = Advertisement {
        address: address.to_string(),
        service_uuids,
        service_data,
        manufacturer_data,
    };

    // Receiver gone means we're shutting down; nothing to report.
    let _ = tx.send(advertisement).await;

    Ok(())
}
