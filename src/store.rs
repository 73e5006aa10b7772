//! Last-write-wins state store keyed by device address.

use crate::reading::{DeviceStatus, Reading};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

/// Latest known reading per device address.
///
/// The scan-consuming task writes through [`upsert`](Self::upsert) while
/// scrape handlers read through [`snapshot`](Self::snapshot); both sides
/// share one instance behind an `Arc`. A new reading for a known address
/// unconditionally overwrites the previous one. Entries are never expired.
#[derive(Debug, Default)]
pub struct DeviceStateStore {
    inner: RwLock<HashMap<String, DeviceStatus>>,
}

impl DeviceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the reading for `address`, stamping it with the
    /// current wall-clock time.
    pub fn upsert(&self, address: &str, reading: Reading) {
        let status = DeviceStatus {
            reading,
            last_update: SystemTime::now(),
        };
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), status);
    }

    /// Point-in-time copy of all current entries, safe to iterate while
    /// writers continue on the shared instance.
    pub fn snapshot(&self) -> HashMap<String, DeviceStatus> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
