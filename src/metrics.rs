//! Prometheus exposition for the device state store.
//!
//! The exporter owns its registry and gauge vectors instead of registering
//! into a process-wide default, so tests can build isolated instances.

use crate::store::DeviceStateStore;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tracing::error;

/// Metric namespace, kept from the original exporter even though Hub 2
/// readings flow through the same gauges.
const NAMESPACE: &str = "switchbot_meter";

/// Address label on every gauge sample.
const ADDR_LABEL: &str = "addr";

/// Renders the current store contents as Prometheus gauge samples.
pub struct Exporter {
    registry: Registry,
    temperature: GaugeVec,
    humidity: GaugeVec,
    battery: GaugeVec,
}

impl Exporter {
    pub fn new() -> prometheus::Result<Self> {
        let temperature = GaugeVec::new(
            Opts::new("temperature", "Last reported temperature in Celsius").namespace(NAMESPACE),
            &[ADDR_LABEL],
        )?;
        let humidity = GaugeVec::new(
            Opts::new("humidity", "Last reported relative humidity in percent")
                .namespace(NAMESPACE),
            &[ADDR_LABEL],
        )?;
        let battery = GaugeVec::new(
            Opts::new("battery", "Last reported battery level in percent").namespace(NAMESPACE),
            &[ADDR_LABEL],
        )?;

        let registry = Registry::new();
        registry.register(Box::new(temperature.clone()))?;
        registry.register(Box::new(humidity.clone()))?;
        registry.register(Box::new(battery.clone()))?;

        Ok(Self {
            registry,
            temperature,
            humidity,
            battery,
        })
    }

    /// Snapshot the store, update the gauges and encode them in the
    /// Prometheus text format. Battery is only set for Meter devices.
    pub fn render(&self, store: &DeviceStateStore) -> prometheus::Result<String> {
        for (address, status) in store.snapshot() {
            self.temperature
                .with_label_values(&[address.as_str()])
                .set(status.reading.temperature());
            self.humidity
                .with_label_values(&[address.as_str()])
                .set(f64::from(status.reading.humidity()));
            if let Some(battery) = status.reading.battery() {
                self.battery
                    .with_label_values(&[address.as_str()])
                    .set(f64::from(battery));
            }
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

/// Shared state for the scrape endpoint.
#[derive(Clone)]
pub struct MetricsState {
    pub store: Arc<DeviceStateStore>,
    pub exporter: Arc<Exporter>,
}

/// Build the HTTP router serving `GET /metrics`.
pub fn router(state: MetricsState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn metrics_handler(State(state): State<MetricsState>) -> Result<String, StatusCode> {
    state.exporter.render(&state.store).map_err(|err| {
        error!(%err, "failed to render metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
