use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoints and pacing for the remote mileage tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MileageConfig {
    /// Desk mileage server (`/api/mileage`, `/api/mileage/bulk`). The server
    /// tier is skipped when unset.
    pub server_url: Option<String>,
    /// Forward geocoder search endpoint.
    pub geocode_url: String,
    /// Routing service root; `/route/v1/driving/...` is appended.
    pub route_url: String,
    /// Sent on geocoder requests; public instances reject anonymous clients.
    pub user_agent: String,
    pub origin_geocode_delay_ms: u64,
    pub dest_geocode_delay_ms: u64,
    /// Pause after each lane looked up directly.
    pub lane_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for MileageConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            geocode_url: "https://nominatim.openstreetmap.org/search".to_string(),
            route_url: "https://router.project-osrm.org".to_string(),
            user_agent: "LumberDesk/1.0".to_string(),
            origin_geocode_delay_ms: 500,
            dest_geocode_delay_ms: 300,
            lane_delay_ms: 600,
            timeout_secs: 10,
        }
    }
}

impl MileageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Same endpoints with every delay zeroed. Used against local fakes.
    pub fn without_delays(mut self) -> Self {
        self.origin_geocode_delay_ms = 0;
        self.dest_geocode_delay_ms = 0;
        self.lane_delay_ms = 0;
        self
    }
}
