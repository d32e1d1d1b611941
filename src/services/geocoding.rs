//! Geocoding of property addresses
//!
//! - `MockGeocoder` for tests and development (deterministic, no network)
//! - `NominatimGeocoder` for production, rate limited to the public usage policy

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::{Config, GeocoderBackend};
use crate::types::Coordinates;

/// Geocoder trait - abstraction for all geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns None if the address cannot be resolved
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

// ==========================================================================
// MockGeocoder
// ==========================================================================

/// Deterministic fake coordinates inside Greater Montreal
pub struct MockGeocoder;

impl MockGeocoder {
    pub fn new() -> Self {
        Self
    }

    fn hash_to_coordinates(address: &str) -> Coordinates {
        let mut hasher = DefaultHasher::new();
        address.trim().to_lowercase().hash(&mut hasher);
        let hash = hasher.finish();

        const LAT_MIN: f64 = 45.40;
        const LAT_MAX: f64 = 45.70;
        const LNG_MIN: f64 = -73.95;
        const LNG_MAX: f64 = -73.45;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lng_normalized = ((hash & 0xFFFF_FFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + lat_normalized * (LAT_MAX - LAT_MIN),
            lng: LNG_MIN + lng_normalized * (LNG_MAX - LNG_MIN),
        }
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        if address.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::hash_to_coordinates(address)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ==========================================================================
// RateLimiter
// ==========================================================================

/// Rate limiter that enforces minimum interval between calls
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until it's safe to make another call
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                // Lock stays held so concurrent callers queue up behind us
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// ==========================================================================
// NominatimGeocoder
// ==========================================================================

/// Nominatim allows 1 req/s
const DEFAULT_RATE_LIMIT_MS: u64 = 1500;

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fieldops-scheduler/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            rate_limiter: RateLimiter::new(Duration::from_millis(DEFAULT_RATE_LIMIT_MS)),
        })
    }

    fn search_url(&self, address: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(address)
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        self.rate_limiter.wait().await;

        let response = self.client
            .get(self.search_url(address))
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        match results.first() {
            Some(result) => {
                let lat: f64 = result.lat.parse().context("Invalid latitude")?;
                let lng: f64 = result.lon.parse().context("Invalid longitude")?;
                Ok(Some(Coordinates { lat, lng }))
            }
            None => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Create the geocoder selected by configuration
pub fn create_geocoder(config: &Config) -> Result<Box<dyn Geocoder>> {
    match config.geocoder_backend {
        GeocoderBackend::Mock => {
            info!("Using MockGeocoder");
            Ok(Box::new(MockGeocoder::new()))
        }
        GeocoderBackend::Nominatim => {
            info!("Using NominatimGeocoder at {}", config.nominatim_url);
            Ok(Box::new(NominatimGeocoder::new(&config.nominatim_url)?))
        }
    }
}
