//! Configuration management

use std::str::FromStr;
use std::time::Duration;

use anyhow::{self, Context, Result};
use chrono::NaiveTime;

use crate::defaults::*;

/// How local business hours are turned into absolute instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetMode {
    /// Resolve through the timezone database, following DST
    Zoned,
    /// Legacy behaviour: one fixed UTC offset all year
    Fixed { utc_offset_hours: i32 },
}

/// Business-hour policy of the scheduling engine
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingPolicy {
    pub timezone: String,
    pub offset_mode: OffsetMode,
    /// First and last hourly grid candidate, inclusive
    pub grid_first_hour: u32,
    pub grid_last_hour: u32,
    pub horizon_days: u32,
    /// Work-day bounds for the gap scorer
    pub work_day_start: NaiveTime,
    pub work_day_end: NaiveTime,
    /// Idle time required on top of the service duration to use a gap
    pub gap_padding_minutes: i64,
    /// Distance between a job's end and the next offered start
    pub gap_offset_minutes: i64,
    pub route_day_start: NaiveTime,
    pub route_service_minutes: i64,
    pub route_travel_buffer_minutes: i64,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            offset_mode: OffsetMode::Zoned,
            grid_first_hour: DEFAULT_GRID_FIRST_HOUR,
            grid_last_hour: DEFAULT_GRID_LAST_HOUR,
            horizon_days: DEFAULT_HORIZON_DAYS,
            work_day_start: default_work_start(),
            work_day_end: default_work_end(),
            gap_padding_minutes: DEFAULT_GAP_PADDING_MINUTES,
            gap_offset_minutes: DEFAULT_GAP_OFFSET_MINUTES,
            route_day_start: default_route_day_start(),
            route_service_minutes: DEFAULT_ROUTE_SERVICE_MINUTES,
            route_travel_buffer_minutes: DEFAULT_ROUTE_TRAVEL_BUFFER_MINUTES,
        }
    }
}

impl SchedulingPolicy {
    /// Load the policy from `SCHEDULER_*` environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let offset_mode = match std::env::var("SCHEDULER_OFFSET_MODE")
            .unwrap_or_else(|_| "zoned".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "zoned" => OffsetMode::Zoned,
            "fixed" => OffsetMode::Fixed {
                utc_offset_hours: env_or("SCHEDULER_FIXED_UTC_OFFSET_HOURS", DEFAULT_FIXED_UTC_OFFSET_HOURS)?,
            },
            other => anyhow::bail!("SCHEDULER_OFFSET_MODE must be 'zoned' or 'fixed', got '{}'", other),
        };

        let policy = Self {
            timezone: std::env::var("SCHEDULER_TIMEZONE").unwrap_or(defaults.timezone),
            offset_mode,
            grid_first_hour: env_or("SCHEDULER_GRID_FIRST_HOUR", defaults.grid_first_hour)?,
            grid_last_hour: env_or("SCHEDULER_GRID_LAST_HOUR", defaults.grid_last_hour)?,
            horizon_days: env_or("SCHEDULER_HORIZON_DAYS", defaults.horizon_days)?,
            work_day_start: env_time_or("SCHEDULER_WORKDAY_START", defaults.work_day_start)?,
            work_day_end: env_time_or("SCHEDULER_WORKDAY_END", defaults.work_day_end)?,
            gap_padding_minutes: defaults.gap_padding_minutes,
            gap_offset_minutes: defaults.gap_offset_minutes,
            route_day_start: env_time_or("SCHEDULER_ROUTE_DAY_START", defaults.route_day_start)?,
            route_service_minutes: env_or("SCHEDULER_ROUTE_SERVICE_MINUTES", defaults.route_service_minutes)?,
            route_travel_buffer_minutes: env_or(
                "SCHEDULER_ROUTE_TRAVEL_BUFFER_MINUTES",
                defaults.route_travel_buffer_minutes,
            )?,
        };

        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_last_hour > 23 || self.grid_first_hour > self.grid_last_hour {
            anyhow::bail!(
                "grid hours must satisfy first <= last <= 23 (got {}..={})",
                self.grid_first_hour,
                self.grid_last_hour
            );
        }
        if self.horizon_days == 0 {
            anyhow::bail!("search horizon must be at least one day");
        }
        if self.work_day_end <= self.work_day_start {
            anyhow::bail!(
                "work day must end after it starts ({} - {})",
                self.work_day_start,
                self.work_day_end
            );
        }
        if self.route_service_minutes <= 0 || self.route_travel_buffer_minutes < 0 {
            anyhow::bail!("route step must be positive");
        }
        Ok(())
    }

    /// Time between consecutive stops written by the route sequencer
    pub fn route_step_minutes(&self) -> i64 {
        self.route_service_minutes + self.route_travel_buffer_minutes
    }
}

/// Which geocoder implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderBackend {
    Mock,
    Nominatim,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Nominatim API URL (for geocoding)
    pub nominatim_url: String,

    pub geocoder_backend: GeocoderBackend,

    /// Deadline applied to every store call
    pub store_timeout: Duration,

    pub policy: SchedulingPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let nominatim_url = std::env::var("NOMINATIM_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let geocoder_backend = match std::env::var("GEOCODER_BACKEND")
            .unwrap_or_else(|_| "nominatim".to_string())
            .as_str()
        {
            "mock" => GeocoderBackend::Mock,
            "nominatim" => GeocoderBackend::Nominatim,
            other => anyhow::bail!("GEOCODER_BACKEND must be 'mock' or 'nominatim', got '{}'", other),
        };

        let store_timeout = Duration::from_secs(env_or("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?);

        let policy = SchedulingPolicy::from_env().context("Invalid scheduling policy")?;

        Ok(Self {
            nats_url,
            database_url,
            nominatim_url,
            geocoder_backend,
            store_timeout,
            policy,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

fn env_time_or(key: &str, default: NaiveTime) -> Result<NaiveTime> {
    match std::env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .with_context(|| format!("{} must be HH:MM, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_business_constants() {
        let policy = SchedulingPolicy::default();
        assert_eq!(policy.timezone, "America/Montreal");
        assert_eq!(policy.grid_first_hour, 8);
        assert_eq!(policy.grid_last_hour, 18);
        assert_eq!(policy.horizon_days, 7);
        assert_eq!(policy.route_day_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(policy.route_step_minutes(), 75);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_grid() {
        let policy = SchedulingPolicy {
            grid_first_hour: 18,
            grid_last_hour: 8,
            ..SchedulingPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_work_day() {
        let policy = SchedulingPolicy {
            work_day_end: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            ..SchedulingPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_policy_reads_fixed_offset_mode() {
        std::env::set_var("SCHEDULER_OFFSET_MODE", "fixed");
        std::env::set_var("SCHEDULER_FIXED_UTC_OFFSET_HOURS", "-4");

        let policy = SchedulingPolicy::from_env().unwrap();
        assert_eq!(policy.offset_mode, OffsetMode::Fixed { utc_offset_hours: -4 });

        std::env::remove_var("SCHEDULER_OFFSET_MODE");
        std::env::remove_var("SCHEDULER_FIXED_UTC_OFFSET_HOURS");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_policy_rejects_malformed_time() {
        std::env::set_var("SCHEDULER_ROUTE_DAY_START", "nine");
        assert!(SchedulingPolicy::from_env().is_err());
        std::env::remove_var("SCHEDULER_ROUTE_DAY_START");
    }
}
