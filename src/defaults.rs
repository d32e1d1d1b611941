use chrono::NaiveTime;

pub const DEFAULT_TIMEZONE: &str = "America/Montreal";

/// Legacy Eastern Standard Time approximation (local hour + 5 = UTC)
pub const DEFAULT_FIXED_UTC_OFFSET_HOURS: i32 = -5;

pub const DEFAULT_SERVICE_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_JOB_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_MIN_TECHNICIANS: i32 = 1;

pub const DEFAULT_GRID_FIRST_HOUR: u32 = 8;
pub const DEFAULT_GRID_LAST_HOUR: u32 = 18;
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

pub const DEFAULT_GAP_PADDING_MINUTES: i64 = 30;
pub const DEFAULT_GAP_OFFSET_MINUTES: i64 = 15;

pub const DEFAULT_ROUTE_SERVICE_MINUTES: i64 = 60;
pub const DEFAULT_ROUTE_TRAVEL_BUFFER_MINUTES: i64 = 15;

pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

pub fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("valid static default work start")
}

pub fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).expect("valid static default work end")
}

pub fn default_route_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("valid static default route start")
}
