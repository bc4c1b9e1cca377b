//! Dashboard statistics and daily productivity records.

pub mod dashboard;
pub mod productivity;

use chrono::{DateTime, TimeZone, Utc};

pub use dashboard::{completion_percentage, CategoryProgress, DashboardStats};
pub use productivity::{
    HourlyScore, NewProductivity, ProductivityDataPoint, ProductivityInput, Timeframe,
};

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(chrono::NaiveTime::MIN))
}
