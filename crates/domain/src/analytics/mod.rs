//! Analytics over session collections
//!
//! Pure transformations: no hidden state, every input is passed in. Calendar
//! days and hours of day are evaluated in the time zone the aggregator was
//! built with (`SessionAnalytics::local()` for the operator's wall clock,
//! `SessionAnalytics::new(Utc)` for deterministic fixtures). Every function
//! accepts an empty collection and returns zeroed output.

mod breakdown;
mod report;
mod series;
mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub use breakdown::{
    DayOfWeekShare, PopularTime, TariffRevenue, TariffShare, UNKNOWN_TARIFF, tariff_breakdown,
    tariff_distribution,
};
pub use report::{AnalyticsReport, REPORT_WINDOW_DAYS};
pub use series::{DayBucket, HourBucket, HourlyRow, MAX_WINDOW_DAYS, PeriodComparison};
pub use stats::{
    DurationStats, GrowthRates, Summary, average_session_minutes, duration_histogram,
    growth_rates, total_revenue,
};

/// Minutes below which a visit counts as short
pub const SHORT_VISIT_MINUTES: f64 = 60.0;
/// Minutes below which a visit counts as medium
pub const MEDIUM_VISIT_MINUTES: f64 = 180.0;
/// Reported when no enter events exist
pub const DEFAULT_PEAK_HOUR: u32 = 12;

/// Hour of the day, rendered as `HH:00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourOfDay(pub u32);

impl std::fmt::Display for HourOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

/// Stateless aggregator bound to a time zone
#[derive(Debug, Clone)]
pub struct SessionAnalytics<Tz: TimeZone> {
    tz: Tz,
}

impl SessionAnalytics<Local> {
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> SessionAnalytics<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    fn localize(&self, instant: &DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }
}

/// Period-over-period change in percent
///
/// A zero baseline reports +100 when anything happened and 0 when nothing
/// did; otherwise the plain relative change.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 { 100.0 } else { 0.0 }
    } else {
        ((current - previous) / previous) * 100.0
    }
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of `count` in `total` as a percentage, 0 for an empty total
pub(crate) fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
