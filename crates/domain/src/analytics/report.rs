use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::breakdown::tariff_breakdown;
use super::stats::duration_histogram;
use super::{
    DayBucket, DayOfWeekShare, DurationStats, HourlyRow, PopularTime, SessionAnalytics,
    Summary, TariffRevenue,
};
use crate::session::SessionWithDetails;

/// Days covered by the daily series of a report
pub const REPORT_WINDOW_DAYS: u32 = 7;

/// Everything the reports screen shows, in one serialisable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub hourly: Vec<HourlyRow>,
    pub daily: Vec<DayBucket>,
    pub duration: DurationStats,
    pub popular_times: Vec<PopularTime>,
    pub busiest_days: Vec<DayOfWeekShare>,
    pub tariff_breakdown: Vec<TariffRevenue>,
}

impl<Tz: TimeZone> SessionAnalytics<Tz> {
    pub fn report(&self, sessions: &[SessionWithDetails], now: DateTime<Utc>) -> AnalyticsReport {
        self.report_with_window(sessions, REPORT_WINDOW_DAYS, now)
    }

    pub fn report_with_window(
        &self,
        sessions: &[SessionWithDetails],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> AnalyticsReport {
        AnalyticsReport {
            generated_at: now,
            summary: self.summary(sessions, now),
            hourly: self.hourly_breakdown(sessions),
            daily: self.bucket_by_day(sessions, window_days, now),
            duration: duration_histogram(sessions, now),
            popular_times: self.popular_times(sessions),
            busiest_days: self.busiest_days(sessions),
            tariff_breakdown: tariff_breakdown(sessions),
        }
    }
}
