use chrono::{Datelike, TimeZone};
use serde::{Deserialize, Serialize};

use super::{SessionAnalytics, share};
use crate::session::SessionWithDetails;

/// Label used for sessions whose tariff plan could not be resolved
pub const UNKNOWN_TARIFF: &str = "Unknown";

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffShare {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffRevenue {
    pub name: String,
    pub count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTime {
    pub hour: u32,
    pub count: usize,
    /// Share of all enter events
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOfWeekShare {
    pub day: String,
    pub count: usize,
    pub percentage: f64,
}

fn tariff_label(session: &SessionWithDetails) -> &str {
    session.tariff_name().unwrap_or(UNKNOWN_TARIFF)
}

/// Session count per tariff name in first-seen order
pub fn tariff_distribution(sessions: &[SessionWithDetails]) -> Vec<TariffShare> {
    let mut shares: Vec<TariffShare> = Vec::new();
    for session in sessions {
        let name = tariff_label(session);
        match shares.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.count += 1,
            None => shares.push(TariffShare {
                name: name.to_string(),
                count: 1,
            }),
        }
    }
    shares
}

/// Count and revenue per tariff, highest revenue first
pub fn tariff_breakdown(sessions: &[SessionWithDetails]) -> Vec<TariffRevenue> {
    let mut rows: Vec<TariffRevenue> = Vec::new();
    for session in sessions {
        let name = tariff_label(session);
        match rows.iter_mut().find(|r| r.name == name) {
            Some(row) => {
                row.count += 1;
                row.revenue += session.price();
            }
            None => rows.push(TariffRevenue {
                name: name.to_string(),
                count: 1,
                revenue: session.price(),
            }),
        }
    }
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows
}

impl<Tz: TimeZone> SessionAnalytics<Tz> {
    /// Hours that saw at least one enter event, busiest first
    pub fn popular_times(&self, sessions: &[SessionWithDetails]) -> Vec<PopularTime> {
        let counts = self.enter_counts_by_hour(sessions);
        let total: usize = counts.iter().sum();

        let mut times: Vec<PopularTime> = counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(hour, &count)| PopularTime {
                hour: hour as u32,
                count,
                percentage: share(count, total),
            })
            .collect();
        times.sort_by(|a, b| b.count.cmp(&a.count));
        times
    }

    /// Session starts per weekday, busiest first; ties keep Sunday-first order
    pub fn busiest_days(&self, sessions: &[SessionWithDetails]) -> Vec<DayOfWeekShare> {
        let mut counts = [0usize; 7];
        for session in sessions {
            let weekday = self.localize(&session.start_time()).weekday();
            counts[weekday.num_days_from_sunday() as usize] += 1;
        }

        let mut days: Vec<DayOfWeekShare> = DAY_NAMES
            .iter()
            .zip(counts)
            .map(|(day, count)| DayOfWeekShare {
                day: day.to_string(),
                count,
                percentage: share(count, sessions.len()),
            })
            .collect();
        days.sort_by(|a, b| b.count.cmp(&a.count));
        days
    }
}
