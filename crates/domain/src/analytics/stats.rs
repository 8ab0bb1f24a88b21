use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{
    DEFAULT_PEAK_HOUR, HourOfDay, MEDIUM_VISIT_MINUTES, SHORT_VISIT_MINUTES, SessionAnalytics,
    percentage_change, round2,
};
use crate::session::{EntryAction, SessionStatus, SessionWithDetails};

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: f64,
    pub total_visitors: usize,
    pub currently_inside: usize,
    pub currently_outside: usize,
    pub average_session_minutes: f64,
    pub peak_hour: HourOfDay,
    pub today_entries: usize,
    pub today_exits: usize,
}

/// Visits classified by elapsed time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationStats {
    /// Under an hour
    pub short: usize,
    /// One to three hours
    pub medium: usize,
    /// Three hours or more
    pub long: usize,
}

/// Percentage changes between two periods, rounded to two decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRates {
    pub revenue: f64,
    pub visitors: f64,
    pub session_time: f64,
}

/// Tariff revenue; ad-hoc product sales are not included
pub fn total_revenue(sessions: &[SessionWithDetails]) -> f64 {
    sessions.iter().map(SessionWithDetails::price).sum()
}

/// Mean minutes from start to end (or to `now` while running), 0 when empty
pub fn average_session_minutes(sessions: &[SessionWithDetails], now: DateTime<Utc>) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let total: f64 = sessions.iter().map(|s| s.elapsed_minutes(now)).sum();
    total / sessions.len() as f64
}

pub fn duration_histogram(sessions: &[SessionWithDetails], now: DateTime<Utc>) -> DurationStats {
    let mut stats = DurationStats::default();
    for session in sessions {
        let minutes = session.elapsed_minutes(now);
        if minutes < SHORT_VISIT_MINUTES {
            stats.short += 1;
        } else if minutes < MEDIUM_VISIT_MINUTES {
            stats.medium += 1;
        } else {
            stats.long += 1;
        }
    }
    stats
}

pub fn growth_rates(
    current: &[SessionWithDetails],
    previous: &[SessionWithDetails],
    now: DateTime<Utc>,
) -> GrowthRates {
    GrowthRates {
        revenue: round2(percentage_change(
            total_revenue(current),
            total_revenue(previous),
        )),
        visitors: round2(percentage_change(
            current.len() as f64,
            previous.len() as f64,
        )),
        session_time: round2(percentage_change(
            average_session_minutes(current, now),
            average_session_minutes(previous, now),
        )),
    }
}

impl<Tz: TimeZone> SessionAnalytics<Tz> {
    /// Enter counts per local hour, indexed 0..24
    pub(crate) fn enter_counts_by_hour(&self, sessions: &[SessionWithDetails]) -> [usize; 24] {
        let mut counts = [0usize; 24];
        for log in sessions
            .iter()
            .flat_map(|s| s.entry_logs.iter())
            .filter(|log| log.is_enter())
        {
            counts[self.localize(&log.timestamp).hour() as usize] += 1;
        }
        counts
    }

    /// Hour with the strictly highest number of enter events
    ///
    /// Ties keep the earliest hour. Without any enter events the default
    /// peak of 12:00 is reported.
    pub fn peak_hour(&self, sessions: &[SessionWithDetails]) -> HourOfDay {
        let counts = self.enter_counts_by_hour(sessions);
        let mut best = (DEFAULT_PEAK_HOUR, 0usize);
        for (hour, &count) in counts.iter().enumerate() {
            if count > best.1 {
                best = (hour as u32, count);
            }
        }
        HourOfDay(best.0)
    }

    /// Entries and exits logged on the local calendar day of `now`
    pub fn today_activity(&self, sessions: &[SessionWithDetails], now: DateTime<Utc>) -> (usize, usize) {
        let today = self.localize(&now).date_naive();
        let mut entries = 0;
        let mut exits = 0;

        for log in sessions.iter().flat_map(|s| s.entry_logs.iter()) {
            if self.localize(&log.timestamp).date_naive() != today {
                continue;
            }
            match log.action {
                EntryAction::Enter => entries += 1,
                EntryAction::Exit => exits += 1,
            }
        }
        (entries, exits)
    }

    pub fn summary(&self, sessions: &[SessionWithDetails], now: DateTime<Utc>) -> Summary {
        let currently_inside = sessions
            .iter()
            .filter(|s| s.status() == SessionStatus::Inside)
            .count();
        let (today_entries, today_exits) = self.today_activity(sessions, now);

        Summary {
            total_revenue: total_revenue(sessions),
            total_visitors: sessions.len(),
            currently_inside,
            currently_outside: sessions.len() - currently_inside,
            average_session_minutes: average_session_minutes(sessions, now),
            peak_hour: self.peak_hour(sessions),
            today_entries,
            today_exits,
        }
    }
}
