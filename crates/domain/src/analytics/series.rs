use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{SessionAnalytics, percentage_change};
use crate::session::{EntryAction, SessionWithDetails};

/// Longest daily window served; longer requests are clamped to it
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Activity for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Month abbreviation and zero-padded day, e.g. `Jan 05`
    pub label: String,
    /// Sessions started this day
    pub visitors: usize,
    pub entries: usize,
    pub exits: usize,
    /// Tariff revenue of sessions started this day
    pub revenue: f64,
    /// Mean elapsed minutes of the sessions started this day
    pub average_session_minutes: f64,
}

impl DayBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            label: date.format("%b %d").to_string(),
            visitors: 0,
            entries: 0,
            exits: 0,
            revenue: 0.0,
            average_session_minutes: 0.0,
        }
    }
}

/// Sessions with at least one enter event in `hour`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourBucket {
    pub hour: u32,
    pub count: usize,
}

/// Full hour-of-day row: starts and revenue by start hour, entries and
/// exits by log hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRow {
    pub hour: u32,
    pub visitors: usize,
    pub revenue: f64,
    pub entries: usize,
    pub exits: usize,
}

/// Current window against the window immediately before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub current: Vec<DayBucket>,
    pub previous: Vec<DayBucket>,
    pub visitor_change: f64,
    pub revenue_change: f64,
}

impl PeriodComparison {
    pub fn current_visitors(&self) -> usize {
        self.current.iter().map(|d| d.visitors).sum()
    }

    pub fn previous_visitors(&self) -> usize {
        self.previous.iter().map(|d| d.visitors).sum()
    }

    pub fn current_revenue(&self) -> f64 {
        self.current.iter().map(|d| d.revenue).sum()
    }

    pub fn previous_revenue(&self) -> f64 {
        self.previous.iter().map(|d| d.revenue).sum()
    }
}

/// Inclusive run of local calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DaySpan {
    first: NaiveDate,
    last: NaiveDate,
}

impl DaySpan {
    /// `days` days ending on `last`, `None` when empty or before the calendar starts
    fn ending(last: NaiveDate, days: u32) -> Option<Self> {
        let back = days.checked_sub(1)?;
        let first = last.checked_sub_days(Days::new(u64::from(back)))?;
        Some(Self { first, last })
    }

    /// Span of the same length ending the day before this one starts
    fn preceding(&self, days: u32) -> Option<Self> {
        Self::ending(self.first.pred_opt()?, days)
    }

    fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }

    fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first.iter_days().take_while(move |day| *day <= self.last)
    }
}

impl<Tz: TimeZone> SessionAnalytics<Tz> {
    fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    fn local_hour(&self, instant: &DateTime<Utc>) -> u32 {
        self.localize(instant).hour()
    }

    /// Current and previous spans of a `window_days` window ending on the
    /// local day of `now`
    fn periods(&self, window_days: u32, now: DateTime<Utc>) -> (Option<DaySpan>, Option<DaySpan>) {
        let window = window_days.min(MAX_WINDOW_DAYS);
        let current = DaySpan::ending(self.local_date(&now), window);
        let previous = current.and_then(|span| span.preceding(window));
        (current, previous)
    }

    /// One bucket per calendar day for the `window_days` days ending on the
    /// day containing `reference`, oldest first. Running sessions are timed
    /// up to `reference`.
    pub fn bucket_by_day(
        &self,
        sessions: &[SessionWithDetails],
        window_days: u32,
        reference: DateTime<Utc>,
    ) -> Vec<DayBucket> {
        let (current, _) = self.periods(window_days, reference);
        current
            .map(|span| self.bucket_span(sessions, span, reference))
            .unwrap_or_default()
    }

    fn bucket_span(
        &self,
        sessions: &[SessionWithDetails],
        span: DaySpan,
        now: DateTime<Utc>,
    ) -> Vec<DayBucket> {
        let mut buckets: Vec<DayBucket> = span.days().map(DayBucket::empty).collect();
        let mut minutes = vec![0.0; buckets.len()];

        let index: HashMap<NaiveDate, usize> = buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| (bucket.date, i))
            .collect();

        for session in sessions {
            if let Some(&i) = index.get(&self.local_date(&session.start_time())) {
                buckets[i].visitors += 1;
                buckets[i].revenue += session.price();
                minutes[i] += session.elapsed_minutes(now);
            }

            for log in &session.entry_logs {
                if let Some(&i) = index.get(&self.local_date(&log.timestamp)) {
                    match log.action {
                        EntryAction::Enter => buckets[i].entries += 1,
                        EntryAction::Exit => buckets[i].exits += 1,
                    }
                }
            }
        }

        for (bucket, total) in buckets.iter_mut().zip(minutes) {
            if bucket.visitors > 0 {
                bucket.average_session_minutes = total / bucket.visitors as f64;
            }
        }

        buckets
    }

    /// Daily buckets for the window ending at `now` and for the window of
    /// the same length immediately before it
    pub fn compare_periods(
        &self,
        sessions: &[SessionWithDetails],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> PeriodComparison {
        let (current, previous) = self.periods(window_days, now);
        let buckets = |span: Option<DaySpan>| {
            span.map(|span| self.bucket_span(sessions, span, now))
                .unwrap_or_default()
        };

        let mut comparison = PeriodComparison {
            current: buckets(current),
            previous: buckets(previous),
            visitor_change: 0.0,
            revenue_change: 0.0,
        };
        comparison.visitor_change = percentage_change(
            comparison.current_visitors() as f64,
            comparison.previous_visitors() as f64,
        );
        comparison.revenue_change =
            percentage_change(comparison.current_revenue(), comparison.previous_revenue());
        comparison
    }

    /// Sessions started in the current window and in the window before it,
    /// by local start day. Day bounds match `compare_periods`; anything
    /// older is dropped.
    pub fn split_periods(
        &self,
        sessions: &[SessionWithDetails],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> (Vec<SessionWithDetails>, Vec<SessionWithDetails>) {
        let (current, previous) = self.periods(window_days, now);
        let within = |span: Option<DaySpan>, day: NaiveDate| span.is_some_and(|s| s.contains(day));

        let mut split = (Vec::new(), Vec::new());
        for session in sessions {
            let day = self.local_date(&session.start_time());
            if within(current, day) {
                split.0.push(session.clone());
            } else if within(previous, day) {
                split.1.push(session.clone());
            }
        }
        split
    }

    /// 24 buckets counting sessions with an enter event in each hour
    pub fn bucket_by_hour(&self, sessions: &[SessionWithDetails]) -> Vec<HourBucket> {
        let mut counts = [0usize; 24];

        for session in sessions {
            let mut seen = [false; 24];
            for log in session.entry_logs.iter().filter(|log| log.is_enter()) {
                seen[self.local_hour(&log.timestamp) as usize] = true;
            }
            for (hour, hit) in seen.iter().enumerate() {
                if *hit {
                    counts[hour] += 1;
                }
            }
        }

        counts
            .iter()
            .enumerate()
            .map(|(hour, &count)| HourBucket {
                hour: hour as u32,
                count,
            })
            .collect()
    }

    pub fn hourly_breakdown(&self, sessions: &[SessionWithDetails]) -> Vec<HourlyRow> {
        let mut rows: Vec<HourlyRow> = (0..24)
            .map(|hour| HourlyRow {
                hour,
                visitors: 0,
                revenue: 0.0,
                entries: 0,
                exits: 0,
            })
            .collect();

        for session in sessions {
            let start = &mut rows[self.local_hour(&session.start_time()) as usize];
            start.visitors += 1;
            start.revenue += session.price();

            for log in &session.entry_logs {
                let row = &mut rows[self.local_hour(&log.timestamp) as usize];
                match log.action {
                    EntryAction::Enter => row.entries += 1,
                    EntryAction::Exit => row.exits += 1,
                }
            }
        }

        rows
    }
}
