//! Cohort / retention computation.
//!
//! A user's cohort is the start of the period containing their earliest
//! event. For every (cohort, period) pair with at least one active user the
//! report carries distinct-active counts and the rate against the cohort's
//! size. The cohort's own starting period is 1.0 by construction.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use reelytics_core::analytics::{CohortGranularity, CohortPeriod, CohortReport, CohortRow};
use reelytics_core::event::Event;

use crate::derive::first_event_ts;

/// Truncate a date to the start of its period. Weeks start Monday.
pub fn period_start(date: NaiveDate, granularity: CohortGranularity) -> NaiveDate {
    match granularity {
        CohortGranularity::Day => date,
        CohortGranularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
    }
}

pub fn build_cohorts(events: &[Event], granularity: CohortGranularity) -> CohortReport {
    let t0 = first_event_ts(events);

    let mut cohort_of: HashMap<u32, NaiveDate> = HashMap::with_capacity(t0.len());
    for (&user_id, ts) in &t0 {
        cohort_of.insert(user_id, period_start(ts.date_naive(), granularity));
    }

    // Distinct active users per (cohort, observation period).
    let mut active: BTreeMap<(NaiveDate, NaiveDate), HashSet<u32>> = BTreeMap::new();
    for event in events {
        let Some(&cohort) = cohort_of.get(&event.user_id) else {
            continue;
        };
        let period = period_start(event.ts.date_naive(), granularity);
        active.entry((cohort, period)).or_default().insert(event.user_id);
    }

    let mut sizes: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for &cohort in cohort_of.values() {
        *sizes.entry(cohort).or_insert(0) += 1;
    }

    let mut grouped: BTreeMap<NaiveDate, Vec<CohortPeriod>> = BTreeMap::new();
    for ((cohort, period), users) in &active {
        let cohort_size = sizes.get(cohort).copied().unwrap_or(0);
        let active_users = users.len() as i64;
        // Guard the zero-size cohort: degenerate rate, never a crash.
        let retention_rate = if cohort_size > 0 {
            active_users as f64 / cohort_size as f64
        } else {
            0.0
        };
        grouped.entry(*cohort).or_default().push(CohortPeriod {
            period_start: *period,
            active_users,
            retention_rate,
        });
    }

    let rows = grouped
        .into_iter()
        .map(|(cohort_start, periods)| CohortRow {
            cohort_start,
            cohort_size: sizes.get(&cohort_start).copied().unwrap_or(0),
            periods,
        })
        .collect();

    CohortReport { granularity, rows }
}
