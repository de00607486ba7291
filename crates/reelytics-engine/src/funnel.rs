//! Activation funnel over each user's first days.
//!
//! Three fixed steps, all relative to the user's own t0:
//! signup (any event), activation (enough early views), week-1 retention
//! (any return event in the day-7-to-8 window). Steps 2 and 3 are
//! independent conditions; each is ≤ the signup count but they are not
//! ordered relative to one another.

use std::collections::{HashMap, HashSet};

use reelytics_core::analytics::{FunnelReport, FunnelStepRow, FunnelThresholds};
use reelytics_core::event::{Event, EventType};

use crate::derive::first_event_ts;
use crate::SECONDS_PER_DAY;

pub fn build_funnel(events: &[Event], thresholds: &FunnelThresholds) -> FunnelReport {
    let t0 = first_event_ts(events);
    let signup_count = t0.len() as i64;

    let mut early_views: HashMap<u32, u32> = HashMap::new();
    let mut week1_users: HashSet<u32> = HashSet::new();

    for event in events {
        let Some(origin) = t0.get(&event.user_id) else {
            continue;
        };
        let days_since = (event.ts - *origin).num_seconds() as f64 / SECONDS_PER_DAY;

        if event.event_type == EventType::View && days_since <= thresholds.activation_window_days {
            *early_views.entry(event.user_id).or_insert(0) += 1;
        }
        if days_since >= thresholds.week1_start_days && days_since < thresholds.week1_end_days {
            week1_users.insert(event.user_id);
        }
    }

    let activation_count = early_views
        .values()
        .filter(|&&views| views >= thresholds.activation_min_views)
        .count() as i64;
    let week1_count = week1_users.len() as i64;

    let rate = |users: i64| {
        if signup_count > 0 {
            users as f64 / signup_count as f64
        } else {
            0.0
        }
    };

    FunnelReport {
        steps: vec![
            FunnelStepRow {
                step: "signup".to_string(),
                users: signup_count,
                rate_vs_signup: rate(signup_count),
            },
            FunnelStepRow {
                step: "activation".to_string(),
                users: activation_count,
                rate_vs_signup: rate(activation_count),
            },
            FunnelStepRow {
                step: "week1_retention".to_string(),
                users: week1_count,
                rate_vs_signup: rate(week1_count),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::build_funnel;
    use crate::derive::derive_events;
    use reelytics_core::analytics::FunnelThresholds;
    use reelytics_core::event::RatingRow;

    const DAY: i64 = 86_400;

    fn rating(user_id: u32, item_id: u32, timestamp: i64) -> RatingRow {
        RatingRow {
            user_id,
            item_id,
            rating: 3.0,
            timestamp,
        }
    }

    #[test]
    fn counts_each_step_against_signup() {
        let mut ratings = Vec::new();
        // User 1: five views on day 0 (activated), plus a day-7 return.
        for item in 0..5 {
            ratings.push(rating(1, item, 1_000 + i64::from(item)));
        }
        ratings.push(rating(1, 99, 1_000 + 7 * DAY));
        // User 2: a single view, nothing else.
        ratings.push(rating(2, 1, 5_000));
        // User 3: two views then a return on day 9 (outside the window).
        ratings.push(rating(3, 1, 9_000));
        ratings.push(rating(3, 2, 9_000 + DAY));
        ratings.push(rating(3, 3, 9_000 + 9 * DAY));

        let report = build_funnel(&derive_events(&ratings), &FunnelThresholds::default());

        assert_eq!(report.steps[0].step, "signup");
        assert_eq!(report.steps[0].users, 3);
        assert!((report.steps[0].rate_vs_signup - 1.0).abs() < 1e-12);

        assert_eq!(report.steps[1].step, "activation");
        assert_eq!(report.steps[1].users, 1);

        assert_eq!(report.steps[2].step, "week1_retention");
        assert_eq!(report.steps[2].users, 1);

        // Neither later step can exceed signup.
        assert!(report.steps[1].users <= report.steps[0].users);
        assert!(report.steps[2].users <= report.steps[0].users);
    }

    #[test]
    fn week1_window_is_half_open() {
        let thresholds = FunnelThresholds::default();
        // Exactly day 7.0 is in; exactly day 8.0 is out.
        let in_window = vec![rating(1, 1, 0), rating(1, 2, 7 * DAY)];
        let report = build_funnel(&derive_events(&in_window), &thresholds);
        assert_eq!(report.steps[2].users, 1);

        let out_of_window = vec![rating(1, 1, 0), rating(1, 2, 8 * DAY)];
        let report = build_funnel(&derive_events(&out_of_window), &thresholds);
        assert_eq!(report.steps[2].users, 0);
    }

    #[test]
    fn empty_log_reports_zero_rows_without_dividing_by_zero() {
        let report = build_funnel(&[], &FunnelThresholds::default());
        assert!(report.steps.iter().all(|s| s.users == 0));
        assert!(report.steps.iter().all(|s| s.rate_vs_signup == 0.0));
    }
}
