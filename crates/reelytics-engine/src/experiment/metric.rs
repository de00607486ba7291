//! Per-user windowed outcome metric.

use std::collections::BTreeMap;

use reelytics_core::event::{Event, EventType};

use crate::derive::first_event_ts;
use crate::SECONDS_PER_DAY;

/// Count each user's `view` events in `[t0, t0 + window_days]`, inclusive of
/// the lower bound, where t0 is that user's own first event timestamp.
///
/// Returned as a `BTreeMap` so downstream iteration order is deterministic.
pub fn views_within_window(events: &[Event], window_days: u32) -> BTreeMap<u32, f64> {
    let t0 = first_event_ts(events);
    let mut counts: BTreeMap<u32, f64> = BTreeMap::new();

    for event in events {
        if event.event_type != EventType::View {
            continue;
        }
        let Some(origin) = t0.get(&event.user_id) else {
            continue;
        };
        let days_since = (event.ts - *origin).num_seconds() as f64 / SECONDS_PER_DAY;
        if (0.0..=f64::from(window_days)).contains(&days_since) {
            *counts.entry(event.user_id).or_insert(0.0) += 1.0;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::views_within_window;
    use crate::derive::derive_events;
    use reelytics_core::event::RatingRow;

    const DAY: i64 = 86_400;

    fn rating(user_id: u32, item_id: u32, value: f64, timestamp: i64) -> RatingRow {
        RatingRow {
            user_id,
            item_id,
            rating: value,
            timestamp,
        }
    }

    #[test]
    fn counts_only_views_inside_each_users_window() {
        let ratings = vec![
            rating(1, 1, 3.0, 0),
            rating(1, 2, 3.0, 3 * DAY),
            rating(1, 3, 3.0, 10 * DAY), // outside the 7-day window
            rating(2, 1, 3.0, 100 * DAY),
            rating(2, 2, 3.0, 105 * DAY), // inside: relative to user 2's own t0
        ];
        let m = views_within_window(&derive_events(&ratings), 7);
        assert_eq!(m.get(&1).copied(), Some(2.0));
        assert_eq!(m.get(&2).copied(), Some(2.0));
    }

    #[test]
    fn likes_and_comments_do_not_count() {
        // A 5.0 rating derives view + like + comment; only the view counts.
        let m = views_within_window(&derive_events(&[rating(1, 1, 5.0, 0)]), 7);
        assert_eq!(m.get(&1).copied(), Some(1.0));
    }

    #[test]
    fn window_upper_bound_is_inclusive() {
        let ratings = vec![rating(1, 1, 3.0, 0), rating(1, 2, 3.0, 7 * DAY)];
        let m = views_within_window(&derive_events(&ratings), 7);
        assert_eq!(m.get(&1).copied(), Some(2.0));
    }
}
