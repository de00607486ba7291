//! Rating → event derivation.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use reelytics_core::event::{Event, EventType, RatingRow, COMMENT_THRESHOLD, LIKE_THRESHOLD};

/// Expand raw ratings into the normalized event log, sorted by timestamp
/// ascending.
///
/// Every rating yields one `view`; ratings ≥ 4.0 additionally one `like`;
/// ratings ≥ 4.5 additionally one `comment`. All share the rating's
/// timestamp. Rows with a timestamp outside chrono's representable range are
/// dropped with a warning rather than failing the whole derivation.
pub fn derive_events(ratings: &[RatingRow]) -> Vec<Event> {
    let mut events = Vec::with_capacity(ratings.len() * 2);
    let mut skipped = 0usize;

    for row in ratings {
        let ts = match Utc.timestamp_opt(row.timestamp, 0).single() {
            Some(ts) => ts,
            None => {
                skipped += 1;
                continue;
            }
        };
        events.push(Event {
            user_id: row.user_id,
            item_id: row.item_id,
            event_type: EventType::View,
            ts,
        });
        if row.rating >= LIKE_THRESHOLD {
            events.push(Event {
                user_id: row.user_id,
                item_id: row.item_id,
                event_type: EventType::Like,
                ts,
            });
        }
        if row.rating >= COMMENT_THRESHOLD {
            events.push(Event {
                user_id: row.user_id,
                item_id: row.item_id,
                event_type: EventType::Comment,
                ts,
            });
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Dropped ratings with unrepresentable timestamps");
    }

    // Stable sort keeps the view/like/comment order within one rating.
    events.sort_by_key(|e| e.ts);
    events
}

/// Each user's t0: the timestamp of their earliest event. All windowed
/// metrics are computed relative to this per-user origin, not a global clock.
pub fn first_event_ts(events: &[Event]) -> HashMap<u32, DateTime<Utc>> {
    let mut first: HashMap<u32, DateTime<Utc>> = HashMap::new();
    for event in events {
        first
            .entry(event.user_id)
            .and_modify(|ts| {
                if event.ts < *ts {
                    *ts = event.ts;
                }
            })
            .or_insert(event.ts);
    }
    first
}
