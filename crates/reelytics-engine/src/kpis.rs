//! Daily-active KPI aggregates.

use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use reelytics_core::analytics::KpiSummary;
use reelytics_core::event::Event;

use crate::{EPSILON, INSUFFICIENT_DATA_MARKER};

const MAU_WINDOW_DAYS: usize = 30;

/// Compute DAU, the 30-day trailing rolling-mean MAU proxy, their ratio, and
/// the mean daily event count.
///
/// All aggregates run over the contiguous calendar-day series from the first
/// to the last event date; days with no events count as zero. The rolling
/// mean allows a minimum of one day of history, so early dates never produce
/// NaN.
pub fn product_kpis(events: &[Event]) -> Result<KpiSummary> {
    if events.is_empty() {
        return Err(anyhow!(INSUFFICIENT_DATA_MARKER));
    }

    let mut actives: BTreeMap<NaiveDate, HashSet<u32>> = BTreeMap::new();
    let mut event_counts: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for event in events {
        let date = event.ts.date_naive();
        actives.entry(date).or_default().insert(event.user_id);
        *event_counts.entry(date).or_insert(0) += 1;
    }

    // BTreeMap keys are sorted; first/last exist because events is non-empty.
    let Some((&first_date, _)) = actives.iter().next() else {
        return Err(anyhow!(INSUFFICIENT_DATA_MARKER));
    };
    let Some((&last_date, _)) = actives.iter().next_back() else {
        return Err(anyhow!(INSUFFICIENT_DATA_MARKER));
    };

    let mut dau: Vec<f64> = Vec::new();
    let mut daily_events: Vec<f64> = Vec::new();
    let mut date = first_date;
    while date <= last_date {
        dau.push(actives.get(&date).map_or(0.0, |set| set.len() as f64));
        daily_events.push(event_counts.get(&date).copied().unwrap_or(0) as f64);
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    let mau_proxy: Vec<f64> = (0..dau.len())
        .map(|i| {
            let start = i.saturating_sub(MAU_WINDOW_DAYS - 1);
            let window = &dau[start..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect();

    let avg_dau = mean(&dau);
    let peak_dau = dau.iter().cloned().fold(0.0, f64::max);
    let avg_mau = mean(&mau_proxy);

    Ok(KpiSummary {
        avg_dau,
        peak_dau,
        dau_mau_ratio: avg_dau / (avg_mau + EPSILON),
        avg_daily_events: mean(&daily_events),
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::product_kpis;
    use crate::derive::derive_events;
    use crate::INSUFFICIENT_DATA_MARKER;
    use reelytics_core::event::RatingRow;

    const DAY: i64 = 86_400;

    fn rating(user_id: u32, timestamp: i64) -> RatingRow {
        RatingRow {
            user_id,
            item_id: 1,
            rating: 3.0,
            timestamp,
        }
    }

    #[test]
    fn empty_log_is_insufficient_data() {
        let err = match product_kpis(&[]) {
            Err(err) => err,
            Ok(_) => panic!("expected error"),
        };
        assert!(err.to_string().contains(INSUFFICIENT_DATA_MARKER));
    }

    #[test]
    fn single_day_dataset_has_ratio_near_one() {
        let ratings = vec![rating(1, 1_000), rating(2, 2_000), rating(3, 3_000)];
        let kpis = match product_kpis(&derive_events(&ratings)) {
            Ok(kpis) => kpis,
            Err(err) => panic!("kpis failed: {err}"),
        };
        assert!((kpis.avg_dau - 3.0).abs() < 1e-9);
        assert!((kpis.peak_dau - 3.0).abs() < 1e-9);
        // One day of history: MAU proxy equals DAU, ratio ≈ 1.
        assert!((kpis.dau_mau_ratio - 1.0).abs() < 1e-6);
        assert!((kpis.avg_daily_events - 3.0).abs() < 1e-9);
    }

    #[test]
    fn gap_days_count_as_zero_actives() {
        // Activity on day 0 and day 2, nothing on day 1.
        let ratings = vec![rating(1, 0), rating(2, 0), rating(1, 2 * DAY)];
        let kpis = match product_kpis(&derive_events(&ratings)) {
            Ok(kpis) => kpis,
            Err(err) => panic!("kpis failed: {err}"),
        };
        // DAU series is [2, 0, 1].
        assert!((kpis.avg_dau - 1.0).abs() < 1e-9);
        assert!((kpis.peak_dau - 2.0).abs() < 1e-9);
    }
}
