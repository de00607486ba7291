//! Analytics report types shared by the engine and the HTTP layer.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CohortGranularity {
    Day,
    #[default]
    Week,
}

impl CohortGranularity {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Week),
            Some("day") => Ok(Self::Day),
            Some("week") => Ok(Self::Week),
            Some(_) => Err(anyhow!("granularity must be one of: day, week")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// One observation period of a cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortPeriod {
    pub period_start: NaiveDate,
    pub active_users: i64,
    /// `active_users / cohort_size`; 1.0 at the cohort's own starting period.
    pub retention_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortRow {
    pub cohort_start: NaiveDate,
    pub cohort_size: i64,
    pub periods: Vec<CohortPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortReport {
    pub granularity: CohortGranularity,
    pub rows: Vec<CohortRow>,
}

/// Funnel step definitions. Configuration, not invariants; the thresholds
/// are a business decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelThresholds {
    /// Minimum `view` events within `activation_window_days` of t0 to count
    /// as activated.
    pub activation_min_views: u32,
    pub activation_window_days: f64,
    /// Half-open `[week1_start_days, week1_end_days)` return window after t0.
    pub week1_start_days: f64,
    pub week1_end_days: f64,
}

impl Default for FunnelThresholds {
    fn default() -> Self {
        Self {
            activation_min_views: 5,
            activation_window_days: 3.0,
            week1_start_days: 7.0,
            week1_end_days: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelStepRow {
    pub step: String,
    pub users: i64,
    /// Fraction of the signup step; 1.0 for the signup step itself.
    pub rate_vs_signup: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelReport {
    pub steps: Vec<FunnelStepRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSummary {
    pub avg_dau: f64,
    pub peak_dau: f64,
    /// mean(DAU) / mean(30-day rolling MAU proxy), epsilon-guarded.
    pub dau_mau_ratio: f64,
    pub avg_daily_events: f64,
}
