//! Experiment simulator types.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Treatment,
    Control,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Treatment => "T",
            Variant::Control => "C",
        }
    }
}

/// One user's variant for the run. Drawn once from a seeded generator;
/// immutable for the run. Users without an assignment default to Control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Assignment {
    pub user_id: u32,
    pub variant: Variant,
}

/// Configuration surface of the experiment simulator. All fields have
/// documented defaults; the HTTP layer accepts any subset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentParams {
    /// Trailing window (days from each user's t0) for the outcome metric.
    pub window_days: u32,
    /// Trailing window for the CUPED covariate (early-activity views).
    pub pre_window_days: u32,
    /// Seed for both the variant draw and the simulated noise.
    pub seed: u64,
    /// Target treatment probability, in (0, 1).
    pub p_treat: f64,
    /// Simulated multiplicative lift applied to treatment outcomes, ≥ 0.
    pub lift: f64,
    /// Standard deviation of the additive Gaussian noise, ≥ 0.
    pub noise_sd: f64,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            window_days: 7,
            pre_window_days: 1,
            seed: 7,
            p_treat: 0.5,
            lift: 0.12,
            noise_sd: 0.5,
        }
    }
}

impl ExperimentParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: &str| CoreError::InvalidParameter(msg.to_string());
        if !(self.p_treat > 0.0 && self.p_treat < 1.0) {
            return Err(invalid("p_treat must be strictly between 0 and 1"));
        }
        if self.lift < 0.0 {
            return Err(invalid("lift must be >= 0"));
        }
        if self.noise_sd < 0.0 {
            return Err(invalid("noise_sd must be >= 0"));
        }
        if self.window_days == 0 {
            return Err(invalid("window_days must be >= 1"));
        }
        Ok(())
    }
}

/// Output of one two-sample hypothesis test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub mean_t: f64,
    pub mean_c: f64,
    pub diff: f64,
    /// `100 * diff / mean_c`, epsilon-guarded.
    pub lift_pct: f64,
    pub t_stat: f64,
    pub p_value: f64,
    /// 95% CI for the mean difference (normal approximation).
    pub ci_95: (f64, f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Number of users entering the analysis.
    pub users: usize,
    /// Right-tail chi-square p-value against the expected 50/50 split.
    /// Values below 0.01 are the caller's signal to flag a mismatch.
    pub srm_p_value: f64,
    pub naive: TestSummary,
    pub cuped: TestSummary,
}
