//! Closed-form statistics: SRM chi-square, CUPED adjustment, Welch's t-test.

use anyhow::{anyhow, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

use reelytics_core::experiment::TestSummary;

use crate::{EPSILON, INSUFFICIENT_DATA_MARKER};

/// Two-cell chi-square goodness-of-fit against the expected 50/50 split
/// (df = 1). Returns the right-tail p-value; flagging below 0.01 is the
/// caller's decision.
pub fn srm_p_value(n_treatment: u64, n_control: u64) -> f64 {
    let total = (n_treatment + n_control) as f64;
    if total == 0.0 {
        return 1.0;
    }
    let expected = total / 2.0;
    let chi2 = (n_treatment as f64 - expected).powi(2) / expected
        + (n_control as f64 - expected).powi(2) / expected;

    let Ok(dist) = ChiSquared::new(1.0) else {
        return f64::NAN;
    };
    1.0 - dist.cdf(chi2)
}

/// CUPED: θ = Cov(x, y) / (Var(x) + ε) over the pooled sample, adjusted
/// outcome y' = y − θ·x. A zero-variance covariate degrades gracefully to
/// θ ≈ Cov/ε instead of dividing by zero; with x constant Cov is 0 and the
/// adjustment is a no-op.
pub fn cuped_adjust(y: &[f64], x: &[f64]) -> Vec<f64> {
    debug_assert_eq!(y.len(), x.len());
    let theta = sample_cov(x, y) / (sample_var(x) + EPSILON);
    y.iter().zip(x).map(|(yi, xi)| yi - theta * xi).collect()
}

/// Welch's unequal-variance two-sample t-test.
///
/// Two-sided p-value from a Student's t with the Welch–Satterthwaite df;
/// the 95% CI uses the normal approximation (± 1.96·SE) per the reporting
/// convention. Sample variances use Bessel's correction.
pub fn welch_t_test(treatment: &[f64], control: &[f64]) -> Result<TestSummary> {
    let n_t = treatment.len();
    let n_c = control.len();
    if n_t < 2 || n_c < 2 {
        return Err(anyhow!(INSUFFICIENT_DATA_MARKER));
    }

    let mean_t = mean(treatment);
    let mean_c = mean(control);
    let var_t = sample_var(treatment);
    let var_c = sample_var(control);

    let se_t2 = var_t / n_t as f64;
    let se_c2 = var_c / n_c as f64;
    let se = (se_t2 + se_c2).sqrt();

    let diff = mean_t - mean_c;
    let t_stat = diff / (se + EPSILON);

    let df_denom = se_t2.powi(2) / (n_t as f64 - 1.0) + se_c2.powi(2) / (n_c as f64 - 1.0);
    let df = if df_denom > 0.0 {
        (se_t2 + se_c2).powi(2) / df_denom
    } else {
        (n_t + n_c) as f64 - 2.0
    };

    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat.abs())),
        Err(_) => f64::NAN,
    };

    Ok(TestSummary {
        mean_t,
        mean_c,
        diff,
        lift_pct: 100.0 * diff / (mean_c + EPSILON),
        t_stat,
        p_value,
        ci_95: (diff - 1.96 * se, diff + 1.96 * se),
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with Bessel's correction (n − 1).
fn sample_var(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Sample covariance with Bessel's correction.
fn sample_cov(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mx = mean(&x[..n]);
    let my = mean(&y[..n]);
    x[..n]
        .iter()
        .zip(&y[..n])
        .map(|(xi, yi)| (xi - mx) * (yi - my))
        .sum::<f64>()
        / (n as f64 - 1.0)
}

#[cfg(test)]
mod tests {
    use super::{cuped_adjust, sample_var, srm_p_value, welch_t_test};

    #[test]
    fn balanced_split_passes_srm() {
        let p = srm_p_value(500, 500);
        assert!(p > 0.9, "p = {p}");
    }

    #[test]
    fn skewed_split_fails_srm() {
        let p = srm_p_value(900, 100);
        assert!(p < 0.001, "p = {p}");
    }

    #[test]
    fn empty_assignment_reports_no_mismatch() {
        assert!((srm_p_value(0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cuped_with_identical_covariate_zeroes_the_outcome() {
        let y: Vec<f64> = (0..100).map(|i| i as f64 * 0.5 + 3.0).collect();
        let adjusted = cuped_adjust(&y, &y);
        // θ ≈ 1, so every adjusted value collapses to ≈ 0.
        assert!(adjusted.iter().all(|v| v.abs() < 1e-6), "{adjusted:?}");
    }

    #[test]
    fn cuped_with_constant_covariate_is_a_noop() {
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0; 4];
        let adjusted = cuped_adjust(&y, &x);
        for (a, b) in adjusted.iter().zip(&y) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn welch_detects_a_clear_separation() {
        let treatment: Vec<f64> = (0..200).map(|i| 11.0 + (i % 5) as f64 * 0.1).collect();
        let control: Vec<f64> = (0..200).map(|i| 10.0 + (i % 5) as f64 * 0.1).collect();
        let summary = match welch_t_test(&treatment, &control) {
            Ok(s) => s,
            Err(e) => panic!("welch failed: {e}"),
        };
        assert!((summary.diff - 1.0).abs() < 1e-9);
        assert!(summary.p_value < 1e-6);
        assert!(summary.ci_95.0 < summary.diff && summary.diff < summary.ci_95.1);
        assert!((summary.lift_pct - 100.0 * summary.diff / summary.mean_c).abs() < 1e-3);
    }

    #[test]
    fn welch_near_identical_samples_is_not_significant() {
        let a: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        let b = a.clone();
        let summary = match welch_t_test(&a, &b) {
            Ok(s) => s,
            Err(e) => panic!("welch failed: {e}"),
        };
        assert!(summary.t_stat.abs() < 1e-6);
        assert!(summary.p_value > 0.99);
    }

    #[test]
    fn welch_requires_two_per_arm() {
        assert!(welch_t_test(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn variance_uses_bessel_correction() {
        // Var of {1, 2, 3} with n-1 is 1.0.
        assert!((sample_var(&[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-12);
    }
}
