//! Synthetic treatment-effect simulation.
//!
//! Emulates a feature launch for pipeline testing: treatment outcomes get a
//! multiplicative lift, both arms get seeded Gaussian noise. This is not a
//! measurement.

use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use reelytics_core::experiment::{Assignment, Variant};

#[derive(Debug, Clone, Copy)]
pub struct SimulatedOutcome {
    pub user_id: u32,
    pub variant: Variant,
    pub outcome: f64,
}

/// Apply the synthetic lift and noise to each user's base metric.
///
/// Treatment: `base * (1 + lift) + N(0, noise_sd)`; Control:
/// `base + N(0, noise_sd)`. Users missing from the assignment default to
/// Control. Iteration follows the metric map's key order, so a fixed seed
/// reproduces the exact noise sequence.
pub fn simulate_outcomes(
    base_metric: &BTreeMap<u32, f64>,
    assignments: &[Assignment],
    lift: f64,
    noise_sd: f64,
    seed: u64,
) -> Result<Vec<SimulatedOutcome>> {
    let variant_of: HashMap<u32, Variant> = assignments
        .iter()
        .map(|a| (a.user_id, a.variant))
        .collect();

    let normal = Normal::new(0.0, noise_sd).map_err(|e| anyhow!("invalid noise_sd: {e}"))?;
    let mut rng = StdRng::seed_from_u64(seed);

    Ok(base_metric
        .iter()
        .map(|(&user_id, &base)| {
            let variant = variant_of
                .get(&user_id)
                .copied()
                .unwrap_or(Variant::Control);
            let noise = normal.sample(&mut rng);
            let outcome = match variant {
                Variant::Treatment => base * (1.0 + lift) + noise,
                Variant::Control => base + noise,
            };
            SimulatedOutcome {
                user_id,
                variant,
                outcome,
            }
        })
        .collect())
}
