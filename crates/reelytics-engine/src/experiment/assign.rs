//! Seeded variant assignment.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reelytics_core::experiment::{Assignment, Variant};

/// Draw one uniform value per user; Treatment when it falls below `p_treat`.
///
/// The input is sorted and deduplicated before drawing so the result depends
/// only on the seed and the user *set*, never on event ordering. Calling
/// twice with the same seed and users yields identical labels.
pub fn assign_variants(user_ids: &[u32], seed: u64, p_treat: f64) -> Vec<Assignment> {
    let mut ids = user_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut rng = StdRng::seed_from_u64(seed);
    ids.into_iter()
        .map(|user_id| Assignment {
            user_id,
            variant: if rng.gen::<f64>() < p_treat {
                Variant::Treatment
            } else {
                Variant::Control
            },
        })
        .collect()
}
