use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crn_core::{ReactionNetwork, RngHandle};

/// Firing counts for one leap together with the advanced simulation clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionFirings {
    /// Number of firings per reaction channel, indexed by reaction id.
    pub counts: Vec<u64>,
    /// Simulation time after the (possibly clipped) step.
    pub time: f64,
}

/// Draws how often each reaction fires within the chosen leap.
///
/// Each channel is sampled independently from a Poisson distribution with
/// mean `propensity[r] * tau_step`; that independence is the defining
/// approximation of tau-leaping. A step overshooting `save_time` is clipped
/// first, so every mean uses the clipped interval. Channels with zero
/// propensity (or a degenerate mean) fire zero times.
///
/// All randomness comes from the caller's handle, so a fixed seed and fixed
/// inputs reproduce the draw exactly.
pub fn get_reactions(
    network: &ReactionNetwork,
    propensities: &[f64],
    tau_step: f64,
    current_time: f64,
    save_time: f64,
    rng: &mut RngHandle,
) -> ReactionFirings {
    let mut tau_step = tau_step;
    if current_time + tau_step > save_time {
        tau_step = save_time - current_time;
    }

    let mut counts = vec![0u64; network.num_reactions()];
    for (r, count) in counts.iter_mut().enumerate() {
        let mean = propensities[r] * tau_step;
        if mean > 0.0 && mean.is_finite() {
            if let Ok(poisson) = Poisson::new(mean) {
                *count = poisson.sample(rng) as u64;
            }
        }
    }

    ReactionFirings {
        counts,
        time: current_time + tau_step,
    }
}
