use serde::{Deserialize, Serialize};

use crate::kernel::RunSummary;

/// Per-save-point population statistics across an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleStats {
    /// Save-point times covered by every trajectory in the summary.
    pub times: Vec<f64>,
    /// Mean population per save point and species.
    pub mean: Vec<Vec<f64>>,
    /// Population variance per save point and species.
    pub variance: Vec<Vec<f64>>,
}

/// Aggregates an ensemble into per-save-point means and variances.
///
/// An interrupted run can leave the last trajectory shorter than the rest;
/// statistics cover the save points every trajectory reached.
pub fn summarize(summary: &RunSummary) -> EnsembleStats {
    let common_len = summary
        .trajectories
        .iter()
        .map(|trajectory| trajectory.times.len())
        .min()
        .unwrap_or(0);
    if common_len == 0 {
        return EnsembleStats {
            times: Vec::new(),
            mean: Vec::new(),
            variance: Vec::new(),
        };
    }

    let num_species = summary.trajectories[0].states[0].len();
    let count = summary.trajectories.len() as f64;
    let times = summary.trajectories[0].times[..common_len].to_vec();
    let mut mean = vec![vec![0.0; num_species]; common_len];
    let mut variance = vec![vec![0.0; num_species]; common_len];

    for trajectory in &summary.trajectories {
        for (point, state) in trajectory.states[..common_len].iter().enumerate() {
            for (s, &pop) in state.iter().enumerate() {
                mean[point][s] += pop as f64;
                variance[point][s] += (pop as f64) * (pop as f64);
            }
        }
    }
    for point in 0..common_len {
        for s in 0..num_species {
            mean[point][s] /= count;
            variance[point][s] = (variance[point][s] / count - mean[point][s] * mean[point][s]).max(0.0);
        }
    }

    EnsembleStats {
        times,
        mean,
        variance,
    }
}
