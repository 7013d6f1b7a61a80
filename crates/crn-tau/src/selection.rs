use crn_core::ReactionNetwork;

use crate::analysis::{GiRule, NetworkSummary};

/// Hard floor applied to any positive leap so steps never collapse to zero.
pub const MIN_TAU: f64 = 1e-10;

/// Selects the largest leap interval that keeps the expected relative change
/// of every reactant population within tolerance (Cao-Gillespie-Petzold).
///
/// `propensities` and `state` must be sized to the network's reaction and
/// species counts, and `summary` must come from [`crate::analysis::initialize`]
/// for the same network. The summary is mutated once per species at most:
/// deferred g_i rules are resolved on first use and frozen afterwards.
///
/// The returned tau is never negative, at least [`MIN_TAU`] when positive,
/// and never advances past `save_time`.
pub fn select(
    network: &ReactionNetwork,
    summary: &mut NetworkSummary,
    tau_tol: f64,
    current_time: f64,
    save_time: f64,
    propensities: &[f64],
    state: &[u64],
) -> f64 {
    let num_species = network.num_species();
    let num_reactions = network.num_reactions();

    // First and second moments of the population change rate per reactant,
    // Cao, Gillespie, Petzold eq. 32a.
    let mut mu = vec![0.0; num_species];
    let mut sigma2 = vec![0.0; num_species];
    let mut reaction_critical = vec![false; num_reactions];
    let mut any_critical = false;

    for r in 0..num_reactions {
        for &s in &summary.reactant_indices[r] {
            let consumed = network.reactions()[r].deltas[s].unsigned_abs();
            let firings_to_exhaustion = state[s] as f64 / consumed as f64;
            if firings_to_exhaustion < summary.critical_threshold as f64 && propensities[r] > 0.0 {
                reaction_critical[r] = true;
                any_critical = true;
            }
            mu[s] += consumed as f64 * propensities[r];
            sigma2[s] += (consumed as f64).powi(2) * propensities[r];
        }
    }

    // Expected time to the next single firing among critical channels.
    // Scanning in id order with a strict comparison keeps the lowest id on ties.
    let mut critical_tau = None;
    if any_critical {
        for r in 0..num_reactions {
            if reaction_critical[r] && propensities[r] > 0.0 {
                let candidate = 1.0 / propensities[r];
                if critical_tau.map_or(true, |best| candidate < best) {
                    critical_tau = Some(candidate);
                }
            }
        }
    }

    resolve_deferred_rules(summary, tau_tol);

    // Moment-based bound per reactant, Cao, Gillespie, Petzold eq. 33.
    let mut non_critical_tau = None;
    for &s in &summary.reactant_species {
        if mu[s] <= 0.0 {
            continue;
        }
        let bound = (summary.epsilons[s] * state[s] as f64).max(1.0);
        let mean_limited = bound / mu[s];
        let candidate = if sigma2[s] > 0.0 {
            mean_limited.min(bound.powi(2) / sigma2[s])
        } else {
            mean_limited
        };
        if non_critical_tau.map_or(true, |best| candidate < best) {
            non_critical_tau = Some(candidate);
        }
    }

    let tau = match (non_critical_tau, critical_tau) {
        (Some(non_critical), None) => non_critical,
        (None, Some(critical)) => critical,
        (Some(non_critical), Some(critical)) => non_critical.min(critical),
        (None, None) => 0.0,
    };

    if tau > 0.0 {
        let mut tau = tau.max(MIN_TAU);
        if save_time - current_time > 0.0 {
            tau = tau.min(save_time - current_time);
        }
        tau
    } else {
        // No bound derivable (e.g. every relevant propensity is zero):
        // integrate straight to the save point.
        save_time - current_time
    }
}

/// Resolves every still-deferred g_i rule exactly once, using the stored g_i
/// as the formula argument, then freezes the result as a constant.
fn resolve_deferred_rules(summary: &mut NetworkSummary, tau_tol: f64) {
    for s in 0..summary.g_rules.len() {
        let rule = summary.g_rules[s];
        if !rule.is_deferred() {
            continue;
        }
        let resolved = rule.evaluate(summary.g_values[s]);
        summary.g_values[s] = resolved;
        summary.epsilons[s] = tau_tol / resolved;
        summary.g_rules[s] = GiRule::Constant(resolved);
    }
}
