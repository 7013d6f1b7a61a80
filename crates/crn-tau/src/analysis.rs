use serde::{Deserialize, Serialize};

use crn_core::{CrnError, ErrorInfo, ReactionNetwork};

/// Population threshold below which a consuming reaction counts as critical.
pub const DEFAULT_CRITICAL_THRESHOLD: u64 = 10;

/// Per-species rule for the Cao-Gillespie-Petzold correction factor g_i.
///
/// Higher-order channels with repeated reactants need a population-dependent
/// correction. Those rules start out deferred and are resolved by the tau
/// selector on first use, with the stored g_i as the argument `x`; after
/// resolution the rule collapses to `Constant`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GiRule {
    /// Resolved (or never deferred) correction value.
    Constant(f64),
    /// Two copies consumed in a second-order channel: `2 + 1/(x-1)`.
    SecondOrderPair,
    /// Two copies consumed in a third-order channel: `1.5 * (2 + 1/(x-1))`.
    ThirdOrderPair,
    /// Three copies consumed: `3 + 1/(x-1) + 2/(x-2)`.
    TripleConsumption,
}

impl GiRule {
    /// Evaluates a deferred formula at `x`; `Constant` returns its value.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            GiRule::Constant(value) => *value,
            GiRule::SecondOrderPair => 2.0 + 1.0 / (x - 1.0),
            GiRule::ThirdOrderPair => 1.5 * (2.0 + 1.0 / (x - 1.0)),
            GiRule::TripleConsumption => 3.0 + 1.0 / (x - 1.0) + 2.0 / (x - 2.0),
        }
    }

    /// Whether the rule still awaits its one-shot resolution.
    pub fn is_deferred(&self) -> bool {
        !matches!(self, GiRule::Constant(_))
    }
}

/// Derived per-species and per-reaction statistics built once per trajectory.
///
/// All maps of the reference formulation are dense arrays indexed by species
/// or reaction id; iteration order therefore carries no hidden semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    /// Highest order among reactions consuming each species.
    pub highest_order: Vec<u32>,
    /// Correction factor g_i per species; meaningful for reactants only.
    pub g_values: Vec<f64>,
    /// Error-control rule per species, deferred until first tau selection.
    pub g_rules: Vec<GiRule>,
    /// Local relative tolerance per species, `tau_tol / g_i` once resolved.
    pub epsilons: Vec<f64>,
    /// Sorted ids of every species consumed by at least one reaction.
    pub reactant_species: Vec<usize>,
    /// Per reaction, the ids of species it consumes.
    pub reactant_indices: Vec<Vec<usize>>,
    /// Per reaction, the ids of species it produces.
    pub product_indices: Vec<Vec<usize>>,
    /// Population threshold for the critical-reaction test.
    pub critical_threshold: u64,
}

/// Scans the network stoichiometry once and derives the error-control data
/// the tau selector needs.
///
/// Deterministic and free of hidden state: calling it twice on the same
/// network yields identical summaries. The only failure mode is an invalid
/// tolerance, rejected up front.
pub fn initialize(network: &ReactionNetwork, tau_tol: f64) -> Result<NetworkSummary, CrnError> {
    if !(tau_tol > 0.0) || !tau_tol.is_finite() {
        return Err(CrnError::Config(
            ErrorInfo::new("tau-tol-invalid", "tau tolerance must be positive and finite")
                .with_context("tau_tol", tau_tol.to_string()),
        ));
    }

    let num_species = network.num_species();
    let mut summary = NetworkSummary {
        highest_order: vec![0; num_species],
        g_values: vec![0.0; num_species],
        g_rules: vec![GiRule::Constant(0.0); num_species],
        epsilons: vec![0.0; num_species],
        reactant_species: Vec::new(),
        reactant_indices: vec![Vec::new(); network.num_reactions()],
        product_indices: vec![Vec::new(); network.num_reactions()],
        critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
    };

    let mut is_reactant = vec![false; num_species];
    for (r, reaction) in network.reactions().iter().enumerate() {
        for (s, &delta) in reaction.deltas.iter().enumerate() {
            if delta > 0 {
                summary.product_indices[r].push(s);
            } else if delta < 0 {
                summary.reactant_indices[r].push(s);
                is_reactant[s] = true;
            }
        }

        let order = summary.reactant_indices[r].len() as u32;
        for &s in &summary.reactant_indices[r] {
            if order <= summary.highest_order[s] {
                continue;
            }
            summary.highest_order[s] = order;
            summary.g_values[s] = f64::from(order);

            let magnitude = reaction.deltas[s].unsigned_abs();
            let rule = match (magnitude, order) {
                (2, 2) => GiRule::SecondOrderPair,
                (2, 3) => GiRule::ThirdOrderPair,
                (3, _) => GiRule::TripleConsumption,
                _ => GiRule::Constant(f64::from(order)),
            };
            summary.g_rules[s] = rule;
            if !rule.is_deferred() {
                summary.epsilons[s] = tau_tol / summary.g_values[s];
            }
        }
    }

    summary.reactant_species = is_reactant
        .iter()
        .enumerate()
        .filter_map(|(s, &consumed)| consumed.then_some(s))
        .collect();

    Ok(summary)
}
