use serde::{Deserialize, Serialize};

use crn_core::ReactionNetwork;

/// Default relative standard-deviation/mean criterion for dynamic switching.
pub const DEFAULT_SWITCH_TOL: f64 = 0.03;

/// User-selectable representation of a species in a hybrid solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeciesMode {
    /// Always integrate the population as a continuous quantity.
    Continuous,
    /// Always fire the population discretely.
    Discrete,
    /// Let the solver pick per step from the switching thresholds.
    #[default]
    Dynamic,
}

/// Runtime classification a hybrid solver assigns each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionMode {
    /// Currently integrated by the ODE stage.
    Continuous,
    /// Currently advanced by tau-leaping firings.
    Discrete,
}

/// Population of a species under either representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HybridPopulation {
    /// Integer population of a discretely fired species.
    Discrete(u64),
    /// Real-valued population of a continuously integrated species.
    Continuous(f64),
}

impl HybridPopulation {
    /// Population as a real number regardless of representation.
    pub fn as_f64(&self) -> f64 {
        match self {
            HybridPopulation::Discrete(pop) => *pop as f64,
            HybridPopulation::Continuous(pop) => *pop,
        }
    }
}

/// Per-species partition inputs and current classification.
///
/// This engine only stores the classification data; the switching policy
/// (comparing estimated sd/mean against `switch_tol`, or the population
/// against `switch_min`) belongs to the consuming hybrid solver, which
/// alternates ODE integration with the tau/firing primitives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSpecies {
    /// Representation requested by the user.
    pub mode: SpeciesMode,
    /// Classification currently in effect.
    pub partition: PartitionMode,
    /// Relative sd/mean threshold used when `switch_min` is unset.
    pub switch_tol: f64,
    /// Absolute population floor; overrides `switch_tol` when set.
    pub switch_min: Option<u64>,
}

impl HybridSpecies {
    /// Creates an entry for the given user mode with default thresholds.
    ///
    /// Non-dynamic modes fix the partition immediately; dynamic species
    /// start out discrete until the solver reclassifies them.
    pub fn with_mode(mode: SpeciesMode) -> Self {
        let partition = match mode {
            SpeciesMode::Continuous => PartitionMode::Continuous,
            SpeciesMode::Discrete | SpeciesMode::Dynamic => PartitionMode::Discrete,
        };
        Self {
            mode,
            partition,
            switch_tol: DEFAULT_SWITCH_TOL,
            switch_min: None,
        }
    }
}

impl Default for HybridSpecies {
    fn default() -> Self {
        Self::with_mode(SpeciesMode::Dynamic)
    }
}

/// Partition table covering every species of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridPartition {
    /// Partition entry per species, indexed by species id.
    pub species: Vec<HybridSpecies>,
}

impl HybridPartition {
    /// Builds a table with every species in dynamic mode.
    pub fn for_network(network: &ReactionNetwork) -> Self {
        Self {
            species: vec![HybridSpecies::default(); network.num_species()],
        }
    }
}
