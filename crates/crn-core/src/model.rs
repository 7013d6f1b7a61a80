use serde::{Deserialize, Serialize};

use crate::errors::{CrnError, ErrorInfo};

/// A chemical species tracked by the simulation.
///
/// Species ids are dense: the species with id `i` occupies index `i` of every
/// state vector, delta vector, and derived per-species array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    /// Dense index of the species within the network.
    pub id: usize,
    /// Unique display name.
    pub name: String,
    /// Population at trajectory start.
    pub initial_population: u64,
}

/// A reaction channel described by its per-species stoichiometric deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Unique display name of the channel.
    pub name: String,
    /// Signed population change per firing, indexed by species id.
    /// Negative entries mark consumed species, positive entries products.
    pub deltas: Vec<i64>,
}

impl Reaction {
    /// Creates a reaction from a name and delta vector.
    pub fn new(name: impl Into<String>, deltas: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            deltas,
        }
    }

    /// Number of distinct species consumed by the reaction.
    ///
    /// Order counts distinct reactants, not stoichiometric magnitude: a
    /// channel consuming two copies of one species has order 1.
    pub fn order(&self) -> u32 {
        self.deltas.iter().filter(|&&delta| delta < 0).count() as u32
    }
}

/// A validated reaction network: the static topology every trajectory shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionNetwork {
    species: Vec<Species>,
    reactions: Vec<Reaction>,
}

impl ReactionNetwork {
    /// Builds a network after checking structural consistency.
    ///
    /// Fails fast when a delta vector's length differs from the species
    /// count, a species id does not match its position, or names collide.
    pub fn new(species: Vec<Species>, reactions: Vec<Reaction>) -> Result<Self, CrnError> {
        for (index, entry) in species.iter().enumerate() {
            if entry.id != index {
                return Err(CrnError::Model(
                    ErrorInfo::new("species-id-sparse", "species ids must be dense array indices")
                        .with_context("species", entry.name.clone())
                        .with_context("id", entry.id.to_string())
                        .with_context("expected", index.to_string()),
                ));
            }
            if species[..index].iter().any(|other| other.name == entry.name) {
                return Err(CrnError::Model(
                    ErrorInfo::new("species-name-duplicate", "species names must be unique")
                        .with_context("species", entry.name.clone()),
                ));
            }
        }
        for reaction in &reactions {
            if reaction.deltas.len() != species.len() {
                return Err(CrnError::Model(
                    ErrorInfo::new(
                        "delta-length-mismatch",
                        "reaction delta vector length must equal the species count",
                    )
                    .with_context("reaction", reaction.name.clone())
                    .with_context("deltas", reaction.deltas.len().to_string())
                    .with_context("species", species.len().to_string()),
                ));
            }
        }
        Ok(Self { species, reactions })
    }

    /// Number of species in the network.
    pub fn num_species(&self) -> usize {
        self.species.len()
    }

    /// Number of reaction channels in the network.
    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// Immutable view over the species table.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Immutable view over the reaction table.
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Fresh state vector populated with the initial populations.
    pub fn initial_state(&self) -> Vec<u64> {
        self.species
            .iter()
            .map(|entry| entry.initial_population)
            .collect()
    }
}

/// Rate-law seam: evaluates the instantaneous propensity of one channel.
///
/// Propensity math (mass action, Michaelis-Menten, custom expressions) lives
/// outside this engine. Implementations must return a finite, non-negative
/// value for every reachable state; the trajectory kernel rejects anything
/// else with a simulation error.
pub trait Propensity {
    /// Returns the propensity of `reaction` given the current populations.
    fn evaluate(&self, reaction: usize, state: &[u64]) -> f64;
}

impl<F> Propensity for F
where
    F: Fn(usize, &[u64]) -> f64,
{
    fn evaluate(&self, reaction: usize, state: &[u64]) -> f64 {
        self(reaction, state)
    }
}
