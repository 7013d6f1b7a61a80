#![deny(missing_docs)]
#![doc = "Core model types, structured errors, and deterministic randomness for the CRN tau-leaping engine."]

pub mod errors;
mod model;
pub mod rng;

pub use errors::{CrnError, ErrorInfo};
pub use model::{Propensity, Reaction, ReactionNetwork, Species};
pub use rng::{derive_substream_seed, RngHandle};
