use serde::{Deserialize, Serialize};

use crn_core::{CrnError, ErrorInfo};

/// Parameters governing an ensemble of tau-leaping trajectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of independent trajectories to simulate.
    #[serde(default = "default_trajectories")]
    pub number_trajectories: usize,
    /// Number of evenly spaced save points over `[0, end_time]`,
    /// including the initial state.
    #[serde(default = "default_timesteps")]
    pub number_timesteps: usize,
    /// Simulated end time.
    #[serde(default = "default_end_time")]
    pub end_time: f64,
    /// Global relative-error tolerance for tau selection.
    #[serde(default = "default_tau_tol")]
    pub tau_tol: f64,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_trajectories() -> usize {
    1
}

fn default_timesteps() -> usize {
    101
}

fn default_end_time() -> f64 {
    20.0
}

fn default_tau_tol() -> f64 {
    0.03
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            number_trajectories: default_trajectories(),
            number_timesteps: default_timesteps(),
            end_time: default_end_time(),
            tau_tol: default_tau_tol(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

impl RunConfig {
    /// Rejects configurations that would propagate NaN or degenerate steps
    /// into a run.
    pub fn validate(&self) -> Result<(), CrnError> {
        if self.number_trajectories == 0 {
            return Err(CrnError::Config(ErrorInfo::new(
                "trajectories-zero",
                "at least one trajectory is required",
            )));
        }
        if self.number_timesteps < 2 {
            return Err(CrnError::Config(
                ErrorInfo::new(
                    "timesteps-degenerate",
                    "at least two save points are required",
                )
                .with_context("number_timesteps", self.number_timesteps.to_string()),
            ));
        }
        if !(self.end_time > 0.0) || !self.end_time.is_finite() {
            return Err(CrnError::Config(
                ErrorInfo::new("end-time-invalid", "end time must be positive and finite")
                    .with_context("end_time", self.end_time.to_string()),
            ));
        }
        if !(self.tau_tol > 0.0) || !self.tau_tol.is_finite() {
            return Err(CrnError::Config(
                ErrorInfo::new("tau-tol-invalid", "tau tolerance must be positive and finite")
                    .with_context("tau_tol", self.tau_tol.to_string()),
            ));
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label used when deriving substream seeds.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}
