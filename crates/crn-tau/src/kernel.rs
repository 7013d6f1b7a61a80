use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crn_core::{CrnError, ErrorInfo, Propensity, ReactionNetwork, RngHandle};

use crate::analysis;
use crate::config::RunConfig;
use crate::determinism;
use crate::firing::{self, ReactionFirings};
use crate::selection;

/// Cooperative cancellation handle polled between leaps.
///
/// Cloning shares the flag, so one token can be handed to a signal handler
/// or controller thread while the run loop polls it. Cancellation is not
/// preemptive: the current leap finishes and the run returns a partial
/// trajectory marked as interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests termination at the next poll point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether termination has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Populations recorded at every save point of one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Save-point times, starting at 0.
    pub times: Vec<f64>,
    /// State vector recorded at each save point, indexed by species id.
    pub states: Vec<Vec<u64>>,
}

/// Summary returned to callers after an ensemble run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// One entry per simulated trajectory, in trajectory order.
    pub trajectories: Vec<Trajectory>,
    /// True when the run stopped early at the cancellation token; the last
    /// trajectory is then truncated to the save points it reached.
    pub interrupted: bool,
}

/// Runs an ensemble of tau-leaping trajectories.
///
/// Each trajectory owns a fresh network summary, a derived RNG substream,
/// and its own state vector; no mutable state is shared between them. Within
/// a trajectory the loop alternates propensity evaluation, tau selection,
/// Poisson firing, and the state update
/// `state[s] += sum_r count[r] * delta[r][s]`, recording populations at
/// evenly spaced save points. A draw that would push any population negative
/// is rejected and redrawn with a halved step; halving shrinks every Poisson
/// mean toward zero, so an acceptable draw is always reached.
pub fn run(
    config: &RunConfig,
    network: &ReactionNetwork,
    propensity: &dyn Propensity,
    cancel: &CancelToken,
) -> Result<RunSummary, CrnError> {
    config.validate()?;
    let timeline = save_points(config.end_time, config.number_timesteps);

    let mut trajectories = Vec::with_capacity(config.number_trajectories);
    let mut interrupted = false;

    for trajectory_index in 0..config.number_trajectories {
        let mut summary = analysis::initialize(network, config.tau_tol)?;
        let mut rng = RngHandle::from_seed(determinism::trajectory_seed(
            config.seed_policy.master_seed,
            trajectory_index,
        ));
        let mut state = network.initial_state();
        let mut current_time = 0.0_f64;
        let mut trajectory = Trajectory {
            times: vec![0.0],
            states: vec![state.clone()],
        };

        'timeline: for &save_time in &timeline[1..] {
            while current_time < save_time {
                if cancel.is_cancelled() {
                    interrupted = true;
                    break 'timeline;
                }
                let propensities = evaluate_propensities(network, propensity, &state, current_time)?;
                let tau = selection::select(
                    network,
                    &mut summary,
                    config.tau_tol,
                    current_time,
                    save_time,
                    &propensities,
                    &state,
                );
                let firings = leap(network, &propensities, tau, current_time, save_time, &mut state, &mut rng);
                current_time = firings.time;
            }
            trajectory.times.push(save_time);
            trajectory.states.push(state.clone());
        }

        trajectories.push(trajectory);
        if interrupted {
            break;
        }
    }

    Ok(RunSummary {
        trajectories,
        interrupted,
    })
}

/// Draws firings for the selected step, rejecting draws that would drive a
/// population negative by halving the step, then applies the accepted draw.
fn leap(
    network: &ReactionNetwork,
    propensities: &[f64],
    mut tau: f64,
    current_time: f64,
    save_time: f64,
    state: &mut [u64],
    rng: &mut RngHandle,
) -> ReactionFirings {
    loop {
        let firings = firing::get_reactions(network, propensities, tau, current_time, save_time, rng);
        let net = net_population_change(network, &firings.counts);
        let valid = state
            .iter()
            .zip(&net)
            .all(|(&pop, &change)| pop as i128 + change >= 0);
        if valid {
            for (pop, change) in state.iter_mut().zip(&net) {
                *pop = (*pop as i128 + change) as u64;
            }
            return firings;
        }
        tau /= 2.0;
    }
}

/// Net per-species population change implied by a set of firing counts.
fn net_population_change(network: &ReactionNetwork, counts: &[u64]) -> Vec<i128> {
    let mut net = vec![0i128; network.num_species()];
    for (r, reaction) in network.reactions().iter().enumerate() {
        if counts[r] == 0 {
            continue;
        }
        for (s, &delta) in reaction.deltas.iter().enumerate() {
            net[s] += counts[r] as i128 * delta as i128;
        }
    }
    net
}

fn evaluate_propensities(
    network: &ReactionNetwork,
    propensity: &dyn Propensity,
    state: &[u64],
    current_time: f64,
) -> Result<Vec<f64>, CrnError> {
    let mut values = Vec::with_capacity(network.num_reactions());
    for (r, reaction) in network.reactions().iter().enumerate() {
        let value = propensity.evaluate(r, state);
        if !value.is_finite() || value < 0.0 {
            return Err(CrnError::Simulation(
                ErrorInfo::new(
                    "propensity-invalid",
                    "propensity must be finite and non-negative",
                )
                .with_context("reaction", reaction.name.clone())
                .with_context("value", value.to_string())
                .with_context("time", current_time.to_string()),
            ));
        }
        values.push(value);
    }
    Ok(values)
}

/// Evenly spaced save points over `[0, end_time]`, first point 0, last point
/// exactly `end_time`.
fn save_points(end_time: f64, number_timesteps: usize) -> Vec<f64> {
    let increment = end_time / (number_timesteps - 1) as f64;
    let mut points: Vec<f64> = (0..number_timesteps)
        .map(|index| index as f64 * increment)
        .collect();
    points[number_timesteps - 1] = end_time;
    points
}
