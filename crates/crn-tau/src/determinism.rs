use crn_core::derive_substream_seed;

/// Derives the deterministic seed owned by a specific trajectory.
///
/// Trajectories never share a generator, so an ensemble is reproducible
/// regardless of how its members are scheduled.
pub fn trajectory_seed(master_seed: u64, trajectory_index: usize) -> u64 {
    derive_substream_seed(master_seed, trajectory_index as u64)
}
