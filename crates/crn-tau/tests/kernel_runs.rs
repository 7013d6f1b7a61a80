use crn_core::{CrnError, Reaction, ReactionNetwork, Species};
use crn_tau::{run, summarize, CancelToken, RunConfig};

fn isomerization_network() -> ReactionNetwork {
    ReactionNetwork::new(
        vec![
            Species {
                id: 0,
                name: "A".to_string(),
                initial_population: 1000,
            },
            Species {
                id: 1,
                name: "B".to_string(),
                initial_population: 0,
            },
        ],
        vec![
            Reaction::new("fold", vec![-1, 1]),
            Reaction::new("unfold", vec![1, -1]),
        ],
    )
    .unwrap()
}

fn isomerization_rates(reaction: usize, state: &[u64]) -> f64 {
    match reaction {
        0 => 2.0 * state[0] as f64,
        _ => 1.0 * state[1] as f64,
    }
}

fn sample_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.number_trajectories = 2;
    config.number_timesteps = 11;
    config.end_time = 2.0;
    config.seed_policy.master_seed = 77;
    config
}

#[test]
fn save_rows_cover_the_timeline() {
    let network = isomerization_network();
    let summary = run(
        &sample_config(),
        &network,
        &isomerization_rates,
        &CancelToken::new(),
    )
    .unwrap();

    assert!(!summary.interrupted);
    for trajectory in &summary.trajectories {
        assert_eq!(trajectory.times.len(), 11);
        assert_eq!(trajectory.states.len(), 11);
        assert_eq!(trajectory.times[0], 0.0);
        assert_eq!(trajectory.times[10], 2.0);
        assert_eq!(trajectory.states[0], vec![1000, 0]);
    }
}

#[test]
fn conversion_conserves_total_population() {
    let network = isomerization_network();
    let summary = run(
        &sample_config(),
        &network,
        &isomerization_rates,
        &CancelToken::new(),
    )
    .unwrap();

    for trajectory in &summary.trajectories {
        for state in &trajectory.states {
            assert_eq!(state[0] + state[1], 1000);
        }
    }
}

#[test]
fn aggressive_tolerance_never_underflows_populations() {
    // A loose tolerance provokes large leaps; the rejection loop must keep
    // every recorded population valid regardless.
    let network = isomerization_network();
    let mut config = sample_config();
    config.tau_tol = 0.5;

    let summary = run(&config, &network, &isomerization_rates, &CancelToken::new()).unwrap();
    for trajectory in &summary.trajectories {
        for state in &trajectory.states {
            assert_eq!(state[0] + state[1], 1000);
        }
    }
}

#[test]
fn cancelled_token_stops_with_partial_trajectory() {
    let network = isomerization_network();
    let token = CancelToken::new();
    token.cancel();

    let summary = run(&sample_config(), &network, &isomerization_rates, &token).unwrap();
    assert!(summary.interrupted);
    assert_eq!(summary.trajectories.len(), 1);
    assert_eq!(summary.trajectories[0].times, vec![0.0]);
}

#[test]
fn invalid_propensities_abort_the_run() {
    let network = isomerization_network();
    let poisoned = |reaction: usize, _state: &[u64]| if reaction == 0 { f64::NAN } else { 1.0 };

    let err = run(&sample_config(), &network, &poisoned, &CancelToken::new()).unwrap_err();
    match err {
        CrnError::Simulation(info) => {
            assert_eq!(info.code, "propensity-invalid");
            assert_eq!(info.context.get("reaction").map(String::as_str), Some("fold"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ensemble_statistics_match_conservation() {
    let network = isomerization_network();
    let summary = run(
        &sample_config(),
        &network,
        &isomerization_rates,
        &CancelToken::new(),
    )
    .unwrap();

    let stats = summarize(&summary);
    assert_eq!(stats.times.len(), 11);
    for point in 0..stats.times.len() {
        let total_mean: f64 = stats.mean[point].iter().sum();
        assert!((total_mean - 1000.0).abs() < 1e-9);
        for &variance in &stats.variance[point] {
            assert!(variance >= 0.0);
        }
    }
}
