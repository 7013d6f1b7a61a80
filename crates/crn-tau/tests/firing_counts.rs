use crn_core::{Reaction, ReactionNetwork, RngHandle, Species};
use crn_tau::get_reactions;

fn sample_network() -> ReactionNetwork {
    ReactionNetwork::new(
        vec![
            Species {
                id: 0,
                name: "A".to_string(),
                initial_population: 500,
            },
            Species {
                id: 1,
                name: "B".to_string(),
                initial_population: 0,
            },
        ],
        vec![
            Reaction::new("convert", vec![-1, 1]),
            Reaction::new("decay", vec![-1, 0]),
        ],
    )
    .unwrap()
}

#[test]
fn zero_step_fires_nothing() {
    let network = sample_network();
    let mut rng = RngHandle::from_seed(11);

    let firings = get_reactions(&network, &[4.0, 2.0], 0.0, 3.0, 10.0, &mut rng);
    assert_eq!(firings.counts, vec![0, 0]);
    assert_eq!(firings.time, 3.0);
}

#[test]
fn zero_propensity_channels_never_fire() {
    let network = sample_network();
    let mut rng = RngHandle::from_seed(12);

    let firings = get_reactions(&network, &[0.0, 7.5], 1.0, 0.0, 10.0, &mut rng);
    assert_eq!(firings.counts[0], 0);
}

#[test]
fn overshooting_steps_clip_to_save_time() {
    let network = sample_network();
    let mut rng = RngHandle::from_seed(13);

    let firings = get_reactions(&network, &[4.0, 2.0], 5.0, 9.5, 10.0, &mut rng);
    assert_eq!(firings.time, 10.0);
}

#[test]
fn fixed_seed_reproduces_draws() {
    let network = sample_network();
    let mut rng_a = RngHandle::from_seed(2024);
    let mut rng_b = RngHandle::from_seed(2024);

    for _ in 0..32 {
        let a = get_reactions(&network, &[4.0, 2.0], 0.25, 0.0, 10.0, &mut rng_a);
        let b = get_reactions(&network, &[4.0, 2.0], 0.25, 0.0, 10.0, &mut rng_b);
        assert_eq!(a, b);
    }
}

#[test]
fn sample_mean_converges_to_poisson_mean() {
    // propensity 4 over a 0.5 leap gives mean 2; the sample mean over many
    // draws should land well within 5 sigma of it.
    let network = sample_network();
    let mut rng = RngHandle::from_seed(7);
    let draws = 20_000usize;

    let mut total = 0u64;
    for _ in 0..draws {
        let firings = get_reactions(&network, &[4.0, 0.0], 0.5, 0.0, 10.0, &mut rng);
        total += firings.counts[0];
    }
    let sample_mean = total as f64 / draws as f64;
    assert!(
        (sample_mean - 2.0).abs() < 0.05,
        "sample mean {sample_mean} strayed from 2.0"
    );
}

#[test]
fn clipped_step_drives_every_mean() {
    // With the step clipped to zero remaining time, every channel's Poisson
    // mean collapses and no reaction may fire.
    let network = sample_network();
    let mut rng = RngHandle::from_seed(99);

    let firings = get_reactions(&network, &[50.0, 50.0], 3.0, 10.0, 10.0, &mut rng);
    assert_eq!(firings.counts, vec![0, 0]);
    assert_eq!(firings.time, 10.0);
}
