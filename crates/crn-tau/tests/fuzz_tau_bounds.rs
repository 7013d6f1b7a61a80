use crn_core::{Reaction, ReactionNetwork, RngHandle, Species};
use crn_tau::{get_reactions, initialize, select, MIN_TAU};
use proptest::prelude::*;

const TAU_TOL: f64 = 0.03;

fn arbitrary_network() -> impl Strategy<Value = (ReactionNetwork, Vec<u64>, Vec<f64>)> {
    (1usize..4, 1usize..4).prop_flat_map(|(num_species, num_reactions)| {
        (
            proptest::collection::vec(
                proptest::collection::vec(-3i64..=3, num_species),
                num_reactions,
            ),
            proptest::collection::vec(0u64..1000, num_species),
            proptest::collection::vec(0.0f64..50.0, num_reactions),
        )
            .prop_map(|(deltas, populations, propensities)| {
                let species = populations
                    .iter()
                    .enumerate()
                    .map(|(id, &pop)| Species {
                        id,
                        name: format!("S{id}"),
                        initial_population: pop,
                    })
                    .collect();
                let reactions = deltas
                    .into_iter()
                    .enumerate()
                    .map(|(r, d)| Reaction::new(format!("R{r}"), d))
                    .collect();
                let network = ReactionNetwork::new(species, reactions).unwrap();
                (network, populations, propensities)
            })
    })
}

proptest! {
    #[test]
    fn selected_tau_respects_bounds(
        (network, state, propensities) in arbitrary_network(),
        save_time in 0.1f64..100.0,
    ) {
        let mut summary = initialize(&network, TAU_TOL).unwrap();
        let tau = select(
            &network,
            &mut summary,
            TAU_TOL,
            0.0,
            save_time,
            &propensities,
            &state,
        );

        prop_assert!(tau > 0.0);
        prop_assert!(tau >= MIN_TAU);
        prop_assert!(tau <= save_time);
    }

    #[test]
    fn resolution_is_one_shot_under_arbitrary_states(
        (network, state, propensities) in arbitrary_network(),
        save_time in 0.1f64..100.0,
    ) {
        let mut summary = initialize(&network, TAU_TOL).unwrap();
        select(&network, &mut summary, TAU_TOL, 0.0, save_time, &propensities, &state);
        let resolved = summary.clone();
        select(&network, &mut summary, TAU_TOL, 0.0, save_time, &propensities, &state);

        // A second pass may not re-resolve any rule.
        prop_assert_eq!(resolved.g_rules, summary.g_rules);
        prop_assert_eq!(resolved.g_values, summary.g_values);
        prop_assert_eq!(resolved.epsilons, summary.epsilons);
    }

    #[test]
    fn silent_channels_never_fire(
        (network, _state, _propensities) in arbitrary_network(),
        seed in any::<u64>(),
        tau_step in 0.0f64..10.0,
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let silent = vec![0.0; network.num_reactions()];
        let firings = get_reactions(&network, &silent, tau_step, 0.0, 100.0, &mut rng);
        prop_assert!(firings.counts.iter().all(|&count| count == 0));
    }
}
