//! End-to-end runs of the evolutionary loop

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use strider_creature::{ConnectionList, Creature, CreatureConfig, Node, NodeId, SimulationConfig};
use strider_evolution::{Evolution, EvolutionConfig, EvolutionError, Generation};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default population settings with a short simulation
fn quick_config() -> EvolutionConfig {
    EvolutionConfig {
        ticks: 2,
        simulation: SimulationConfig {
            resolution: 150,
            ..SimulationConfig::default()
        },
        creature: CreatureConfig {
            // make structural mutations frequent enough to be exercised
            structural_mutation_probability: 0.5,
            ..CreatureConfig::default()
        },
        ..EvolutionConfig::default()
    }
}

fn lone(x: f64) -> Creature {
    let node = Node::new(NodeId::from_raw(0), 0.5, [x, 1.0].into()).unwrap();
    Creature::from_parts(vec![node], Vec::new(), ConnectionList::new()).unwrap()
}

#[test]
fn test_genesis_and_ten_successions() {
    init_logging();
    let config = quick_config();
    let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

    let mut generation = Generation::genesis(&config, &mut rng).expect("genesis");
    assert_eq!(generation.len(), 20);

    for i in 1..=10 {
        generation = match Generation::succession(&generation, &config, &mut rng) {
            Ok(next) => next,
            Err(EvolutionError::Creature(e)) => panic!("generation {i} broke a creature: {e}"),
            Err(e) => panic!("generation {i} failed: {e}"),
        };
        assert_eq!(generation.len(), 20);
        assert_eq!(generation.index(), i);

        for creature in generation.creatures() {
            creature.validate().expect("consistent creature");
            assert!(creature.nodes().len() >= 2);
            for muscle in creature.muscles() {
                let [a, b] = creature.connections().nodes_of(muscle.id()).expect("two endpoints");
                assert_ne!(a, b);
            }
        }

        let ranked = generation.creatures().windows(2).all(|w| w[0].fitness_cmp(&w[1]).is_le());
        assert!(ranked, "unranked generation {}", generation.index());
    }
}

#[test]
fn test_ranking_by_mean_x() {
    let generation = Generation::from_creatures(vec![lone(1.0), lone(5.0), lone(3.0)], 0);
    let xs: Vec<f64> = generation.creatures().iter().map(Creature::position_x).collect();
    assert_eq!(xs, vec![1.0, 3.0, 5.0]);
    assert_eq!(generation.best().map(Creature::position_x), Some(5.0));
}

#[test]
fn test_default_config_evaluates_to_finite_fitness() {
    init_logging();
    let config = EvolutionConfig::default();
    assert_eq!(config.simulation.resolution, 15000);
    let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

    let generation = Generation::genesis(&config, &mut rng).expect("genesis");
    let xs: Vec<f64> = generation.creatures().iter().map(Creature::position_x).collect();
    assert!(xs.iter().all(|x| x.is_finite()), "diverged: {xs:?}");
    assert!(xs.windows(2).all(|w| w[0] <= w[1]), "unranked: {xs:?}");
    for creature in generation.creatures() {
        assert!(creature.nodes().iter().all(|n| n.position().y >= -1e-9));
    }
}

#[test]
fn test_reset_twice_equals_once() {
    let config = quick_config();
    let mut rng = Xoshiro256StarStar::seed_from_u64(8);
    let generation = Generation::genesis(&config, &mut rng).expect("genesis");

    for creature in generation.creatures() {
        let mut once = creature.clone();
        once.reset();
        let mut twice = once.clone();
        twice.reset();
        assert_eq!(once, twice);
        assert!(once.nodes().iter().all(|n| n.position() == n.rest_position()));
    }
}

#[test]
fn test_evolution_driver_records_history() {
    init_logging();
    let mut evolution = Evolution::new(quick_config(), Xoshiro256StarStar::seed_from_u64(5))
        .expect("genesis");
    evolution.run(3).expect("three generations");

    let history = evolution.history();
    assert_eq!(history.len(), 4);
    for (i, stats) in history.iter().enumerate() {
        assert_eq!(stats.generation, i);
        assert_eq!(stats.population, 20);
        assert!(stats.worst_fitness <= stats.mean_fitness + 1e-9);
        assert!(stats.mean_fitness <= stats.best_fitness + 1e-9);
    }
}

#[test]
fn test_config_from_ron_drives_a_run() {
    let config = EvolutionConfig::from_ron_str(
        "(population_size: 6, ticks: 1, simulation: (resolution: 50), creature: (max_nodes: 3))",
    )
    .expect("valid config");
    let mut evolution = Evolution::seeded(config, 3).expect("genesis");
    let generation = evolution.run(2).expect("two generations");

    assert_eq!(generation.len(), 6);
    assert!(generation.creatures().iter().all(|c| c.nodes().len() >= 2));
}
