use std::fs;

use hearts_gym::config::EnvConfig;
use hearts_gym::env::HeartsEnv;
use hearts_gym::policy::{Policy, PolicyKind, RandomPolicy};
use hearts_gym::simulation::simulate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tempfile::tempdir;

const MAX_REWARD: f32 = 169.0;

fn load_config(mask_actions: bool) -> EnvConfig {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("env.yaml");
    let yaml = format!(
        r#"
num_players: 4
deck_size: 52
seed: 4242
mask_actions: {mask_actions}
logging:
  enable_structured: false
"#
    );
    fs::write(&path, yaml).expect("write config");
    EnvConfig::from_path(&path).expect("config validates")
}

#[test]
fn masked_random_games_reward_only_the_next_player() {
    let config = load_config(true);
    let mut env = HeartsEnv::new(config).expect("env created");
    let mut policy = RandomPolicy::new(1);

    for _ in 0..5 {
        let mut observation = env.reset().expect("game dealt");
        let mut steps = 0;
        loop {
            let card = policy.choose_play(&observation).expect("legal card");
            let mut step = env.step(card).expect("masked play of a legal card");
            steps += 1;
            assert!(!step.info.was_illegal);

            for reward in step.rewards.values() {
                assert!(reward.abs() <= MAX_REWARD + 30.0, "reward {reward} out of range");
                assert_ne!(*reward, -MAX_REWARD);
            }

            if step.done {
                assert_eq!(steps, 52);
                assert_eq!(step.rewards.len(), 4);
                let finals = step.info.final_penalties.clone().expect("final penalties");
                let state = env.state();
                for (player, reward) in &step.rewards {
                    if state.has_shot_the_moon(*player) {
                        assert_eq!(*reward, MAX_REWARD);
                        assert_eq!(finals[*player], 0);
                    }
                }
                assert!(step.info.final_rankings.expect("rankings").contains(&1));
                break;
            }

            assert_eq!(step.rewards.len(), 1);
            let next = env.active_player();
            observation = step.observations.remove(&next).expect("next observation");
        }
    }
}

#[test]
fn unmasked_illegal_submissions_cost_the_maximum() {
    let config = load_config(false);
    let mut env = HeartsEnv::new(config).expect("env created");
    let mut rng = StdRng::seed_from_u64(77);
    let mut illegal_seen = 0;

    let mut observation = env.reset().expect("game dealt");
    loop {
        let player = observation.player_index;
        // Any card from the hand, legal or not.
        let card = *observation.hand.choose(&mut rng).expect("non-empty hand");
        let step = env.step(card).expect("unmasked play never fails");
        assert_eq!(step.info.prev_active_player_index, player);

        if step.info.was_illegal {
            illegal_seen += 1;
            assert!(!observation.is_legal(card));
            assert_ne!(step.info.card, card);
        }
        if step.done {
            for (player, reward) in &step.rewards {
                if env.state().prev_was_illegal(*player) {
                    assert_eq!(*reward, -MAX_REWARD);
                }
            }
            break;
        }
        for (player, reward) in &step.rewards {
            if env.state().prev_was_illegal(*player) {
                assert_eq!(*reward, -MAX_REWARD);
            }
        }
        observation = env
            .observe(env.active_player())
            .expect("active player observable");
    }
    assert!(illegal_seen > 0, "random play should trip the rules at least once");
}

#[test]
fn simulation_is_independent_of_worker_count() {
    let config = load_config(true);
    let policies = [
        PolicyKind::Random,
        PolicyKind::RuleBased,
        PolicyKind::Random,
        PolicyKind::RuleBased,
    ];

    let serial = simulate(&config, &policies, 8, 1).expect("serial run");
    let parallel = simulate(&config, &policies, 8, 3).expect("parallel run");

    assert_eq!(serial, parallel);
    assert_eq!(serial.stats.games, 8);
    assert_eq!(serial.stats.total_penalties.iter().sum::<u64>() % 26, 0);
}
