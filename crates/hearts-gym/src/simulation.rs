use crate::config::EnvConfig;
use crate::env::HeartsEnv;
use crate::policy::{Policy, PolicyKind};
use crate::stats::GameStats;
use hearts_core::GameError;
use serde::Serialize;
use std::thread;
use thiserror::Error;
use tracing::{Level, event};

/// Outcome of [`simulate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub policies: Vec<PolicyKind>,
    pub stats: GameStats,
    /// Sum of shaped rewards each player received over every game.
    pub total_rewards: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("configuration requires {expected} policies but found {found}")]
    PolicyCount { expected: usize, found: usize },
    #[error("policy '{policy}' found no legal card for player {player}")]
    NoLegalCard { player: usize, policy: &'static str },
    #[error("game execution failed: {0}")]
    Game(#[from] GameError),
    #[error("simulation worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

/// Play `games` independent games, one policy per player.
///
/// Game `k` is dealt with seed `config.seed + k` wherever it runs, so the
/// report does not depend on `workers`. Each worker owns its environment.
pub fn simulate(
    config: &EnvConfig,
    policies: &[PolicyKind],
    games: u64,
    workers: usize,
) -> Result<SimulationReport, SimulationError> {
    if policies.len() != config.num_players {
        return Err(SimulationError::PolicyCount {
            expected: config.num_players,
            found: policies.len(),
        });
    }
    config.game_config().validate()?;

    let workers = workers.clamp(1, games.max(1) as usize);
    event!(
        target: "hearts_gym::simulation",
        Level::INFO,
        games,
        workers,
        policies = ?policies,
        "simulation started"
    );

    let results: Vec<Result<WorkerTotals, SimulationError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || {
                    let indices = (worker as u64..games).step_by(workers);
                    run_worker(config, policies, indices)
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(SimulationError::WorkerPanicked { worker }))
            })
            .collect()
    });

    let mut stats = GameStats::new(config.num_players);
    let mut total_rewards = vec![0.0; config.num_players];
    let mut winners = Vec::new();
    for result in results {
        let totals = result?;
        stats.merge(&totals.stats);
        for (sum, reward) in total_rewards.iter_mut().zip(&totals.rewards) {
            *sum += reward;
        }
        winners.extend(totals.winners);
    }
    // Workers interleave game indices; report winners in deal order.
    winners.sort_by_key(|(game_index, _)| *game_index);
    stats.winners = winners.into_iter().map(|(_, players)| players).collect();

    event!(
        target: "hearts_gym::simulation",
        Level::INFO,
        games = stats.games,
        illegal_moves = stats.total_illegal_moves(),
        mean_penalties = ?stats.mean_penalties(),
        "simulation finished"
    );

    Ok(SimulationReport {
        policies: policies.to_vec(),
        stats,
        total_rewards,
    })
}

struct WorkerTotals {
    stats: GameStats,
    rewards: Vec<f64>,
    winners: Vec<(u64, Vec<usize>)>,
}

fn run_worker(
    config: &EnvConfig,
    kinds: &[PolicyKind],
    indices: impl Iterator<Item = u64>,
) -> Result<WorkerTotals, SimulationError> {
    let num_players = config.num_players;
    let mut env = HeartsEnv::new(config.clone())?;
    let mut totals = WorkerTotals {
        stats: GameStats::new(num_players),
        rewards: vec![0.0; num_players],
        winners: Vec::new(),
    };

    for game_index in indices {
        let mut policies: Vec<Box<dyn Policy>> = kinds
            .iter()
            .enumerate()
            .map(|(player, kind)| {
                let seed = config
                    .seed
                    .wrapping_add(game_index.wrapping_mul(num_players as u64))
                    .wrapping_add(player as u64);
                kind.build(seed)
            })
            .collect();

        let mut observation = env.deal(game_index)?;
        loop {
            let player = observation.player_index;
            let policy = &mut policies[player];
            let card = policy
                .choose_play(&observation)
                .ok_or(SimulationError::NoLegalCard {
                    player,
                    policy: policy.name(),
                })?;

            let mut step = env.step(card)?;
            totals.stats.record_step(&step.info);
            for (recipient, reward) in &step.rewards {
                totals.rewards[*recipient] += f64::from(*reward);
            }

            if step.done {
                let finals = step.info.final_penalties.unwrap_or_default();
                let rankings = step.info.final_rankings.unwrap_or_default();
                totals.stats.record_game(&finals, &rankings);
                if let Some(winners) = totals.stats.winners.last() {
                    totals.winners.push((game_index, winners.clone()));
                }
                for policy in policies.iter_mut() {
                    policy.observe_terminal(&finals);
                }
                break;
            }

            let next = env.active_player();
            observation = step.observations.remove(&next).ok_or_else(|| {
                GameError::invariant(format!("no observation for next player {next}"))
            })?;
        }
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> EnvConfig {
        EnvConfig {
            seed,
            mask_actions: true,
            ..EnvConfig::default()
        }
    }

    #[test]
    fn rejects_wrong_policy_count() {
        let err = simulate(&config(0), &[PolicyKind::Random; 3], 1, 1).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::PolicyCount {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn zero_games_yield_empty_report() {
        let report = simulate(&config(0), &[PolicyKind::Random; 4], 0, 4).unwrap();
        assert_eq!(report.stats.games, 0);
        assert!(report.stats.winners.is_empty());
        assert_eq!(report.total_rewards, vec![0.0; 4]);
    }

    #[test]
    fn every_game_distributes_all_points() {
        let policies = [
            PolicyKind::RuleBased,
            PolicyKind::Random,
            PolicyKind::RuleBased,
            PolicyKind::Random,
        ];
        let report = simulate(&config(9), &policies, 6, 2).unwrap();
        assert_eq!(report.stats.games, 6);
        assert_eq!(report.stats.steps, 6 * 52);
        assert_eq!(report.stats.winners.len(), 6);
        assert_eq!(report.stats.total_illegal_moves(), 0);

        let placed: u64 = report.stats.placements.iter().flatten().sum();
        assert_eq!(placed, 6 * 4);
    }
}
