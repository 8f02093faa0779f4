use crate::config::EnvConfig;
use crate::observation::Observation;
use crate::reward::{Reward, RewardShaper};
use hearts_core::GameError;
use hearts_core::game::{GameConfig, GameState};
use hearts_core::model::card::Card;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{Level, event};

/// Single-game environment driven one card at a time.
pub struct HeartsEnv {
    config: EnvConfig,
    state: GameState,
    shaper: RewardShaper,
    games_dealt: u64,
}

/// Result of one [`HeartsEnv::step`], keyed by player index.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub observations: BTreeMap<usize, Observation>,
    pub rewards: BTreeMap<usize, Reward>,
    pub done: bool,
    pub info: StepInfo,
}

/// Additional step information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepInfo {
    pub prev_active_player_index: usize,
    pub card: Card,
    pub was_illegal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trick_winner: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trick_penalty: Option<u32>,
    pub penalties: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_penalties: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_rankings: Option<Vec<usize>>,
}

impl HeartsEnv {
    pub fn new(config: EnvConfig) -> Result<Self, GameError> {
        let state = GameState::new(config.game_config())?;
        Ok(Self {
            config,
            state,
            shaper: RewardShaper::new(),
            games_dealt: 0,
        })
    }

    /// Deal the next game: game `k` uses seed `config.seed + k`. Returns the
    /// first active player's observation.
    pub fn reset(&mut self) -> Result<Observation, GameError> {
        self.deal(self.games_dealt)
    }

    /// Deal game `game_index` directly, so independent runners can share a
    /// seed schedule without replaying earlier games.
    pub fn deal(&mut self, game_index: u64) -> Result<Observation, GameError> {
        let seed = self.config.seed.wrapping_add(game_index);
        self.games_dealt = game_index + 1;
        self.state.reset(seed);

        let leader = self.state.active_player_index();
        event!(
            target: "hearts_gym::env",
            Level::DEBUG,
            game = game_index,
            seed,
            leader,
            "game dealt"
        );
        Observation::build(&self.state, leader)
    }

    /// Play `card` for the active player.
    ///
    /// Returns the next active player's observation and reward, or every
    /// player's once the game is over.
    pub fn step(&mut self, card: Card) -> Result<Step, GameError> {
        let outcome = self.state.play_card(card, self.config.mask_actions)?;
        let trick_is_over = outcome.trick_is_over();

        let mut observations = BTreeMap::new();
        let mut rewards = BTreeMap::new();
        let recipients: Vec<usize> = if outcome.done {
            (0..self.state.num_players()).collect()
        } else {
            vec![self.state.active_player_index()]
        };
        for player in recipients {
            let reward = self.shaper.compute_reward(
                &self.state,
                player,
                outcome.player,
                trick_is_over || outcome.done,
            )?;
            rewards.insert(player, reward);
            observations.insert(player, Observation::build(&self.state, player)?);
        }

        let info = StepInfo {
            prev_active_player_index: outcome.player,
            card: outcome.card,
            was_illegal: outcome.was_illegal,
            trick_winner: outcome.trick.map(|trick| trick.winner),
            trick_penalty: outcome.trick.map(|trick| trick.penalty),
            penalties: self.state.penalties().to_vec(),
            final_penalties: self.state.final_penalties().map(<[u32]>::to_vec),
            final_rankings: self.state.final_rankings(),
        };

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "hearts_gym::env",
                Level::DEBUG,
                player = outcome.player,
                card = %outcome.card,
                was_illegal = outcome.was_illegal,
                trick_winner = ?info.trick_winner,
                rewards = ?rewards,
            );
        }
        if outcome.done {
            event!(
                target: "hearts_gym::env",
                Level::INFO,
                game = self.games_dealt.saturating_sub(1),
                final_penalties = ?info.final_penalties,
                final_rankings = ?info.final_rankings,
                "game finished"
            );
        }

        Ok(Step {
            observations,
            rewards,
            done: outcome.done,
            info,
        })
    }

    /// Current view for `player`; an invariant error if no such player.
    pub fn observe(&self, player: usize) -> Result<Observation, GameError> {
        Observation::build(&self.state, player)
    }

    pub fn active_player(&self) -> usize {
        self.state.active_player_index()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn game_config(&self) -> GameConfig {
        self.config.game_config()
    }

    pub fn games_dealt(&self) -> u64 {
        self.games_dealt
    }
}
