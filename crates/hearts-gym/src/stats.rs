use crate::env::StepInfo;
use serde::Serialize;

/// Aggregate results over many games with a fixed player count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    pub num_players: usize,
    pub games: u64,
    pub steps: u64,
    pub illegal_moves: Vec<u64>,
    pub total_penalties: Vec<u64>,
    /// `placements[player][place - 1]` counts how often `player` finished at `place`.
    pub placements: Vec<Vec<u64>>,
    /// Players sharing first place, per recorded game.
    pub winners: Vec<Vec<usize>>,
}

impl GameStats {
    pub fn new(num_players: usize) -> Self {
        Self {
            num_players,
            games: 0,
            steps: 0,
            illegal_moves: vec![0; num_players],
            total_penalties: vec![0; num_players],
            placements: vec![vec![0; num_players]; num_players],
            winners: Vec::new(),
        }
    }

    pub fn record_step(&mut self, info: &StepInfo) {
        self.steps += 1;
        if info.was_illegal {
            if let Some(count) = self.illegal_moves.get_mut(info.prev_active_player_index) {
                *count += 1;
            }
        }
    }

    pub fn record_game(&mut self, final_penalties: &[u32], final_rankings: &[usize]) {
        self.games += 1;
        for (total, penalty) in self.total_penalties.iter_mut().zip(final_penalties) {
            *total += u64::from(*penalty);
        }
        for (player, place) in final_rankings.iter().enumerate() {
            if let Some(slot) = self
                .placements
                .get_mut(player)
                .and_then(|row| row.get_mut(place.saturating_sub(1)))
            {
                *slot += 1;
            }
        }
        self.winners.push(
            final_rankings
                .iter()
                .enumerate()
                .filter(|(_, place)| **place == 1)
                .map(|(player, _)| player)
                .collect(),
        );
    }

    /// Fold `other` into `self`. Winner lists are appended in order.
    pub fn merge(&mut self, other: &GameStats) {
        self.games += other.games;
        self.steps += other.steps;
        for (mine, theirs) in self.illegal_moves.iter_mut().zip(&other.illegal_moves) {
            *mine += theirs;
        }
        for (mine, theirs) in self.total_penalties.iter_mut().zip(&other.total_penalties) {
            *mine += theirs;
        }
        for (mine, theirs) in self.placements.iter_mut().zip(&other.placements) {
            for (slot, count) in mine.iter_mut().zip(theirs) {
                *slot += count;
            }
        }
        self.winners.extend(other.winners.iter().cloned());
    }

    pub fn mean_penalties(&self) -> Vec<f64> {
        if self.games == 0 {
            return vec![0.0; self.num_players];
        }
        self.total_penalties
            .iter()
            .map(|total| *total as f64 / self.games as f64)
            .collect()
    }

    pub fn wins(&self, player: usize) -> u64 {
        self.placements
            .get(player)
            .and_then(|row| row.first())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_illegal_moves(&self) -> u64 {
        self.illegal_moves.iter().sum()
    }
}
