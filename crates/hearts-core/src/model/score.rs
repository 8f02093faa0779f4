use crate::rules;

/// Penalty points captured per player during one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: Vec<u32>,
}

impl ScoreBoard {
    pub fn new(num_players: usize) -> Self {
        Self {
            totals: vec![0; num_players],
        }
    }

    pub fn add_penalty(&mut self, player: usize, points: u32) {
        self.totals[player] += points;
    }

    pub fn standings(&self) -> &[u32] {
        &self.totals
    }

    pub fn reset(&mut self) {
        self.totals.iter_mut().for_each(|total| *total = 0);
    }

    /// Scores after the moon rule, given the points available in the deck.
    pub fn finalized(&self, total_penalty: u32) -> Vec<u32> {
        rules::finalize_penalties(&self.totals, total_penalty)
    }
}
