use super::state::GameState;
use crate::model::card::Card;
use crate::model::suit::Suit;
use crate::model::trick::Play;
use serde::{Deserialize, Serialize};

/// Read-only view of a game, used for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub num_players: usize,
    pub active_player_index: usize,
    pub hands: Vec<Vec<Card>>,
    pub table: Vec<Play>,
    pub leading_suit: Option<Suit>,
    pub hearts_broken: bool,
    pub tricks_completed: usize,
    pub penalties: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_penalties: Option<Vec<u32>>,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            num_players: state.num_players(),
            active_player_index: state.active_player_index(),
            hands: state
                .hands()
                .iter()
                .map(|hand| hand.cards().to_vec())
                .collect(),
            table: state.table_cards().to_vec(),
            leading_suit: state.leading_suit(),
            hearts_broken: state.hearts_broken(),
            tricks_completed: state.trick_history().len(),
            penalties: state.penalties().to_vec(),
            final_penalties: state.final_penalties().map(<[u32]>::to_vec),
        }
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::GameSnapshot;
    use crate::game::state::{GameConfig, GameState};

    #[test]
    fn snapshot_serializes_to_json() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let json = GameSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"num_players\": 4"));
        assert!(json.contains("\"hearts_broken\": false"));
        assert!(!json.contains("\"final_penalties\""));
    }

    #[test]
    fn snapshot_json_roundtrip_matches_capture() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        let player = state.active_player_index();
        let card = state.legal_cards(player).unwrap()[0];
        state.play_card(card, true).unwrap();

        let json = GameSnapshot::to_json(&state).unwrap();
        let decoded = GameSnapshot::from_json(&json).unwrap();
        assert_eq!(decoded, GameSnapshot::capture(&state));
        assert_eq!(decoded.table.len(), 1);
        assert_eq!(decoded.leading_suit, Some(card.suit));
    }
}
