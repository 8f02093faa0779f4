use hearts_core::GameError;
use hearts_core::game::GameState;
use hearts_core::model::card::{CARD_ID_COUNT, Card};
use hearts_core::model::suit::Suit;
use hearts_core::model::trick::Play;
use serde::{Deserialize, Serialize};

/// Features that do not depend on the number of players:
/// hand one-hot, table one-hot, leading suit one-hot, hearts broken.
const FIXED_FEATURES: usize = CARD_ID_COUNT * 2 + 4 + 1;

/// Total length of [`Observation::as_array`] for a game of `num_players`.
pub const fn feature_dim(num_players: usize) -> usize {
    FIXED_FEATURES + num_players
}

/// What a single player is allowed to see when it is their turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub player_index: usize,
    pub hand: Vec<Card>,
    pub table: Vec<Play>,
    pub leading_suit: Option<Suit>,
    pub hearts_broken: bool,
    pub penalties: Vec<u32>,
    /// Indexed by card id; true when the card may be played right now.
    pub legal_mask: Vec<bool>,
    pub max_penalty: u32,
}

impl Observation {
    pub fn build(state: &GameState, player: usize) -> Result<Self, GameError> {
        let hand = state.hand(player).ok_or_else(|| {
            GameError::invariant(format!(
                "cannot observe player {player} in a {}-player game",
                state.num_players()
            ))
        })?;

        let mut legal_mask = vec![false; CARD_ID_COUNT];
        if player == state.active_player_index() && !state.is_done() {
            for card in state.legal_cards(player)? {
                legal_mask[card.id()] = true;
            }
        }

        Ok(Observation {
            player_index: player,
            hand: hand.cards().to_vec(),
            table: state.table_cards().to_vec(),
            leading_suit: state.leading_suit(),
            hearts_broken: state.hearts_broken(),
            penalties: state.penalties().to_vec(),
            legal_mask,
            max_penalty: state.max_penalty(),
        })
    }

    pub fn num_players(&self) -> usize {
        self.penalties.len()
    }

    pub fn is_legal(&self, card: Card) -> bool {
        self.legal_mask.get(card.id()).copied().unwrap_or(false)
    }

    /// Legal cards in card id order.
    pub fn legal_cards(&self) -> Vec<Card> {
        self.legal_mask
            .iter()
            .enumerate()
            .filter(|(_, legal)| **legal)
            .filter_map(|(id, _)| Card::from_id(id))
            .collect()
    }

    pub fn is_leading(&self) -> bool {
        self.table.is_empty()
    }

    /// Flatten into a feature vector of length [`feature_dim`].
    pub fn as_array(&self) -> Vec<f32> {
        let mut features = vec![0.0f32; feature_dim(self.num_players())];
        let mut offset = 0;

        for card in &self.hand {
            features[offset + card.id()] = 1.0;
        }
        offset += CARD_ID_COUNT;

        for play in &self.table {
            features[offset + play.card.id()] = 1.0;
        }
        offset += CARD_ID_COUNT;

        if let Some(suit) = self.leading_suit {
            features[offset + suit.index()] = 1.0;
        }
        offset += 4;

        features[offset] = if self.hearts_broken { 1.0 } else { 0.0 };
        offset += 1;

        // Penalties relative to the points a single player can hold at most.
        let scale = (self.max_penalty * 2).max(1) as f32;
        for (idx, penalty) in self.penalties.iter().enumerate() {
            features[offset + idx] = *penalty as f32 / scale;
        }
        offset += self.penalties.len();

        debug_assert_eq!(offset, features.len());
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearts_core::game::GameConfig;
    use hearts_core::model::rank::Rank;

    fn fresh() -> GameState {
        GameState::new(GameConfig {
            seed: 11,
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn legal_mask_matches_rules() {
        let state = fresh();
        let player = state.active_player_index();
        let obs = Observation::build(&state, player).unwrap();

        assert_eq!(obs.legal_cards(), {
            let mut legal = state.legal_cards(player).unwrap();
            legal.sort_by_key(|card| card.id());
            legal
        });
        assert_eq!(
            obs.legal_mask.iter().filter(|legal| **legal).count(),
            obs.legal_cards().len()
        );
        assert!(obs.is_leading());
    }

    #[test]
    fn other_players_have_no_legal_cards_off_turn() {
        let state = fresh();
        let waiting = (state.active_player_index() + 1) % 4;
        let obs = Observation::build(&state, waiting).unwrap();
        assert!(obs.legal_cards().is_empty());
        assert_eq!(obs.hand.len(), 13);
    }

    #[test]
    fn flat_encoding_marks_hand_and_table() {
        let mut state = fresh();
        let leader = state.active_player_index();
        let lead = state.legal_cards(leader).unwrap()[0];
        state.play_card(lead, true).unwrap();

        let next = state.active_player_index();
        let obs = Observation::build(&state, next).unwrap();
        let features = obs.as_array();
        assert_eq!(features.len(), feature_dim(4));

        let hand_ones = features[..CARD_ID_COUNT]
            .iter()
            .filter(|v| **v == 1.0)
            .count();
        assert_eq!(hand_ones, 13);
        assert_eq!(features[CARD_ID_COUNT + lead.id()], 1.0);
        assert_eq!(features[CARD_ID_COUNT * 2 + lead.suit.index()], 1.0);
    }

    #[test]
    fn observing_a_missing_player_is_an_error() {
        let state = fresh();
        assert!(matches!(
            Observation::build(&state, 4),
            Err(GameError::InvariantViolation(_))
        ));
    }

    #[test]
    fn unknown_card_is_not_legal() {
        let state = fresh();
        let player = state.active_player_index();
        let obs = Observation::build(&state, player).unwrap();
        let outsider = state.hand((player + 1) % 4).unwrap().cards()[0];
        assert!(!obs.is_legal(outsider));
        assert!(!obs.is_legal(Card::new(Rank::Ace, Suit::Hearts)));
    }
}
