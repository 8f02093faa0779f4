use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::suit::Suit;
use crate::rules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: usize,
    num_players: usize,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub player: usize,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrickError {
    #[error("trick already complete")]
    TrickComplete,
    #[error("expected player {expected} to play next but got player {actual}")]
    OutOfTurn { expected: usize, actual: usize },
}

impl Trick {
    pub fn new(leader: usize, num_players: usize) -> Self {
        Self {
            leader,
            num_players,
            plays: Vec::with_capacity(num_players),
        }
    }

    pub fn leader(&self) -> usize {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub fn card_set(&self) -> CardSet {
        CardSet::from_cards(self.plays.iter().map(|play| &play.card))
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.num_players
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    /// Card played by `player` in this trick.
    pub fn card_of(&self, player: usize) -> Option<Card> {
        self.plays
            .iter()
            .find(|play| play.player == player)
            .map(|play| play.card)
    }

    pub fn play(&mut self, player: usize, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        let expected = self.expected_player();
        if expected != player {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: player,
            });
        }

        self.plays.push(Play { player, card });
        Ok(())
    }

    pub fn expected_player(&self) -> usize {
        self.plays
            .last()
            .map(|play| rules::next_player(play.player, self.num_players))
            .unwrap_or(self.leader)
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn plays_follow_turn_order() {
        let mut trick = Trick::new(0, 4);
        assert!(trick.play(0, Card::new(Rank::Two, Suit::Clubs)).is_ok());
        assert!(matches!(
            trick.play(2, Card::new(Rank::Three, Suit::Clubs)),
            Err(TrickError::OutOfTurn { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn turn_order_wraps_past_last_player() {
        let mut trick = Trick::new(2, 3);
        trick.play(2, Card::new(Rank::Two, Suit::Clubs)).unwrap();
        assert_eq!(trick.expected_player(), 0);
        trick.play(0, Card::new(Rank::Five, Suit::Clubs)).unwrap();
        trick.play(1, Card::new(Rank::Six, Suit::Clubs)).unwrap();
        assert!(trick.is_complete());
        assert_eq!(
            trick.play(2, Card::new(Rank::Seven, Suit::Clubs)),
            Err(TrickError::TrickComplete)
        );
    }

    #[test]
    fn lead_suit_comes_from_first_card() {
        let mut trick = Trick::new(1, 4);
        assert_eq!(trick.lead_suit(), None);
        trick.play(1, Card::new(Rank::Ten, Suit::Diamonds)).unwrap();
        trick.play(2, Card::QUEEN_OF_SPADES).unwrap();
        assert_eq!(trick.lead_suit(), Some(Suit::Diamonds));
        assert_eq!(trick.card_of(2), Some(Card::QUEEN_OF_SPADES));
        assert!(trick.card_set().contains(Card::QUEEN_OF_SPADES));
    }
}
