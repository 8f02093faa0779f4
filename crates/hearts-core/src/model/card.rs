use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Point value of the queen of spades under standard rules.
pub const MAX_PENALTY: u32 = 13;

/// Number of distinct card ids.
pub const CARD_ID_COUNT: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const QUEEN_OF_SPADES: Card = Card::new(Rank::Queen, Suit::Spades);
    pub const KING_OF_SPADES: Card = Card::new(Rank::King, Suit::Spades);
    pub const ACE_OF_SPADES: Card = Card::new(Rank::Ace, Suit::Spades);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Dense id in `0..52`: `suit * 13 + rank`.
    pub const fn id(self) -> usize {
        self.suit.index() * 13 + self.rank.index()
    }

    pub const fn from_id(id: usize) -> Option<Self> {
        let Some(suit) = Suit::from_index(id / 13) else {
            return None;
        };
        match Rank::from_index(id % 13) {
            Some(rank) => Some(Self::new(rank, suit)),
            None => None,
        }
    }

    pub const fn is_penalty(self) -> bool {
        matches!(self.suit, Suit::Hearts) || self.is_queen_of_spades()
    }

    pub const fn is_queen_of_spades(self) -> bool {
        matches!(self.rank, Rank::Queen) && matches!(self.suit, Suit::Spades)
    }

    /// Ace or king of spades: the cards that capture a discarded queen.
    pub const fn is_high_spade(self) -> bool {
        matches!(self.suit, Suit::Spades) && matches!(self.rank, Rank::Ace | Rank::King)
    }

    /// Points carried by this card when the queen is worth `max_penalty`.
    pub const fn penalty_value(self, max_penalty: u32) -> u32 {
        if self.is_queen_of_spades() {
            max_penalty
        } else if self.suit.is_heart() {
            1
        } else {
            0
        }
    }

    /// Long form name such as `"queen_spades"`.
    pub fn name(self) -> String {
        format!("{}_{}", self.rank.name(), self.suit.name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
