use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;

/// Compact set of cards backed by a 64-bit mask indexed by [`Card::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CardSet {
    bits: u64,
}

impl CardSet {
    pub const EMPTY: CardSet = CardSet { bits: 0 };

    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut set = Self::EMPTY;
        for card in cards {
            set.insert(*card);
        }
        set
    }

    pub fn insert(&mut self, card: Card) -> bool {
        let mask = 1u64 << card.id();
        let fresh = self.bits & mask == 0;
        self.bits |= mask;
        fresh
    }

    /// Copy of the set with `card` taken out.
    pub fn without(self, card: Card) -> Self {
        Self {
            bits: self.bits & !(1u64 << card.id()),
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.bits & (1u64 << card.id()) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.bits & suit_mask(suit) != 0
    }

    /// Highest rank present in `suit`, if any.
    pub fn highest_in(&self, suit: Suit) -> Option<Rank> {
        let lane = (self.bits & suit_mask(suit)) >> (suit.index() * 13);
        if lane == 0 {
            return None;
        }
        Rank::from_index(63 - lane.leading_zeros() as usize)
    }

    pub fn has_high_spade(&self) -> bool {
        self.contains(Card::ACE_OF_SPADES) || self.contains(Card::KING_OF_SPADES)
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        (0..64usize)
            .filter(move |id| self.bits & (1u64 << id) != 0)
            .filter_map(Card::from_id)
    }
}

const fn suit_mask(suit: Suit) -> u64 {
    0x1FFFu64 << (suit.index() * 13)
}
