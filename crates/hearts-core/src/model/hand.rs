use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|&held| held == card) {
            Some(index) => {
                self.cards.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|card| card.suit == suit)
    }

    pub fn only_hearts(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|card| card.suit.is_heart())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn to_set(&self) -> CardSet {
        CardSet::from_cards(&self.cards)
    }

    /// Card id order: suit first, then rank.
    fn sort(&mut self) {
        self.cards.sort_unstable_by_key(|card| card.id());
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn remove_reports_missing_cards() {
        let card = Card::new(Rank::Three, Suit::Clubs);
        let mut hand = Hand::with_cards(vec![card, Card::QUEEN_OF_SPADES]);
        assert!(hand.contains(card));
        assert!(hand.remove(card));
        assert!(!hand.contains(card));
        assert!(!hand.remove(card));
    }

    #[test]
    fn cards_are_sorted_by_suit_then_rank() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Ace, Suit::Clubs),
        ]);
        let ordered: Vec<_> = hand.iter().copied().collect();
        assert_eq!(ordered[0], Card::new(Rank::Two, Suit::Clubs));
        assert_eq!(ordered[1], Card::new(Rank::Ace, Suit::Clubs));
        assert_eq!(ordered[2], Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn only_hearts_requires_cards() {
        assert!(!Hand::default().only_hearts());
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Hearts),
        ]);
        assert!(hand.only_hearts());
        assert!(!hand.has_suit(Suit::Spades));
    }
}
