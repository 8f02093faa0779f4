use crate::error::GameError;
use crate::model::card::{CARD_ID_COUNT, Card};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Suits eligible for removal when a reduced deck is requested, in removal order.
const REMOVABLE_SUITS: [Suit; 3] = [Suit::Clubs, Suit::Diamonds, Suit::Spades];

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(CARD_ID_COUNT);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// Deck of `size` cards. Point-free cards are dropped lowest rank first,
    /// so hearts and the queen of spades always stay in play.
    pub fn with_size(size: usize) -> Result<Self, GameError> {
        let removable: Vec<Card> = Rank::ORDERED
            .iter()
            .flat_map(|&rank| REMOVABLE_SUITS.iter().map(move |&suit| Card::new(rank, suit)))
            .filter(|card| !card.is_penalty())
            .collect();

        if size > CARD_ID_COUNT || CARD_ID_COUNT - size > removable.len() {
            return Err(GameError::InvalidConfig {
                field: "deck_size".to_string(),
                message: format!(
                    "deck size must be between {} and {CARD_ID_COUNT}, got {size}",
                    CARD_ID_COUNT - removable.len()
                ),
            });
        }

        let dropped = &removable[..CARD_ID_COUNT - size];
        let mut deck = Self::standard();
        deck.cards.retain(|card| !dropped.contains(card));
        Ok(deck)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn shuffled_with_seed(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.shuffle_in_place(&mut rng);
        self
    }

    /// Deals round-robin: card `i` goes to player `i % num_players`.
    pub fn deal(&self, num_players: usize) -> Vec<Vec<Card>> {
        let per_player = self.cards.len() / num_players.max(1);
        let mut hands = vec![Vec::with_capacity(per_player); num_players];
        for (index, card) in self.cards.iter().enumerate() {
            hands[index % num_players].push(*card);
        }
        hands
    }

    /// Total points carried by the deck.
    pub fn total_penalty(&self, max_penalty: u32) -> u32 {
        self.cards
            .iter()
            .map(|card| card.penalty_value(max_penalty))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::card::{Card, MAX_PENALTY};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 52);
        assert_eq!(deck.total_penalty(MAX_PENALTY), 26);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::standard().shuffled_with_seed(42);
        let deck_b = Deck::standard().shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::standard().shuffled_with_seed(1);
        let deck_b = Deck::standard().shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn reduced_deck_drops_lowest_point_free_cards() {
        let deck = Deck::with_size(48).unwrap();
        assert_eq!(deck.len(), 48);
        assert!(!deck.contains(Card::new(Rank::Two, Suit::Clubs)));
        assert!(!deck.contains(Card::new(Rank::Two, Suit::Diamonds)));
        assert!(!deck.contains(Card::new(Rank::Two, Suit::Spades)));
        assert!(!deck.contains(Card::new(Rank::Three, Suit::Clubs)));
        assert!(deck.contains(Card::new(Rank::Two, Suit::Hearts)));
        assert_eq!(deck.total_penalty(MAX_PENALTY), 26);
    }

    #[test]
    fn deck_size_out_of_range_is_rejected() {
        assert!(Deck::with_size(53).is_err());
        assert!(Deck::with_size(13).is_err());
        assert!(Deck::with_size(14).is_ok());
    }

    #[test]
    fn deal_is_round_robin() {
        let deck = Deck::standard();
        let hands = deck.deal(4);
        assert_eq!(hands.len(), 4);
        assert!(hands.iter().all(|hand| hand.len() == 13));
        assert_eq!(hands[1][0], deck.cards()[1]);
    }
}
