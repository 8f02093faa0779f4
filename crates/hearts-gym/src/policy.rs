use crate::observation::Observation;
use hearts_core::model::card::Card;
use hearts_core::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// Decision-making interface shared by baseline and learned players.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Choose a card to play. `None` only when the observation has no legal card.
    fn choose_play(&mut self, observation: &Observation) -> Option<Card>;

    /// Optional: observe the end of a game.
    fn observe_terminal(&mut self, _final_penalties: &[u32]) {}
}

/// Built-in policies, addressable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Random,
    #[serde(alias = "rulebased")]
    RuleBased,
}

impl PolicyKind {
    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::RuleBased => Box::new(RuleBasedPolicy::new()),
        }
    }
}

/// Uniformly random legal card.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_play(&mut self, observation: &Observation) -> Option<Card> {
        observation.legal_cards().choose(&mut self.rng).copied()
    }
}

/// Deterministic baseline that tries to stay out of tricks and unload
/// dangerous cards.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedPolicy;

impl RuleBasedPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for RuleBasedPolicy {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn choose_play(&mut self, observation: &Observation) -> Option<Card> {
        let legal = observation.legal_cards();
        if legal.is_empty() {
            return None;
        }

        let (card, reason) = match observation.leading_suit {
            None => (lowest(&legal)?, "lead_low"),
            Some(lead) if legal.iter().all(|card| card.suit == lead) => {
                follow(observation, lead, &legal)?
            }
            Some(_) => discard(&legal)?,
        };

        event!(
            target: "hearts_gym::policy",
            Level::TRACE,
            player = observation.player_index,
            card = %card,
            reason,
        );
        Some(card)
    }
}

fn follow(observation: &Observation, lead: Suit, legal: &[Card]) -> Option<(Card, &'static str)> {
    let winning = observation
        .table
        .iter()
        .filter(|play| play.card.suit == lead)
        .map(|play| play.card.rank)
        .max();

    let ducking = legal
        .iter()
        .filter(|card| winning.is_some_and(|rank| card.rank < rank))
        .max_by_key(|card| card.rank)
        .copied();

    match ducking {
        Some(card) => Some((card, "duck_highest")),
        None => lowest(legal).map(|card| (card, "follow_low")),
    }
}

fn discard(legal: &[Card]) -> Option<(Card, &'static str)> {
    if legal.contains(&Card::QUEEN_OF_SPADES) {
        return Some((Card::QUEEN_OF_SPADES, "dump_queen"));
    }
    for high in [Card::ACE_OF_SPADES, Card::KING_OF_SPADES] {
        if legal.contains(&high) {
            return Some((high, "dump_high_spade"));
        }
    }
    let heart = legal
        .iter()
        .filter(|card| card.suit.is_heart())
        .max_by_key(|card| card.rank)
        .copied();
    if let Some(card) = heart {
        return Some((card, "dump_heart"));
    }
    highest(legal).map(|card| (card, "dump_high"))
}

fn lowest(cards: &[Card]) -> Option<Card> {
    cards.iter().min_by_key(|card| (card.rank, card.suit)).copied()
}

fn highest(cards: &[Card]) -> Option<Card> {
    cards.iter().max_by_key(|card| (card.rank, card.suit)).copied()
}
