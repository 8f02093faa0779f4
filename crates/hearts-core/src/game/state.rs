use crate::error::GameError;
use crate::model::card::{CARD_ID_COUNT, Card, MAX_PENALTY};
use crate::model::card_set::CardSet;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::score::ScoreBoard;
use crate::model::suit::Suit;
use crate::model::trick::{Play, Trick};
use crate::rules;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

pub const DEFAULT_NUM_PLAYERS: usize = 4;
pub const DEFAULT_DECK_SIZE: usize = CARD_ID_COUNT;

/// Parameters fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub num_players: usize,
    pub deck_size: usize,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: DEFAULT_NUM_PLAYERS,
            deck_size: DEFAULT_DECK_SIZE,
            seed: 0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.num_players < 2 {
            return Err(GameError::InvalidConfig {
                field: "num_players".to_string(),
                message: format!("at least two players are required, got {}", self.num_players),
            });
        }
        if self.deck_size % self.num_players != 0 {
            return Err(GameError::InvalidConfig {
                field: "deck_size".to_string(),
                message: format!(
                    "deck size {} is not divisible by {} players",
                    self.deck_size, self.num_players
                ),
            });
        }
        Deck::with_size(self.deck_size).map(|_| ())
    }
}

/// Result of resolving a completed trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickResult {
    pub winner: usize,
    pub penalty: u32,
}

/// What happened when the active player submitted a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub player: usize,
    /// Card that actually reached the table (a substitute if the submission was illegal).
    pub card: Card,
    pub was_illegal: bool,
    pub trick: Option<TrickResult>,
    pub done: bool,
}

impl PlayOutcome {
    pub fn trick_is_over(&self) -> bool {
        self.trick.is_some()
    }
}

/// Authoritative state of one Hearts game.
///
/// Besides the live table, the state keeps the `prev_*` view that reward
/// shaping reads: per-player records written whenever that player plays, and
/// the last completed trick, retained until the next one completes.
#[derive(Debug, Clone)]
pub struct GameState {
    num_players: usize,
    deck: Deck,
    max_penalty: u32,
    max_num_cards_on_hand: usize,
    total_penalty: u32,
    rng: StdRng,
    hands: Vec<Hand>,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    hearts_broken: bool,
    active_player_index: usize,
    scores: ScoreBoard,
    final_penalties: Option<Vec<u32>>,
    prev_hands: Vec<Hand>,
    prev_played_cards: Vec<Option<Card>>,
    prev_was_illegals: Vec<bool>,
    prev_trick: Option<Trick>,
    prev_trick_winner_index: Option<usize>,
    prev_trick_penalty: Option<u32>,
}

impl GameState {
    /// Shuffles a deck with `config.seed` and deals it.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let deck = Deck::with_size(config.deck_size)?;
        let hands = deck.clone().shuffled_with_seed(config.seed).deal(config.num_players);
        Self::assemble(config, deck, hands)
    }

    /// Starts a game from a prepared deal. The hands must partition the deck
    /// implied by `config.deck_size` evenly.
    pub fn from_hands(config: GameConfig, hands: Vec<Vec<Card>>) -> Result<Self, GameError> {
        config.validate()?;
        let deck = Deck::with_size(config.deck_size)?;
        let invalid = |message: String| GameError::InvalidConfig {
            field: "hands".to_string(),
            message,
        };

        if hands.len() != config.num_players {
            return Err(invalid(format!(
                "expected {} hands, got {}",
                config.num_players,
                hands.len()
            )));
        }
        let per_player = config.deck_size / config.num_players;
        let mut seen = CardSet::EMPTY;
        for (player, hand) in hands.iter().enumerate() {
            if hand.len() != per_player {
                return Err(invalid(format!(
                    "player {player} holds {} cards, expected {per_player}",
                    hand.len()
                )));
            }
            for card in hand {
                if !deck.contains(*card) {
                    return Err(invalid(format!("{card} is not part of the deck")));
                }
                if !seen.insert(*card) {
                    return Err(invalid(format!("{card} dealt twice")));
                }
            }
        }

        Self::assemble(config, deck, hands)
    }

    fn assemble(config: GameConfig, deck: Deck, hands: Vec<Vec<Card>>) -> Result<Self, GameError> {
        let num_players = config.num_players;
        let total_penalty = deck.total_penalty(MAX_PENALTY);
        let mut state = Self {
            num_players,
            max_penalty: MAX_PENALTY,
            max_num_cards_on_hand: deck.len() / num_players,
            total_penalty,
            deck,
            rng: StdRng::seed_from_u64(config.seed),
            hands: Vec::new(),
            current_trick: Trick::new(0, num_players),
            trick_history: Vec::new(),
            hearts_broken: false,
            active_player_index: 0,
            scores: ScoreBoard::new(num_players),
            final_penalties: None,
            prev_hands: Vec::new(),
            prev_played_cards: Vec::new(),
            prev_was_illegals: Vec::new(),
            prev_trick: None,
            prev_trick_winner_index: None,
            prev_trick_penalty: None,
        };
        state.install_deal(hands);
        Ok(state)
    }

    /// Deals a fresh game with the same configuration.
    pub fn reset(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        let hands = self.deck.clone().shuffled_with_seed(seed).deal(self.num_players);
        self.install_deal(hands);
    }

    fn install_deal(&mut self, hands: Vec<Vec<Card>>) {
        let hands: Vec<Hand> = hands.into_iter().map(Hand::with_cards).collect();
        let leader = opening_leader(&hands);

        self.prev_hands = hands.clone();
        self.hands = hands;
        self.current_trick = Trick::new(leader, self.num_players);
        self.trick_history.clear();
        self.hearts_broken = false;
        self.active_player_index = leader;
        self.scores.reset();
        self.final_penalties = None;
        self.prev_played_cards = vec![None; self.num_players];
        self.prev_was_illegals = vec![false; self.num_players];
        self.prev_trick = None;
        self.prev_trick_winner_index = None;
        self.prev_trick_penalty = None;
    }

    /// Plays `card` for the active player.
    ///
    /// An illegal card is rejected when `mask_actions` is set. Otherwise a
    /// random legal card is played in its place and the player is flagged in
    /// `prev_was_illegals`.
    pub fn play_card(&mut self, card: Card, mask_actions: bool) -> Result<PlayOutcome, GameError> {
        if self.is_done() {
            return Err(GameError::GameOver);
        }

        let player = self.active_player_index;
        let legal = self.legal_cards(player)?;
        let (card, was_illegal) = if legal.contains(&card) {
            (card, false)
        } else if mask_actions {
            return Err(GameError::IllegalMove { player, card });
        } else {
            let substitute = *legal
                .choose(&mut self.rng)
                .ok_or_else(|| GameError::invariant(format!("player {player} has no legal card")))?;
            event!(
                target: "hearts_core::game",
                Level::WARN,
                player,
                submitted = %card,
                substitute = %substitute,
                "illegal card replaced"
            );
            (substitute, true)
        };

        self.current_trick.play(player, card)?;
        if !self.hands[player].remove(card) {
            return Err(GameError::invariant(format!(
                "{card} vanished from player {player}'s hand"
            )));
        }
        if card.suit.is_heart() {
            self.hearts_broken = true;
        }

        self.prev_played_cards[player] = Some(card);
        self.prev_was_illegals[player] = was_illegal;
        self.prev_hands[player] = self.hands[player].clone();

        let trick = if self.current_trick.is_complete() {
            Some(self.complete_trick()?)
        } else {
            self.active_player_index = rules::next_player(player, self.num_players);
            None
        };

        Ok(PlayOutcome {
            player,
            card,
            was_illegal,
            trick,
            done: self.is_done(),
        })
    }

    fn complete_trick(&mut self) -> Result<TrickResult, GameError> {
        let leading_suit = self
            .current_trick
            .lead_suit()
            .ok_or_else(|| GameError::invariant("completed trick has no cards"))?;
        let (winner, penalty) =
            rules::resolve_trick(self.current_trick.plays(), leading_suit, self.max_penalty)?;

        self.scores.add_penalty(winner, penalty);
        let finished =
            std::mem::replace(&mut self.current_trick, Trick::new(winner, self.num_players));
        self.prev_trick = Some(finished.clone());
        self.trick_history.push(finished);
        self.prev_trick_winner_index = Some(winner);
        self.prev_trick_penalty = Some(penalty);
        self.active_player_index = winner;

        event!(
            target: "hearts_core::game",
            Level::DEBUG,
            trick = self.trick_history.len(),
            winner,
            penalty,
            leading_suit = %leading_suit,
        );

        if self.hands.iter().all(Hand::is_empty) {
            let finals = self.scores.finalized(self.total_penalty);
            event!(
                target: "hearts_core::game",
                Level::DEBUG,
                penalties = ?self.scores.standings(),
                final_penalties = ?finals,
                "game over"
            );
            self.final_penalties = Some(finals);
        }

        Ok(TrickResult { winner, penalty })
    }

    /// Cards `player` could play on the current trick, in hand order.
    pub fn legal_cards(&self, player: usize) -> Result<Vec<Card>, GameError> {
        let hand = self.hand(player).ok_or_else(|| self.unknown_player(player))?;
        Ok(rules::legal_moves(hand, self.leading_suit(), self.hearts_broken))
    }

    fn unknown_player(&self, player: usize) -> GameError {
        GameError::invariant(format!(
            "player {player} out of range for {} players",
            self.num_players
        ))
    }

    /// Whether the active player may play `card` right now.
    pub fn is_legal(&self, card: Card) -> bool {
        !rules::is_illegal(
            card,
            &self.hands[self.active_player_index],
            self.leading_suit(),
            self.hearts_broken,
        )
    }

    pub fn is_done(&self) -> bool {
        self.final_penalties.is_some()
    }

    pub fn has_shot_the_moon(&self, player: usize) -> bool {
        rules::has_shot_the_moon(self.scores.standings(), player, self.total_penalty)
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn max_penalty(&self) -> u32 {
        self.max_penalty
    }

    pub fn max_num_cards_on_hand(&self) -> usize {
        self.max_num_cards_on_hand
    }

    pub fn total_penalty(&self) -> u32 {
        self.total_penalty
    }

    pub fn hand(&self, player: usize) -> Option<&Hand> {
        self.hands.get(player)
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn table_cards(&self) -> &[Play] {
        self.current_trick.plays()
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn leading_suit(&self) -> Option<Suit> {
        self.current_trick.lead_suit()
    }

    pub fn active_player_index(&self) -> usize {
        self.active_player_index
    }

    pub fn hearts_broken(&self) -> bool {
        self.hearts_broken
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    /// Points captured so far, before the moon rule.
    pub fn penalties(&self) -> &[u32] {
        self.scores.standings()
    }

    pub fn final_penalties(&self) -> Option<&[u32]> {
        self.final_penalties.as_deref()
    }

    pub fn final_rankings(&self) -> Option<Vec<usize>> {
        self.final_penalties.as_deref().map(rules::rankings)
    }

    /// Hand `player` kept after their last play; the dealt hand before that.
    pub fn prev_hand(&self, player: usize) -> Option<&Hand> {
        self.prev_hands.get(player)
    }

    pub fn prev_played_card(&self, player: usize) -> Option<Card> {
        self.prev_played_cards.get(player).copied().flatten()
    }

    pub fn prev_was_illegal(&self, player: usize) -> bool {
        self.prev_was_illegals.get(player).copied().unwrap_or(false)
    }

    pub fn prev_trick(&self) -> Option<&Trick> {
        self.prev_trick.as_ref()
    }

    pub fn prev_table_cards(&self) -> &[Play] {
        self.prev_trick.as_ref().map(Trick::plays).unwrap_or(&[])
    }

    pub fn prev_leading_suit(&self) -> Option<Suit> {
        self.prev_trick.as_ref().and_then(Trick::lead_suit)
    }

    pub fn prev_leading_player_index(&self) -> Option<usize> {
        self.prev_trick.as_ref().map(Trick::leader)
    }

    pub fn prev_trick_winner_index(&self) -> Option<usize> {
        self.prev_trick_winner_index
    }

    pub fn prev_trick_penalty(&self) -> Option<u32> {
        self.prev_trick_penalty
    }

    /// Every card currently held, on the table, or in a resolved trick.
    pub fn cards_in_play(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .collect();
        cards.extend(self.current_trick.cards());
        for trick in &self.trick_history {
            cards.extend(trick.cards());
        }
        cards
    }
}

/// Holder of the lowest club leads the first trick; player 0 if clubs are absent.
fn opening_leader(hands: &[Hand]) -> usize {
    hands
        .iter()
        .enumerate()
        .flat_map(|(player, hand)| {
            hand.iter()
                .filter(|card| card.suit == Suit::Clubs)
                .map(move |card| (card.rank, player))
        })
        .min()
        .map(|(_, player)| player)
        .unwrap_or(0)
}
