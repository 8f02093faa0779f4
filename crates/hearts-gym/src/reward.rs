//! Reward shaping for reinforcement learning.
//!
//! Rewards reach a player on their *next* turn, not right after they act. The
//! shaper therefore reads the `prev_*` view of [`GameState`]: the player's last
//! card, the hand they kept, and the last completed trick, which is the trick
//! that card went into. The player being rewarded is usually not the player
//! who just acted.

use hearts_core::GameError;
use hearts_core::game::GameState;
use hearts_core::model::card::Card;
use hearts_core::model::card_set::CardSet;
use hearts_core::model::hand::Hand;
use hearts_core::model::rank::Rank;
use hearts_core::model::suit::Suit;
use hearts_core::rules;
use serde::Serialize;
use tracing::{Level, event};

pub type Reward = f32;

/// Rank index below which a led card counts as low (the king's index).
const LOW_LEAD_CEILING: usize = 11;

/// Individual heuristic contributing to a shaped reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTerm {
    /// The player's last submission was illegal.
    IllegalMove,
    /// The player has not played yet.
    NoInformation,
    /// The player holds every point in the game.
    ShotTheMoon,
    /// Queen of spades discarded off-suit or under the ace/king.
    QueenShed,
    /// Queen of spades kept although it could have been dropped safely.
    QueenHeld,
    /// Won a trick containing the queen of spades.
    CapturedQueen,
    /// Won a trick carrying points.
    CapturedPoints,
    /// Ace or king of spades discarded on a non-spade trick.
    HighSpadeShed,
    /// Ace or king of spades kept while void in the led suit.
    HighSpadeKept,
    /// Extra shedding credit for the last player before the queen shows.
    LastToActShed,
    /// Extra retention penalty for the last player before the queen shows.
    LastToActKept,
    /// Won while holding a higher card of the same suit.
    CouldWinHigher,
    /// Won a clean trick but kept a higher card of the suit.
    CleanTrickHigher,
    /// Won a clean trick with the top card held in the suit.
    CleanTrickTopCard,
    /// Lost the trick.
    AvoidedCapture,
    /// Lost the trick by playing a heart.
    DumpedHeart,
    /// Lost the trick while holding a higher card that would also have lost.
    Sandbagged,
    /// Lost the trick with no higher losing card available.
    NoHigherOption,
    /// Led the trick with a low card.
    OpeningLead,
    /// The low lead was a heart.
    LowHeartLead,
    /// Trick winner's net score for the trick.
    NetTrickWin,
}

/// Term-by-term account of a shaped reward.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub terms: Vec<(RewardTerm, Reward)>,
    /// The winner also held a lower card of the suit that would still have
    /// beaten the runner-up. Recorded for analysis, never rewarded.
    pub could_win_lower: bool,
}

impl RewardBreakdown {
    pub fn total(&self) -> Reward {
        self.terms.iter().map(|(_, value)| value).sum()
    }

    pub fn contains(&self, term: RewardTerm) -> bool {
        self.terms.iter().any(|(t, _)| *t == term)
    }

    pub fn value_of(&self, term: RewardTerm) -> Option<Reward> {
        self.terms
            .iter()
            .find(|(t, _)| *t == term)
            .map(|(_, value)| *value)
    }

    fn push(&mut self, term: RewardTerm, value: Reward) {
        self.terms.push((term, value));
    }
}

/// Stateless reward function over an immutable [`GameState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardShaper;

impl RewardShaper {
    pub fn new() -> Self {
        Self
    }

    /// Reward for `player_index` after `prev_active_player_index` acted.
    ///
    /// # Arguments
    /// * `state` - Game state after the action was applied
    /// * `player_index` - Player receiving the reward (usually the next to act)
    /// * `prev_active_player_index` - Player who took the action
    /// * `trick_is_over` - Whether that action completed a trick
    pub fn compute_reward(
        &self,
        state: &GameState,
        player_index: usize,
        prev_active_player_index: usize,
        trick_is_over: bool,
    ) -> Result<Reward, GameError> {
        self.explain(state, player_index, prev_active_player_index, trick_is_over)
            .map(|breakdown| breakdown.total())
    }

    /// Same as [`compute_reward`](Self::compute_reward) but keeps every term.
    pub fn explain(
        &self,
        state: &GameState,
        player_index: usize,
        prev_active_player_index: usize,
        trick_is_over: bool,
    ) -> Result<RewardBreakdown, GameError> {
        let num_players = state.num_players();
        if player_index >= num_players || prev_active_player_index >= num_players {
            return Err(GameError::invariant(format!(
                "player indices {player_index}/{prev_active_player_index} out of range \
                 for {num_players} players"
            )));
        }

        let mut breakdown = RewardBreakdown::default();
        let max_reward = state.max_penalty() as Reward * state.max_num_cards_on_hand() as Reward;

        if state.prev_was_illegal(player_index) {
            breakdown.push(RewardTerm::IllegalMove, -max_reward);
            return Ok(breakdown);
        }

        let Some(card) = state.prev_played_card(player_index) else {
            breakdown.push(RewardTerm::NoInformation, 0.0);
            return Ok(breakdown);
        };

        let trick = state.prev_trick().ok_or_else(|| {
            GameError::invariant(format!(
                "player {player_index} played {card} but no trick has completed"
            ))
        })?;
        if trick.card_of(player_index) != Some(card) {
            return Err(GameError::invariant(format!(
                "last completed trick does not hold {card} from player {player_index}"
            )));
        }

        if trick_is_over && state.has_shot_the_moon(player_index) {
            breakdown.push(RewardTerm::ShotTheMoon, max_reward);
            return Ok(breakdown);
        }

        let winner = state
            .prev_trick_winner_index()
            .ok_or_else(|| GameError::invariant("completed trick without a winner"))?;
        let penalty = state
            .prev_trick_penalty()
            .ok_or_else(|| GameError::invariant("completed trick without a penalty total"))?;
        let leading_suit = trick
            .lead_suit()
            .ok_or_else(|| GameError::invariant("completed trick without a leading suit"))?;

        let view = TrickView {
            card,
            table: trick.card_set(),
            kept: state
                .prev_hand(player_index)
                .map(Hand::to_set)
                .ok_or_else(|| GameError::invariant("no retained hand for player"))?,
            leading_suit,
            won: winner == player_index,
            penalty,
        };

        view.queen_of_spades(&mut breakdown, max_reward);
        if trick_is_over && view.won {
            view.captured(&mut breakdown);
        }
        let last_to_act =
            rules::trick_position(trick.leader(), player_index, num_players) == num_players - 1;
        view.high_spades(&mut breakdown, last_to_act);

        if view.won {
            let runner_up = view.table.without(card).highest_in(leading_suit);
            view.could_have_won(&mut breakdown, runner_up);
        } else {
            let winning_card = trick.card_of(winner).ok_or_else(|| {
                GameError::invariant(format!("trick winner {winner} did not play"))
            })?;
            view.lost(&mut breakdown, winning_card);
        }

        if !trick_is_over && trick.leader() == player_index {
            view.opening_lead(&mut breakdown);
        }

        if trick_is_over && view.won {
            let net = if penalty == 0 {
                state.max_penalty() as Reward
            } else {
                -(penalty as Reward)
            };
            breakdown.push(RewardTerm::NetTrickWin, net);
        }

        if tracing::enabled!(Level::TRACE) {
            event!(
                target: "hearts_gym::reward",
                Level::TRACE,
                player = player_index,
                prev_active = prev_active_player_index,
                trick_is_over,
                card = %card,
                total = breakdown.total(),
                terms = ?breakdown.terms,
            );
        }

        Ok(breakdown)
    }
}

/// The rewarded player's side of the last completed trick.
struct TrickView {
    card: Card,
    table: CardSet,
    kept: CardSet,
    leading_suit: Suit,
    won: bool,
    penalty: u32,
}

impl TrickView {
    fn spades_led(&self) -> bool {
        self.leading_suit.is_spade()
    }

    fn was_void(&self) -> bool {
        self.card.suit != self.leading_suit && !self.kept.has_suit(self.leading_suit)
    }

    fn queen_of_spades(&self, breakdown: &mut RewardBreakdown, max_reward: Reward) {
        let queen_is_safe = !self.spades_led() || self.table.has_high_spade();
        if self.card.is_queen_of_spades() {
            if queen_is_safe {
                breakdown.push(RewardTerm::QueenShed, max_reward);
            }
        } else if queen_is_safe && self.kept.contains(Card::QUEEN_OF_SPADES) {
            breakdown.push(RewardTerm::QueenHeld, -1.0);
        }
    }

    fn captured(&self, breakdown: &mut RewardBreakdown) {
        if self.table.contains(Card::QUEEN_OF_SPADES) {
            breakdown.push(RewardTerm::CapturedQueen, -1.0);
        }
        if self.penalty != 0 {
            breakdown.push(RewardTerm::CapturedPoints, -1.0);
        }
    }

    fn high_spades(&self, breakdown: &mut RewardBreakdown, last_to_act: bool) {
        if self.spades_led() {
            return;
        }
        let shed = self.card.is_high_spade();
        let kept = self.was_void() && self.kept.has_high_spade();
        if shed {
            breakdown.push(RewardTerm::HighSpadeShed, 1.0);
        }
        if kept {
            breakdown.push(RewardTerm::HighSpadeKept, -1.0);
        }

        // Nobody can drop the queen after the last player, so shedding here is free.
        if last_to_act && !self.table.contains(Card::QUEEN_OF_SPADES) {
            if shed {
                breakdown.push(RewardTerm::LastToActShed, 1.0);
            }
            if kept {
                breakdown.push(RewardTerm::LastToActKept, -1.0);
            }
        }
    }

    fn could_have_won(&self, breakdown: &mut RewardBreakdown, runner_up: Option<Rank>) {
        let has_higher = self
            .kept
            .highest_in(self.card.suit)
            .is_some_and(|rank| rank > self.card.rank);
        let has_lower = self.kept.iter().any(|kept| {
            kept.suit == self.card.suit
                && kept.rank < self.card.rank
                && runner_up.is_none_or(|rank| kept.rank > rank)
        });

        if has_higher {
            breakdown.push(RewardTerm::CouldWinHigher, -1.0);
        }
        breakdown.could_win_lower = has_lower;

        if self.penalty == 0 {
            if has_higher {
                breakdown.push(RewardTerm::CleanTrickHigher, -1.0);
            } else {
                breakdown.push(RewardTerm::CleanTrickTopCard, 1.0);
            }
        }
    }

    fn lost(&self, breakdown: &mut RewardBreakdown, winning_card: Card) {
        breakdown.push(RewardTerm::AvoidedCapture, 2.0);

        let sandbagged = self.card.suit == self.leading_suit
            && self.kept.iter().any(|kept| {
                kept.suit == self.leading_suit
                    && kept.rank > self.card.rank
                    && kept.rank < winning_card.rank
            });

        if self.card.suit.is_heart() {
            breakdown.push(RewardTerm::DumpedHeart, -2.0);
        } else if sandbagged {
            breakdown.push(RewardTerm::Sandbagged, -1.0);
        } else {
            breakdown.push(RewardTerm::NoHigherOption, 1.0);
        }
    }

    fn opening_lead(&self, breakdown: &mut RewardBreakdown) {
        let rank = self.card.rank.index();
        if rank < LOW_LEAD_CEILING {
            breakdown.push(RewardTerm::OpeningLead, (LOW_LEAD_CEILING - rank) as Reward);
            if self.card.suit.is_heart() {
                breakdown.push(RewardTerm::LowHeartLead, -2.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearts_core::game::GameConfig;

    #[test]
    fn fresh_game_has_no_information() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let shaper = RewardShaper::new();
        for player in 0..4 {
            assert_eq!(shaper.compute_reward(&state, player, 0, false), Ok(0.0));
        }
    }

    #[test]
    fn out_of_range_player_is_rejected() {
        let state = GameState::new(GameConfig::default()).unwrap();
        assert!(RewardShaper::new().compute_reward(&state, 4, 0, false).is_err());
    }

    #[test]
    fn reward_before_first_trick_completes_is_an_invariant_violation() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        let leader = state.active_player_index();
        let card = state.legal_cards(leader).unwrap()[0];
        state.play_card(card, true).unwrap();
        assert!(matches!(
            RewardShaper::new().compute_reward(&state, leader, leader, false),
            Err(GameError::InvariantViolation(_))
        ));
    }

    #[test]
    fn breakdown_totals_terms() {
        let mut breakdown = RewardBreakdown::default();
        breakdown.push(RewardTerm::AvoidedCapture, 2.0);
        breakdown.push(RewardTerm::DumpedHeart, -2.0);
        breakdown.push(RewardTerm::OpeningLead, 5.0);
        assert_eq!(breakdown.total(), 5.0);
        assert_eq!(breakdown.value_of(RewardTerm::OpeningLead), Some(5.0));
        assert!(!breakdown.contains(RewardTerm::Sandbagged));
    }
}
