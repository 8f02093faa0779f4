//! Stateless Hearts rules: legality, trick resolution and scoring.

use crate::error::GameError;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::suit::Suit;
use crate::model::trick::Play;

/// Cards `hand` may play given the trick's leading suit.
///
/// Leading: anything, except hearts stay locked until broken unless the hand
/// holds nothing else. Following: the leading suit if held, else anything.
pub fn legal_moves(hand: &Hand, leading_suit: Option<Suit>, hearts_broken: bool) -> Vec<Card> {
    match leading_suit {
        None => {
            if hearts_broken || hand.only_hearts() {
                hand.cards().to_vec()
            } else {
                hand.iter()
                    .copied()
                    .filter(|card| !card.suit.is_heart())
                    .collect()
            }
        }
        Some(suit) => {
            if hand.has_suit(suit) {
                hand.iter().copied().filter(|card| card.suit == suit).collect()
            } else {
                hand.cards().to_vec()
            }
        }
    }
}

pub fn is_illegal(
    card: Card,
    hand: &Hand,
    leading_suit: Option<Suit>,
    hearts_broken: bool,
) -> bool {
    !legal_moves(hand, leading_suit, hearts_broken).contains(&card)
}

pub fn penalty_value(card: Card, max_penalty: u32) -> u32 {
    card.penalty_value(max_penalty)
}

/// Winner and penalty total of a finished trick.
pub fn resolve_trick(
    plays: &[Play],
    leading_suit: Suit,
    max_penalty: u32,
) -> Result<(usize, u32), GameError> {
    let winner = plays
        .iter()
        .filter(|play| play.card.suit == leading_suit)
        .max_by_key(|play| play.card.rank)
        .map(|play| play.player)
        .ok_or_else(|| {
            GameError::invariant(format!("no card of leading suit {leading_suit} in trick"))
        })?;

    let penalty = plays
        .iter()
        .map(|play| penalty_value(play.card, max_penalty))
        .sum();

    Ok((winner, penalty))
}

/// True when `player` captured every available point and nobody else scored.
pub fn has_shot_the_moon(penalties: &[u32], player: usize, total_penalty: u32) -> bool {
    if total_penalty == 0 || penalties.get(player) != Some(&total_penalty) {
        return false;
    }
    penalties
        .iter()
        .enumerate()
        .all(|(index, &points)| index == player || points == 0)
}

/// Applies the moon rule: the shooter scores zero, everyone else takes the pot.
pub fn finalize_penalties(penalties: &[u32], total_penalty: u32) -> Vec<u32> {
    let shooter = (0..penalties.len())
        .find(|&player| has_shot_the_moon(penalties, player, total_penalty));
    match shooter {
        Some(shooter) => (0..penalties.len())
            .map(|player| if player == shooter { 0 } else { total_penalty })
            .collect(),
        None => penalties.to_vec(),
    }
}

/// 1-based placements by ascending penalty; tied players share a place.
pub fn rankings(penalties: &[u32]) -> Vec<usize> {
    penalties
        .iter()
        .map(|&mine| penalties.iter().filter(|&&other| other < mine).count() + 1)
        .collect()
}

pub const fn next_player(player: usize, num_players: usize) -> usize {
    (player + 1) % num_players
}

/// Zero-based position of `player` in the play order of a trick led by `leader`.
pub const fn trick_position(leader: usize, player: usize, num_players: usize) -> usize {
    (player + num_players - leader) % num_players
}
