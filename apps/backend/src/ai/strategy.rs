//! Challenge-response strategy for bot seats.
//!
//! The decision is a clamped probability roll: a difficulty base rate
//! adjusted by score differential, round progress and hand strength.

use rand::Rng;

use crate::domain::cards::Card;
use crate::domain::state::{BotProfile, MatchState, PlayerId};

pub struct BotStrategy;

impl BotStrategy {
    /// Bots lead with the first card in hand; bluffing lives in the
    /// challenge decision, not in card choice.
    pub fn choose_card(state: &MatchState, bot_id: PlayerId) -> Option<Card> {
        state.hands.get(&bot_id)?.first().cloned()
    }

    pub fn should_accept_challenge<R: Rng + ?Sized>(
        state: &MatchState,
        bot_id: PlayerId,
        profile: BotProfile,
        rng: &mut R,
    ) -> bool {
        let base = match profile {
            BotProfile::Easy => 0.7,
            BotProfile::Normal => 0.5,
            BotProfile::Hard => 0.3,
        };

        let rate = base
            + Self::score_modifier(state, bot_id)
            + Self::round_progress_modifier(state)
            + Self::hand_strength_modifier(state, bot_id);
        let rate = rate.clamp(0.0, 1.0);

        rng.random::<f64>() < rate
    }

    /// Desperate when behind, conservative when ahead.
    fn score_modifier(state: &MatchState, bot_id: PlayerId) -> f64 {
        let Ok(bot_team) = state.team_of(bot_id) else {
            return 0.0;
        };
        let diff =
            state.score(bot_team).truts as i32 - state.score(bot_team.opponent()).truts as i32;
        match diff {
            d if d <= -2 => 0.3,
            -1 => 0.15,
            d if d >= 2 => -0.2,
            1 => -0.1,
            _ => 0.0,
        }
    }

    /// Late in the round the bot has seen more of the table and plays
    /// the challenge looser.
    fn round_progress_modifier(state: &MatchState) -> f64 {
        let cards_left: usize = state.hands.values().map(|h| h.len()).sum();
        if cards_left > 4 {
            -0.15
        } else if cards_left <= 2 {
            0.25
        } else {
            0.0
        }
    }

    fn hand_strength_modifier(state: &MatchState, bot_id: PlayerId) -> f64 {
        let Some(hand) = state.hands.get(&bot_id) else {
            return 0.0;
        };
        if hand.is_empty() {
            return 0.0;
        }
        let total: u32 = hand.iter().map(|c| c.strength() as u32).sum();
        let normalized = total as f64 / hand.len() as f64 / 8.0;
        if normalized > 0.7 {
            0.2
        } else if normalized < 0.3 {
            -0.25
        } else {
            0.0
        }
    }
}
