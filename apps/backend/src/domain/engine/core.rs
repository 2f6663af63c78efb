//! Shared state-transition logic used by every engine variant.
//!
//! All functions here transform an owned [`MatchState`] and never touch
//! anything outside it. Randomness is confined to dealing.

use std::collections::HashMap;

use rand::Rng;

use crate::domain::cards::CardId;
use crate::domain::dealing;
use crate::domain::state::{
    ChallengeState, MatchState, Phase, PlayedCard, Player, PlayerId, Room, Team, TeamScore,
    TrickWinner, CANNETS_PER_TRUT, TRUTS_TO_WIN,
};
use crate::errors::domain::{DomainError, PreconditionKind, ValidationKind};

/// Build the initial state for a freshly started room. The dealer is
/// seat 0 and the starting player sits to the dealer's left.
pub fn initial_state<R: Rng + ?Sized>(
    room: &Room,
    seat_order: Vec<PlayerId>,
    teams: HashMap<PlayerId, Team>,
    rng: &mut R,
) -> MatchState {
    let (hands, deck_rest) = dealing::deal_round(&seat_order, rng);
    let dealer_index = 0;
    let current_player = seat_order[(dealer_index + 1) % seat_order.len()];

    let mut scores = HashMap::new();
    scores.insert(Team::Team1, TeamScore::default());
    scores.insert(Team::Team2, TeamScore::default());

    MatchState {
        mode: room.mode,
        seat_order,
        teams,
        hands,
        deck_rest,
        current_player,
        turn_counter: 1,
        phase: Phase::Playing,
        current_trick: Vec::new(),
        completed_tricks: Vec::new(),
        trick_winners: Vec::new(),
        rotten_tricks: Vec::new(),
        scores,
        round_number: 1,
        dealer_index,
        challenge: ChallengeState::default(),
        brelan_player: None,
        fortial_active: false,
        fortial_player: None,
        new_round_started: false,
        game_ended: false,
        winner: None,
    }
}

/// Play a card. Common to all modes: remove the card from the hand,
/// append it to the trick, and when the trick fills evaluate it; a
/// trick that empties every hand ends the round.
pub fn play_card<R: Rng + ?Sized>(
    state: &MatchState,
    player_id: PlayerId,
    card_id: CardId,
    rng: &mut R,
) -> Result<MatchState, DomainError> {
    state.require_not_ended()?;
    if state.phase != Phase::Playing {
        return Err(DomainError::precondition(
            PreconditionKind::GameNotInProgress,
            "cards cannot be played while a challenge is pending",
        ));
    }
    state.require_turn(player_id)?;
    let card = state.require_card_in_hand(player_id, card_id)?;

    let mut next = state.clone();
    next.new_round_started = false;

    if let Some(hand) = next.hands.get_mut(&player_id) {
        hand.retain(|c| c.id != card_id);
    }
    next.current_trick.push(PlayedCard { player_id, card });

    if next.current_trick.len() == next.seat_order.len() {
        evaluate_trick(&mut next);

        if next.hands_are_empty() {
            score_round(&mut next);
            if finalize_if_ended(&mut next) {
                return Ok(next);
            }
            start_new_round(&mut next, rng);
        }
    } else {
        next.current_player = next.next_after(player_id)?;
        next.turn_counter += 1;
    }

    Ok(next)
}

/// Resolve a full trick. The first seat in play order holding the
/// maximum strength leads the next trick whether or not it was a tie;
/// ties are recorded as rotten and attributed at scoring time.
pub fn evaluate_trick(state: &mut MatchState) {
    let max_strength = state
        .current_trick
        .iter()
        .map(|e| e.card.strength())
        .max()
        .unwrap_or(0);
    let at_max: Vec<&PlayedCard> = state
        .current_trick
        .iter()
        .filter(|e| e.card.strength() == max_strength)
        .collect();

    let mut rotten = false;
    if let Some(leader) = at_max.first() {
        state.current_player = leader.player_id;
        if at_max.len() == 1 {
            state.trick_winners.push(TrickWinner::Player {
                player_id: leader.player_id,
            });
        } else {
            rotten = true;
            state.trick_winners.push(TrickWinner::Rotten);
        }
    }

    let trick = std::mem::take(&mut state.current_trick);
    if rotten {
        state.rotten_tricks.push(trick.clone());
    }
    state.completed_tricks.push(trick);
    state.turn_counter += 1;
}

/// Team that a rotten trick counts for: the nearest subsequent
/// non-rotten winner, else the nearest prior one, else nobody.
pub fn rotten_attribution(winners: &[TrickWinner], rotten_index: usize) -> Option<PlayerId> {
    winners[rotten_index + 1..]
        .iter()
        .chain(winners[..rotten_index].iter().rev())
        .find_map(|w| match w {
            TrickWinner::Player { player_id } => Some(*player_id),
            TrickWinner::Rotten => None,
        })
}

fn trick_tally(state: &MatchState) -> Result<HashMap<Team, u8>, DomainError> {
    let mut tally = HashMap::new();
    tally.insert(Team::Team1, 0u8);
    tally.insert(Team::Team2, 0u8);

    for (index, winner) in state.trick_winners.iter().enumerate() {
        let credited = match winner {
            TrickWinner::Player { player_id } => Some(*player_id),
            TrickWinner::Rotten => rotten_attribution(&state.trick_winners, index),
        };
        if let Some(player_id) = credited {
            let team = state.team_of(player_id)?;
            *tally.entry(team).or_insert(0) += 1;
        }
    }
    Ok(tally)
}

/// Score a finished round, apply cannet conversion and clear the round
/// state. Callers check for game end afterwards.
pub fn score_round(state: &mut MatchState) {
    state.phase = Phase::Scoring;

    let tally = match trick_tally(state) {
        Ok(t) => t,
        Err(_) => {
            // Team lookup cannot fail for seated players; if it does,
            // fail closed by awarding nothing this round.
            reset_round_state(state);
            return;
        }
    };
    let team1 = tally.get(&Team::Team1).copied().unwrap_or(0);
    let team2 = tally.get(&Team::Team2).copied().unwrap_or(0);

    if !state.challenge.has_truted {
        // A plain round is worth one cannet; a tie awards nothing.
        if team1 > team2 {
            state.score_mut(Team::Team1).cannets += 1;
        } else if team2 > team1 {
            state.score_mut(Team::Team2).cannets += 1;
        }
    } else if state.challenge.accepted {
        if let Some(truting_player) = state.challenge.truting_player {
            if let Ok(truting_team) = state.team_of(truting_player) {
                let (truting_wins, opp_wins) = match truting_team {
                    Team::Team1 => (team1, team2),
                    Team::Team2 => (team2, team1),
                };
                if truting_wins > opp_wins {
                    state.score_mut(truting_team).truts += 1;
                    state.score_mut(truting_team.opponent()).cannets = 0;
                } else if opp_wins > truting_wins {
                    state.score_mut(truting_team.opponent()).truts += 1;
                    state.score_mut(truting_team).cannets = 0;
                }
            }
        }
    }
    // A folded trut was already scored when the last respondent folded.

    convert_cannets(state);
    reset_round_state(state);
}

/// Three cannets become one trut; the conversion also wipes the
/// opposing team's cannets.
pub fn convert_cannets(state: &mut MatchState) {
    for team in [Team::Team1, Team::Team2] {
        let cannets = state.score(team).cannets;
        if cannets >= CANNETS_PER_TRUT {
            let score = state.score_mut(team);
            score.truts += cannets / CANNETS_PER_TRUT;
            score.cannets = cannets % CANNETS_PER_TRUT;
            state.score_mut(team.opponent()).cannets = 0;
        }
    }
}

pub fn reset_round_state(state: &mut MatchState) {
    state.trick_winners.clear();
    state.current_trick.clear();
    state.completed_tricks.clear();
    state.rotten_tricks.clear();
    state.challenge = ChallengeState::default();
    state.brelan_player = None;
    state.phase = Phase::Playing;
}

/// Set the terminal flags if a team has reached the winning trut count.
/// Returns true when the game is over.
pub fn finalize_if_ended(state: &mut MatchState) -> bool {
    let team1 = state.score(Team::Team1).truts;
    let team2 = state.score(Team::Team2).truts;
    if team1 >= TRUTS_TO_WIN || team2 >= TRUTS_TO_WIN {
        state.game_ended = true;
        state.winner = Some(if team1 >= TRUTS_TO_WIN {
            Team::Team1
        } else {
            Team::Team2
        });
        true
    } else {
        false
    }
}

/// Deal the next round: dealer advances one seat and the seat to the
/// new dealer's left leads. The turn counter keeps climbing across
/// rounds so timer fingerprints from the previous round stay stale.
pub fn start_new_round<R: Rng + ?Sized>(state: &mut MatchState, rng: &mut R) {
    let seat_order = state.seat_order.clone();
    let (hands, deck_rest) = dealing::deal_round(&seat_order, rng);
    state.hands = hands;
    state.deck_rest = deck_rest;

    state.dealer_index = (state.dealer_index + 1) % seat_order.len();
    state.current_player = state.seat_at(state.starter_index());
    state.round_number += 1;
    state.turn_counter += 1;
    state.new_round_started = true;
}

/// Two-seat trut call: the sole opponent is the respondent.
pub fn call_trut_two_seat(
    state: &MatchState,
    player_id: PlayerId,
) -> Result<MatchState, DomainError> {
    let mut next = begin_trut(state, player_id)?;
    let opponent = next
        .seat_order
        .iter()
        .copied()
        .find(|id| *id != player_id)
        .ok_or_else(|| DomainError::internal("two-seat game has no opponent"))?;
    next.challenge.respondent = Some(opponent);
    Ok(next)
}

/// Shared trut-call preamble and validation.
pub fn begin_trut(state: &MatchState, player_id: PlayerId) -> Result<MatchState, DomainError> {
    state.require_not_ended()?;
    if state.phase != Phase::Playing {
        return Err(DomainError::precondition(
            PreconditionKind::GameNotInProgress,
            "trut can only be called during play",
        ));
    }
    if state.challenge.has_truted {
        return Err(DomainError::validation(
            ValidationKind::Other("trut already called".into()),
            "only one trut may be called per round",
        ));
    }
    if state.seat_index(player_id).is_none() {
        return Err(DomainError::precondition(
            PreconditionKind::NotInRoom,
            format!("player {player_id} is not seated in this game"),
        ));
    }

    let mut next = state.clone();
    next.new_round_started = false;
    next.turn_counter += 1;
    next.phase = Phase::Truting;
    next.challenge = ChallengeState {
        has_truted: true,
        truting_player: Some(player_id),
        accepted: false,
        awaiting_response: true,
        respondent: None,
        pending_respondents: Vec::new(),
    };
    Ok(next)
}

/// Validate that `player_id` is the currently prompted respondent.
pub fn require_respondent(state: &MatchState, player_id: PlayerId) -> Result<(), DomainError> {
    if !state.challenge.awaiting_response {
        return Err(DomainError::validation(
            ValidationKind::NoChallengePending,
            "no trut challenge is awaiting a response",
        ));
    }
    if state.challenge.respondent != Some(player_id) {
        return Err(DomainError::validation(
            ValidationKind::NotARespondent,
            format!("player {player_id} is not the prompted respondent"),
        ));
    }
    Ok(())
}

/// Two-seat challenge response. Accepting plays the round out for a
/// trut point; folding hands the caller's team a cannet and always
/// deals a fresh round.
pub fn respond_two_seat<R: Rng + ?Sized>(
    state: &MatchState,
    player_id: PlayerId,
    accept: bool,
    rng: &mut R,
) -> Result<MatchState, DomainError> {
    state.require_not_ended()?;
    require_respondent(state, player_id)?;

    let mut next = state.clone();
    next.new_round_started = false;
    next.turn_counter += 1;
    next.challenge.awaiting_response = false;

    if accept {
        next.challenge.accepted = true;
        next.phase = Phase::Playing;
        return Ok(next);
    }

    next.challenge.accepted = false;
    next.phase = Phase::Scoring;
    award_fold_cannet(&mut next)?;
    if finalize_if_ended(&mut next) {
        return Ok(next);
    }
    reset_round_state(&mut next);
    start_new_round(&mut next, rng);
    Ok(next)
}

/// Credit the truting team's cannet after a fold, with conversion.
pub fn award_fold_cannet(state: &mut MatchState) -> Result<(), DomainError> {
    let truting_player = state
        .challenge
        .truting_player
        .ok_or_else(|| DomainError::internal("fold scored with no truting player recorded"))?;
    let team = state.team_of(truting_player)?;
    state.score_mut(team).cannets += 1;
    convert_cannets(state);
    Ok(())
}

/// Validate a brelan declaration: exactly three cards of one rank, all
/// still in the live hand.
pub fn validate_brelan(
    state: &MatchState,
    player_id: PlayerId,
    card_ids: &[CardId],
) -> Result<(), DomainError> {
    if card_ids.len() != 3 {
        return Err(DomainError::validation(
            ValidationKind::InvalidBrelan,
            "a brelan is exactly three cards",
        ));
    }
    let hand = state.require_hand(player_id)?;
    let mut ranks = Vec::with_capacity(3);
    for card_id in card_ids {
        let card = hand.iter().find(|c| c.id == *card_id).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidBrelan,
                "brelan cards must all be in hand",
            )
        })?;
        ranks.push(card.rank);
    }
    if !ranks.windows(2).all(|w| w[0] == w[1]) {
        return Err(DomainError::validation(
            ValidationKind::InvalidBrelan,
            "brelan cards must share one rank",
        ));
    }
    Ok(())
}
