use std::collections::HashSet;

use crate::domain::cards::{Rank, Suit};
use crate::domain::dealing::HAND_SIZE;
use crate::domain::engine::{TrutEngine, TwoVTwoEngine};
use crate::domain::state::{Phase, Team, TeamMode};
use crate::domain::testutil::{card, give_hand, room_2v2_preformed, room_2v2_solo};
use crate::errors::domain::{DomainError, ValidationKind};

#[test]
fn solo_rooms_get_alternating_shuffled_teams() {
    let room = room_2v2_solo();
    assert_eq!(room.team_mode, Some(TeamMode::Solo));
    let state = TwoVTwoEngine.start_game(&room).unwrap();

    let teams: Vec<Team> = state
        .seat_order
        .iter()
        .map(|id| state.teams[id])
        .collect();
    assert_eq!(teams[0], teams[2]);
    assert_eq!(teams[1], teams[3]);
    assert_ne!(teams[0], teams[1]);

    let team1_count = teams.iter().filter(|t| **t == Team::Team1).count();
    assert_eq!(team1_count, 2);

    let seated: HashSet<_> = state.seat_order.iter().collect();
    assert_eq!(seated.len(), 4);
}

#[test]
fn preformed_rooms_keep_their_teams() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    for seat in &room.seats {
        assert_eq!(state.teams.get(&seat.id), seat.team.as_ref());
    }
    assert_eq!(state.seat_order, room.seat_order());
}

#[test]
fn turn_rotates_clockwise_through_all_four_seats() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    // Dealer is seat 0, so seat 1 leads.
    assert_eq!(state.current_player, room.seats[1].id);

    let actor = state.current_player;
    let card_id = state.hands[&actor][0].id;
    let state = TwoVTwoEngine.play_card(&state, actor, card_id).unwrap();
    assert_eq!(state.current_player, room.seats[2].id);
    assert_eq!(state.current_trick.len(), 1);
}

#[test]
fn trut_polls_opponents_clockwise_from_the_dealers_left() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;
    let bob = room.seats[1].id;
    let dana = room.seats[3].id;

    let state = TwoVTwoEngine.call_trut(&state, ana).unwrap();
    assert_eq!(state.phase, Phase::Truting);
    assert_eq!(state.challenge.respondent, Some(bob));
    assert_eq!(state.challenge.pending_respondents, vec![dana]);
}

#[test]
fn partial_fold_advances_then_accept_binds_the_team() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;
    let bob = room.seats[1].id;
    let dana = room.seats[3].id;

    let state = TwoVTwoEngine.call_trut(&state, ana).unwrap();
    let counter_at_call = state.turn_counter;
    let state = TwoVTwoEngine
        .respond_to_challenge(&state, bob, false)
        .unwrap();

    // One fold only moves the pointer; no score yet. The counter still
    // moves, so a timer armed for the first respondent goes stale.
    assert_eq!(state.phase, Phase::Truting);
    assert_eq!(state.challenge.respondent, Some(dana));
    assert_eq!(state.score(Team::Team1).cannets, 0);
    assert!(state.turn_counter > counter_at_call);

    let state = TwoVTwoEngine
        .respond_to_challenge(&state, dana, true)
        .unwrap();
    assert!(state.challenge.accepted);
    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.score(Team::Team1).cannets, 0);
    assert_eq!(state.score(Team::Team2).cannets, 0);
}

#[test]
fn out_of_order_respondent_is_rejected() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;
    let dana = room.seats[3].id;

    let state = TwoVTwoEngine.call_trut(&state, ana).unwrap();
    let err = TwoVTwoEngine
        .respond_to_challenge(&state, dana, false)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NotARespondent, _)
    ));
}

#[test]
fn all_folds_award_the_cannet_and_keep_live_hands() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;
    let bob = room.seats[1].id;
    let dana = room.seats[3].id;

    let state = TwoVTwoEngine.call_trut(&state, ana).unwrap();
    let state = TwoVTwoEngine
        .respond_to_challenge(&state, bob, false)
        .unwrap();
    let state = TwoVTwoEngine
        .respond_to_challenge(&state, dana, false)
        .unwrap();

    assert_eq!(state.score(Team::Team1).cannets, 1);
    assert_eq!(state.phase, Phase::Playing);
    assert!(!state.challenge.has_truted);
    // Hands were untouched, so the round continues without a redeal.
    assert!(!state.new_round_started);
    assert_eq!(state.round_number, 1);
    for hand in state.hands.values() {
        assert_eq!(hand.len(), HAND_SIZE);
    }
}

#[test]
fn all_folds_with_empty_hands_redeal() {
    let room = room_2v2_preformed();
    let mut state = TwoVTwoEngine.start_game(&room).unwrap();
    for seat in &room.seats {
        give_hand(&mut state, seat.id, Vec::new());
    }
    let ana = room.seats[0].id;
    let bob = room.seats[1].id;
    let dana = room.seats[3].id;

    let state = TwoVTwoEngine.call_trut(&state, ana).unwrap();
    let state = TwoVTwoEngine
        .respond_to_challenge(&state, bob, false)
        .unwrap();
    let state = TwoVTwoEngine
        .respond_to_challenge(&state, dana, false)
        .unwrap();

    assert!(state.new_round_started);
    assert_eq!(state.round_number, 2);
    for hand in state.hands.values() {
        assert_eq!(hand.len(), HAND_SIZE);
    }
}

#[test]
fn brelan_of_three_matching_ranks_triggers_a_trut() {
    let room = room_2v2_preformed();
    let mut state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;
    let bob = room.seats[1].id;

    let kings = vec![
        card(Suit::Hearts, Rank::King),
        card(Suit::Spades, Rank::King),
        card(Suit::Clubs, Rank::King),
    ];
    let ids: Vec<_> = kings.iter().map(|c| c.id).collect();
    give_hand(&mut state, ana, kings);

    let state = TwoVTwoEngine.call_brelan(&state, ana, &ids).unwrap();
    assert!(state.challenge.has_truted);
    assert_eq!(state.brelan_player, Some(ana));
    assert_eq!(state.challenge.respondent, Some(bob));
}

#[test]
fn brelan_with_mixed_ranks_is_rejected() {
    let room = room_2v2_preformed();
    let mut state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;

    let cards = vec![
        card(Suit::Hearts, Rank::King),
        card(Suit::Spades, Rank::King),
        card(Suit::Clubs, Rank::Queen),
    ];
    let ids: Vec<_> = cards.iter().map(|c| c.id).collect();
    give_hand(&mut state, ana, cards);

    let err = TwoVTwoEngine.call_brelan(&state, ana, &ids).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidBrelan, _)
    ));
}

#[test]
fn brelan_must_reference_cards_still_in_hand() {
    let room = room_2v2_preformed();
    let state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;

    let foreign: Vec<_> = (0..3).map(|_| card(Suit::Hearts, Rank::Ace).id).collect();
    let err = TwoVTwoEngine.call_brelan(&state, ana, &foreign).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidBrelan, _)
    ));

    let two = &foreign[..2];
    let err = TwoVTwoEngine.call_brelan(&state, ana, two).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidBrelan, _)
    ));
}

#[test]
fn fortial_picks_the_first_team_seat_left_of_the_dealer() {
    let room = room_2v2_preformed();
    let mut state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;
    let carl = room.seats[2].id;

    state.score_mut(Team::Team1).truts = 6;
    state.score_mut(Team::Team1).cannets = 2;

    // Team1 seats are 0 and 2; scanning from seat 1 reaches seat 2 first.
    let state = TwoVTwoEngine.start_fortial(&state, ana).unwrap();
    assert!(state.fortial_active);
    assert_eq!(state.fortial_player, Some(carl));
    assert_eq!(state.current_player, carl);
}

#[test]
fn fortial_needs_six_truts_and_two_cannets() {
    let room = room_2v2_preformed();
    let mut state = TwoVTwoEngine.start_game(&room).unwrap();
    let ana = room.seats[0].id;

    state.score_mut(Team::Team1).truts = 6;
    state.score_mut(Team::Team1).cannets = 1;
    let err = TwoVTwoEngine.start_fortial(&state, ana).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::FortialNotAvailable, _)
    ));
}
