use crate::domain::cards::{Rank, Suit};
use crate::domain::dealing::HAND_SIZE;
use crate::domain::engine::{OneVOneEngine, TrutEngine};
use crate::domain::state::{Phase, Team, TrickWinner};
use crate::domain::testutil::{card, give_hand, room_1v1};
use crate::errors::domain::{DomainError, PreconditionKind, ValidationKind};

#[test]
fn start_game_deals_three_cards_and_seats_the_dealers_left() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();

    assert_eq!(state.dealer_index, 0);
    assert_eq!(state.current_player, room.seats[1].id);
    assert_eq!(state.round_number, 1);
    assert_eq!(state.phase, Phase::Playing);
    for seat in &room.seats {
        assert_eq!(state.hands[&seat.id].len(), HAND_SIZE);
    }
}

#[test]
fn start_game_needs_two_players() {
    let mut room = room_1v1();
    room.seats.pop();
    let err = OneVOneEngine.start_game(&room).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Precondition(PreconditionKind::NotEnoughPlayers, _)
    ));
}

#[test]
fn playing_out_of_turn_is_rejected() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let off_turn = room.seats[0].id;
    let card_id = state.hands[&off_turn][0].id;

    let err = OneVOneEngine
        .play_card(&state, off_turn, card_id)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NotYourTurn, _)
    ));
}

#[test]
fn playing_a_card_you_do_not_hold_is_rejected() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let actor = state.current_player;
    let foreign = card(Suit::Hearts, Rank::Seven);

    let err = OneVOneEngine
        .play_card(&state, actor, foreign.id)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::CardNotInHand, _)
    ));
}

#[test]
fn strongest_card_wins_the_trick_and_leads() {
    let room = room_1v1();
    let mut state = OneVOneEngine.start_game(&room).unwrap();
    let leader = room.seats[1].id;
    let follower = room.seats[0].id;

    let seven = card(Suit::Hearts, Rank::Seven);
    let nine = card(Suit::Spades, Rank::Nine);
    give_hand(&mut state, leader, vec![nine.clone(), card(Suit::Clubs, Rank::Ten)]);
    give_hand(&mut state, follower, vec![seven.clone(), card(Suit::Clubs, Rank::Jack)]);

    let state = OneVOneEngine.play_card(&state, leader, nine.id).unwrap();
    assert_eq!(state.current_player, follower);
    let state = OneVOneEngine.play_card(&state, follower, seven.id).unwrap();

    // The seven is the strongest rank in the game.
    assert_eq!(
        state.trick_winners.last(),
        Some(&TrickWinner::Player { player_id: follower })
    );
    assert_eq!(state.current_player, follower);
    assert_eq!(state.completed_tricks.len(), 1);
    assert!(state.current_trick.is_empty());
}

#[test]
fn tied_trick_is_rotten_and_first_max_leads() {
    let room = room_1v1();
    let mut state = OneVOneEngine.start_game(&room).unwrap();
    let leader = room.seats[1].id;
    let follower = room.seats[0].id;

    let king_a = card(Suit::Hearts, Rank::King);
    let king_b = card(Suit::Spades, Rank::King);
    give_hand(&mut state, leader, vec![king_a.clone(), card(Suit::Clubs, Rank::Nine)]);
    give_hand(&mut state, follower, vec![king_b.clone(), card(Suit::Clubs, Rank::Ten)]);

    let state = OneVOneEngine.play_card(&state, leader, king_a.id).unwrap();
    let state = OneVOneEngine.play_card(&state, follower, king_b.id).unwrap();

    assert_eq!(state.trick_winners.last(), Some(&TrickWinner::Rotten));
    assert_eq!(state.rotten_tricks.len(), 1);
    // Who rots, un-rots: the first seat at max strength leads again.
    assert_eq!(state.current_player, leader);
}

#[test]
fn emptied_hands_score_the_round_and_redeal() {
    let room = room_1v1();
    let mut state = OneVOneEngine.start_game(&room).unwrap();
    let leader = room.seats[1].id;
    let follower = room.seats[0].id;

    let seven = card(Suit::Hearts, Rank::Seven);
    let nine = card(Suit::Spades, Rank::Nine);
    give_hand(&mut state, leader, vec![seven.clone()]);
    give_hand(&mut state, follower, vec![nine.clone()]);

    let state = OneVOneEngine.play_card(&state, leader, seven.id).unwrap();
    let state = OneVOneEngine.play_card(&state, follower, nine.id).unwrap();

    // Leader (team2, seat 1) took the only trick of the round.
    assert_eq!(state.score(Team::Team2).cannets, 1);
    assert_eq!(state.score(Team::Team1).cannets, 0);
    assert!(state.new_round_started);
    assert_eq!(state.round_number, 2);
    assert_eq!(state.dealer_index, 1);
    // New dealer is seat 1, so seat 0 leads the new round.
    assert_eq!(state.current_player, follower);
    for hand in state.hands.values() {
        assert_eq!(hand.len(), HAND_SIZE);
    }
    assert!(state.trick_winners.is_empty());
}

#[test]
fn trut_call_prompts_the_sole_opponent() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;
    let opponent = room.seats[0].id;

    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    assert_eq!(state.phase, Phase::Truting);
    assert!(state.challenge.has_truted);
    assert!(state.challenge.awaiting_response);
    assert_eq!(state.challenge.truting_player, Some(caller));
    assert_eq!(state.challenge.respondent, Some(opponent));
}

#[test]
fn second_trut_in_a_round_is_rejected() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;

    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    let err = OneVOneEngine.call_trut(&state, caller).unwrap_err();
    assert!(matches!(err, DomainError::Precondition(_, _) | DomainError::Validation(_, _)));
}

#[test]
fn cards_cannot_be_played_while_a_challenge_is_pending() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;
    let card_id = state.hands[&caller][0].id;

    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    let err = OneVOneEngine.play_card(&state, caller, card_id).unwrap_err();
    assert!(matches!(err, DomainError::Precondition(_, _)));
}

#[test]
fn folding_awards_the_caller_a_cannet_and_redeals() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;
    let opponent = room.seats[0].id;

    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    let state = OneVOneEngine
        .respond_to_challenge(&state, opponent, false)
        .unwrap();

    // Caller is seat 1 = team2.
    assert_eq!(state.score(Team::Team2).cannets, 1);
    assert_eq!(state.phase, Phase::Playing);
    assert!(!state.challenge.has_truted);
    assert_eq!(state.round_number, 2);
    for hand in state.hands.values() {
        assert_eq!(hand.len(), HAND_SIZE);
    }
}

#[test]
fn accepting_keeps_the_round_live_with_no_score_change() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;
    let opponent = room.seats[0].id;

    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    let state = OneVOneEngine
        .respond_to_challenge(&state, opponent, true)
        .unwrap();

    assert_eq!(state.phase, Phase::Playing);
    assert!(state.challenge.accepted);
    assert!(!state.challenge.awaiting_response);
    assert_eq!(state.score(Team::Team1).cannets, 0);
    assert_eq!(state.score(Team::Team2).cannets, 0);
    assert_eq!(state.round_number, 1);
}

#[test]
fn challenge_steps_each_advance_the_turn_counter() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;
    let opponent = room.seats[0].id;
    let before = state.turn_counter;

    // Timers key their staleness checks off the counter, so a call and
    // its answer must each land on a fresh value.
    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    assert_eq!(state.turn_counter, before + 1);
    let accepted = OneVOneEngine
        .respond_to_challenge(&state, opponent, true)
        .unwrap();
    assert_eq!(accepted.turn_counter, before + 2);

    let folded = OneVOneEngine
        .respond_to_challenge(&state, opponent, false)
        .unwrap();
    assert!(folded.turn_counter > state.turn_counter);
}

#[test]
fn only_the_prompted_respondent_may_answer() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let caller = room.seats[1].id;

    let state = OneVOneEngine.call_trut(&state, caller).unwrap();
    let err = OneVOneEngine
        .respond_to_challenge(&state, caller, true)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NotARespondent, _)
    ));
}

#[test]
fn responding_without_a_challenge_is_rejected() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let err = OneVOneEngine
        .respond_to_challenge(&state, room.seats[0].id, true)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NoChallengePending, _)
    ));
}

#[test]
fn ended_games_reject_every_action() {
    let room = room_1v1();
    let mut state = OneVOneEngine.start_game(&room).unwrap();
    state.game_ended = true;
    state.winner = Some(Team::Team1);
    let actor = state.current_player;
    let card_id = state.hands[&actor][0].id;

    for result in [
        OneVOneEngine.play_card(&state, actor, card_id),
        OneVOneEngine.call_trut(&state, actor),
        OneVOneEngine.respond_to_challenge(&state, actor, true),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Precondition(PreconditionKind::GameAlreadyEnded, _)
        ));
    }
}

#[test]
fn fortial_is_not_available_in_1v1() {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    let err = OneVOneEngine
        .start_fortial(&state, room.seats[0].id)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::FortialNotAvailable, _)
    ));
}
