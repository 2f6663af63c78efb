use crate::domain::engine::core::{
    convert_cannets, finalize_if_ended, rotten_attribution, score_round,
};
use crate::domain::engine::{OneVOneEngine, TrutEngine};
use crate::domain::state::{MatchState, Phase, PlayerId, Team, TrickWinner};
use crate::domain::testutil::room_1v1;

fn started_1v1() -> (MatchState, PlayerId, PlayerId) {
    let room = room_1v1();
    let state = OneVOneEngine.start_game(&room).unwrap();
    // Seat 0 is team1, seat 1 is team2.
    (state, room.seats[0].id, room.seats[1].id)
}

fn won(player_id: PlayerId) -> TrickWinner {
    TrickWinner::Player { player_id }
}

#[test]
fn rotten_trick_goes_to_the_next_clean_winner() {
    let (_, ana, bob) = started_1v1();
    let winners = vec![TrickWinner::Rotten, won(bob), won(ana)];
    assert_eq!(rotten_attribution(&winners, 0), Some(bob));
}

#[test]
fn rotten_trick_falls_back_to_the_nearest_prior_winner() {
    let (_, ana, bob) = started_1v1();
    let winners = vec![won(bob), won(ana), TrickWinner::Rotten];
    assert_eq!(rotten_attribution(&winners, 2), Some(ana));
}

#[test]
fn an_all_rotten_round_credits_nobody() {
    let winners = vec![TrickWinner::Rotten, TrickWinner::Rotten, TrickWinner::Rotten];
    assert_eq!(rotten_attribution(&winners, 1), None);
}

#[test]
fn plain_round_win_is_one_cannet() {
    let (mut state, ana, bob) = started_1v1();
    state.trick_winners = vec![won(ana), won(bob), won(ana)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team1).cannets, 1);
    assert_eq!(state.score(Team::Team2).cannets, 0);
    assert_eq!(state.score(Team::Team1).truts, 0);
    assert_eq!(state.phase, Phase::Playing);
    assert!(state.trick_winners.is_empty());
}

#[test]
fn plain_round_tie_awards_nothing() {
    let (mut state, ana, bob) = started_1v1();
    state.trick_winners = vec![won(ana), won(bob)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team1).cannets, 0);
    assert_eq!(state.score(Team::Team2).cannets, 0);
}

#[test]
fn rotten_tricks_are_attributed_when_the_round_is_scored() {
    let (mut state, _ana, bob) = started_1v1();
    // The rotten first trick follows the clean second one, so team2
    // takes the round two tricks to none.
    state.trick_winners = vec![TrickWinner::Rotten, won(bob)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team2).cannets, 1);
    assert_eq!(state.score(Team::Team1).cannets, 0);
}

#[test]
fn third_cannet_converts_into_a_trut_and_wipes_the_opponent() {
    let (mut state, ana, _bob) = started_1v1();
    state.score_mut(Team::Team1).cannets = 2;
    state.score_mut(Team::Team2).cannets = 2;
    state.trick_winners = vec![won(ana), won(ana)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team1).truts, 1);
    assert_eq!(state.score(Team::Team1).cannets, 0);
    assert_eq!(state.score(Team::Team2).cannets, 0);
}

#[test]
fn conversion_keeps_the_remainder() {
    let (mut state, _, _) = started_1v1();
    state.score_mut(Team::Team1).cannets = 4;
    state.score_mut(Team::Team2).cannets = 1;
    convert_cannets(&mut state);

    assert_eq!(state.score(Team::Team1).truts, 1);
    assert_eq!(state.score(Team::Team1).cannets, 1);
    assert_eq!(state.score(Team::Team2).cannets, 0);
}

#[test]
fn conversion_leaves_small_tallies_alone() {
    let (mut state, _, _) = started_1v1();
    state.score_mut(Team::Team1).cannets = 2;
    state.score_mut(Team::Team2).cannets = 1;
    convert_cannets(&mut state);

    assert_eq!(state.score(Team::Team1).truts, 0);
    assert_eq!(state.score(Team::Team1).cannets, 2);
    assert_eq!(state.score(Team::Team2).cannets, 1);
}

#[test]
fn winning_an_accepted_trut_scores_a_trut_and_zeroes_the_loser() {
    let (mut state, ana, _bob) = started_1v1();
    state.challenge.has_truted = true;
    state.challenge.accepted = true;
    state.challenge.truting_player = Some(ana);
    state.score_mut(Team::Team2).cannets = 2;
    state.trick_winners = vec![won(ana), won(ana)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team1).truts, 1);
    assert_eq!(state.score(Team::Team2).truts, 0);
    assert_eq!(state.score(Team::Team2).cannets, 0);
}

#[test]
fn losing_an_accepted_trut_rewards_the_defender() {
    let (mut state, ana, bob) = started_1v1();
    state.challenge.has_truted = true;
    state.challenge.accepted = true;
    state.challenge.truting_player = Some(ana);
    state.score_mut(Team::Team1).cannets = 2;
    state.trick_winners = vec![won(bob), won(bob)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team2).truts, 1);
    assert_eq!(state.score(Team::Team1).truts, 0);
    assert_eq!(state.score(Team::Team1).cannets, 0);
}

#[test]
fn tied_accepted_trut_changes_nothing() {
    let (mut state, ana, bob) = started_1v1();
    state.challenge.has_truted = true;
    state.challenge.accepted = true;
    state.challenge.truting_player = Some(ana);
    state.score_mut(Team::Team1).cannets = 1;
    state.trick_winners = vec![won(ana), won(bob)];
    score_round(&mut state);

    assert_eq!(state.score(Team::Team1).truts, 0);
    assert_eq!(state.score(Team::Team2).truts, 0);
    assert_eq!(state.score(Team::Team1).cannets, 1);
}

#[test]
fn seven_truts_end_the_game() {
    let (mut state, _, _) = started_1v1();
    state.score_mut(Team::Team2).truts = 7;
    assert!(finalize_if_ended(&mut state));
    assert!(state.game_ended);
    assert_eq!(state.winner, Some(Team::Team2));
}

#[test]
fn six_truts_do_not() {
    let (mut state, _, _) = started_1v1();
    state.score_mut(Team::Team1).truts = 6;
    assert!(!finalize_if_ended(&mut state));
    assert!(!state.game_ended);
    assert_eq!(state.winner, None);
}
