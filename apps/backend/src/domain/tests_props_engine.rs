//! Property tests for the shared engine transitions (pure domain).
//!
//! Properties tested:
//! - Every card stays accounted for while a game is driven at random
//! - Cannet tallies never reach the conversion threshold after scoring
//! - A unique strongest card wins its trick and leads the next one
//! - A tied trick is rotten and the first tied seat leads again

use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::cards::{CardId, Rank, Suit};
use crate::domain::dealing::DECK_SIZE;
use crate::domain::engine::core::{evaluate_trick, score_round};
use crate::domain::engine::{OneVOneEngine, TrutEngine, TwoVTwoEngine};
use crate::domain::state::{MatchState, PlayedCard, Team, TrickWinner};
use crate::domain::testutil::{card, room_1v1, room_2v2_preformed};

fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    }
}

fn rank_strategy() -> impl Strategy<Value = Rank> {
    prop::sample::select(Rank::ALL.to_vec())
}

/// All card ids currently tracked by the state: live hands, the open
/// trick, finished tricks and the undealt remainder.
fn tracked_ids(state: &MatchState) -> Vec<CardId> {
    let mut ids = Vec::with_capacity(DECK_SIZE);
    for hand in state.hands.values() {
        ids.extend(hand.iter().map(|c| c.id));
    }
    ids.extend(state.current_trick.iter().map(|e| e.card.id));
    for trick in &state.completed_tricks {
        ids.extend(trick.iter().map(|e| e.card.id));
    }
    ids.extend(state.deck_rest.iter().map(|c| c.id));
    ids
}

fn assert_full_deck(state: &MatchState) {
    let ids = tracked_ids(state);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), DECK_SIZE);
    assert_eq!(unique.len(), DECK_SIZE);
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property: no card is ever created or lost while random legal
    /// plays drive a game forward, across trick ends and redeals.
    #[test]
    fn prop_cards_are_conserved_through_random_play(
        picks in prop::collection::vec(0usize..3, 1..24),
    ) {
        for state in [
            OneVOneEngine.start_game(&room_1v1()).unwrap(),
            TwoVTwoEngine.start_game(&room_2v2_preformed()).unwrap(),
        ] {
            let engine: &dyn TrutEngine = if state.seat_order.len() == 2 {
                &OneVOneEngine
            } else {
                &TwoVTwoEngine
            };
            let mut state = state;
            assert_full_deck(&state);

            for pick in &picks {
                if state.game_ended {
                    break;
                }
                let actor = state.current_player;
                let hand = &state.hands[&actor];
                prop_assert!(!hand.is_empty());
                let card_id = hand[pick % hand.len()].id;
                state = engine.play_card(&state, actor, card_id).unwrap();
                if !state.game_ended {
                    assert_full_deck(&state);
                }
            }
        }
    }

    /// Property: cannets are always left below the conversion threshold
    /// once a round has been scored.
    #[test]
    fn prop_scoring_keeps_cannets_below_threshold(
        winner_picks in prop::collection::vec(0u8..3, 1..4),
        cannets1 in 0u8..3,
        cannets2 in 0u8..3,
    ) {
        let room = room_1v1();
        let mut state = OneVOneEngine.start_game(&room).unwrap();
        state.score_mut(Team::Team1).cannets = cannets1;
        state.score_mut(Team::Team2).cannets = cannets2;
        state.trick_winners = winner_picks
            .iter()
            .map(|pick| match pick {
                0 => TrickWinner::Player { player_id: room.seats[0].id },
                1 => TrickWinner::Player { player_id: room.seats[1].id },
                _ => TrickWinner::Rotten,
            })
            .collect();

        score_round(&mut state);
        prop_assert!(state.score(Team::Team1).cannets < 3);
        prop_assert!(state.score(Team::Team2).cannets < 3);
    }

    /// Property: with two distinct strengths in a trick, the unique
    /// strongest card wins and its player leads next.
    #[test]
    fn prop_unique_strongest_card_wins(
        (rank_a, rank_b) in (rank_strategy(), rank_strategy())
            .prop_filter("distinct strengths", |(a, b)| a.strength() != b.strength()),
    ) {
        let room = room_1v1();
        let mut state = OneVOneEngine.start_game(&room).unwrap();
        let first = room.seats[0].id;
        let second = room.seats[1].id;
        state.current_trick = vec![
            PlayedCard { player_id: first, card: card(Suit::Hearts, rank_a) },
            PlayedCard { player_id: second, card: card(Suit::Spades, rank_b) },
        ];

        evaluate_trick(&mut state);

        let expected = if rank_a.strength() > rank_b.strength() { first } else { second };
        prop_assert_eq!(
            state.trick_winners.last(),
            Some(&TrickWinner::Player { player_id: expected })
        );
        prop_assert_eq!(state.current_player, expected);
        prop_assert!(state.rotten_tricks.is_empty());
    }

    /// Property: a strength tie rots the trick and the first tied seat
    /// in play order leads again.
    #[test]
    fn prop_tied_trick_is_rotten(rank in rank_strategy()) {
        let room = room_1v1();
        let mut state = OneVOneEngine.start_game(&room).unwrap();
        let first = room.seats[1].id;
        let second = room.seats[0].id;
        state.current_trick = vec![
            PlayedCard { player_id: first, card: card(Suit::Hearts, rank) },
            PlayedCard { player_id: second, card: card(Suit::Spades, rank) },
        ];

        evaluate_trick(&mut state);

        prop_assert_eq!(state.trick_winners.last(), Some(&TrickWinner::Rotten));
        prop_assert_eq!(state.rotten_tricks.len(), 1);
        prop_assert_eq!(state.current_player, first);
    }
}
