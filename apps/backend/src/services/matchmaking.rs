//! Mode-segmented matchmaking queues.
//!
//! Bot requests match instantly and never queue. Solo 2v2 requests and
//! pre-formed team requests wait in separate queues: solo players match
//! in fours, or partially once the oldest has waited past the fill
//! timeout; teams match as soon as two complete pairs exist. Matching
//! pops happen under the owning queue's lock, so a request can never
//! be claimed by two matches.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::state::{BotProfile, GameMode, PlayerId};

#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Resolved identity for stake deduction, when authenticated.
    pub email: Option<String>,
    pub mode: GameMode,
    pub enqueued_at: Instant,
    pub stake_amount: i64,
    /// Set for pre-formed team play; pairs are grouped by the sorted
    /// {player, teammate} id pair.
    pub teammate_id: Option<PlayerId>,
    pub bot_profile: Option<BotProfile>,
}

impl MatchRequest {
    pub fn solo(
        player_id: PlayerId,
        display_name: impl Into<String>,
        mode: GameMode,
        stake_amount: i64,
    ) -> Self {
        Self {
            player_id,
            display_name: display_name.into(),
            email: None,
            mode,
            enqueued_at: Instant::now(),
            stake_amount,
            teammate_id: None,
            bot_profile: None,
        }
    }

    fn team_key(&self) -> Option<(PlayerId, PlayerId)> {
        let teammate = self.teammate_id?;
        let mut pair = [self.player_id, teammate];
        pair.sort();
        Some((pair[0], pair[1]))
    }
}

#[derive(Debug, Clone)]
pub enum MatchGroup {
    /// A single player to seat against a synthesized bot.
    Bot(MatchRequest),
    /// Solo-queued 2v2 players; fewer than four means the room starts
    /// under-seated and the caller fills the gaps with bots.
    Solo(Vec<MatchRequest>),
    /// Two complete pre-formed pairs.
    Teams {
        team1: Vec<MatchRequest>,
        team2: Vec<MatchRequest>,
    },
}

pub struct MatchmakingQueue {
    solo: Mutex<Vec<MatchRequest>>,
    teams: Mutex<Vec<MatchRequest>>,
    fill_timeout: Duration,
}

impl MatchmakingQueue {
    pub fn new(fill_timeout: Duration) -> Self {
        Self {
            solo: Mutex::new(Vec::new()),
            teams: Mutex::new(Vec::new()),
            fill_timeout,
        }
    }

    /// Add a request. Any stale entry for the same player is purged
    /// from both queues first, so re-enqueueing is idempotent. Bot
    /// requests never queue; they match on the spot.
    pub fn enqueue(&self, request: MatchRequest) -> Option<MatchGroup> {
        if request.mode == GameMode::BotOneVsOne {
            self.cancel(request.player_id);
            debug!(player_id = %request.player_id, "bot match request served immediately");
            return Some(MatchGroup::Bot(request));
        }

        if request.teammate_id.is_some() {
            self.solo.lock().retain(|r| r.player_id != request.player_id);
            let mut teams = self.teams.lock();
            teams.retain(|r| r.player_id != request.player_id);
            teams.push(request);
            Self::try_match_teams(&mut teams)
        } else {
            self.teams.lock().retain(|r| r.player_id != request.player_id);
            let mut solo = self.solo.lock();
            solo.retain(|r| r.player_id != request.player_id);
            solo.push(request);
            Self::try_match_solo(&mut solo)
        }
    }

    pub fn cancel(&self, player_id: PlayerId) -> bool {
        let from_solo = {
            let mut solo = self.solo.lock();
            let before = solo.len();
            solo.retain(|r| r.player_id != player_id);
            solo.len() != before
        };
        let from_teams = {
            let mut teams = self.teams.lock();
            let before = teams.len();
            teams.retain(|r| r.player_id != player_id);
            teams.len() != before
        };
        from_solo || from_teams
    }

    /// Periodic pass that also honors the partial-fill timeout. Returns
    /// every group that could be formed this sweep.
    pub fn sweep(&self) -> Vec<MatchGroup> {
        let mut groups = Vec::new();
        {
            let mut solo = self.solo.lock();
            while let Some(group) = Self::try_match_solo(&mut solo) {
                groups.push(group);
            }
            if let Some(group) = Self::try_timeout_match(&mut solo, self.fill_timeout) {
                groups.push(group);
            }
        }
        {
            let mut teams = self.teams.lock();
            while let Some(group) = Self::try_match_teams(&mut teams) {
                groups.push(group);
            }
        }
        groups
    }

    pub fn depth(&self) -> usize {
        self.solo.lock().len() + self.teams.lock().len()
    }

    /// A full solo table: the four oldest requests, in arrival order.
    fn try_match_solo(queue: &mut Vec<MatchRequest>) -> Option<MatchGroup> {
        if queue.len() < 4 {
            return None;
        }
        let picked: Vec<MatchRequest> = queue.drain(..4).collect();
        info!(players = picked.len(), "matched full 2v2 solo group");
        Some(MatchGroup::Solo(picked))
    }

    fn try_match_teams(queue: &mut Vec<MatchRequest>) -> Option<MatchGroup> {
        let mut complete_pairs: Vec<((PlayerId, PlayerId), Vec<usize>)> = Vec::new();
        for (index, request) in queue.iter().enumerate() {
            let Some(key) = request.team_key() else {
                continue;
            };
            match complete_pairs.iter_mut().find(|(k, _)| *k == key) {
                Some((_, indices)) => indices.push(index),
                None => complete_pairs.push((key, vec![index])),
            }
        }
        complete_pairs.retain(|(_, indices)| indices.len() >= 2);
        if complete_pairs.len() < 2 {
            return None;
        }

        let mut indices: Vec<usize> = Vec::new();
        indices.extend(&complete_pairs[0].1[..2]);
        indices.extend(&complete_pairs[1].1[..2]);
        indices.sort_unstable();
        let mut picked = take_indices(queue, &indices);
        let first_key = complete_pairs[0].0;
        let team1: Vec<MatchRequest> = picked
            .iter()
            .filter(|r| r.team_key() == Some(first_key))
            .cloned()
            .collect();
        picked.retain(|r| r.team_key() != Some(first_key));
        info!("matched two pre-formed 2v2 teams");
        Some(MatchGroup::Teams {
            team1,
            team2: picked,
        })
    }

    /// The oldest solo request, once past the fill timeout, takes
    /// whoever else is present even if the table stays under-seated.
    fn try_timeout_match(
        queue: &mut Vec<MatchRequest>,
        fill_timeout: Duration,
    ) -> Option<MatchGroup> {
        let now = Instant::now();
        let oldest_expired = queue
            .iter()
            .map(|r| r.enqueued_at)
            .min()
            .is_some_and(|oldest| now.duration_since(oldest) >= fill_timeout);
        if !oldest_expired {
            return None;
        }

        let take = queue.len().min(4);
        let picked: Vec<MatchRequest> = queue.drain(..take).collect();
        info!(players = picked.len(), "matched under-seated 2v2 group after timeout");
        Some(MatchGroup::Solo(picked))
    }
}

/// Remove the given ascending indices from the queue, preserving the
/// order of the removed requests.
fn take_indices(queue: &mut Vec<MatchRequest>, indices: &[usize]) -> Vec<MatchRequest> {
    let mut picked = Vec::with_capacity(indices.len());
    for (removed, &index) in indices.iter().enumerate() {
        picked.push(queue.remove(index - removed));
    }
    picked
}
