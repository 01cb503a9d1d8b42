//! Winner selection.
//!
//! Candidates are ranked by votes descending, ties by destination id descending
//! (byte order). Only the first `INFLATION_NUM_WINNERS` ranks are looked at, and
//! within those only candidates reaching the 5 basis point threshold win. The rank
//! cut comes before the threshold filter: a destination ranked below the cut never
//! wins, even if it would be eligible.

use serde::Serialize;

use crate::core::account::AccountId;
use crate::core::params::{min_winning_votes, INFLATION_NUM_WINNERS};
use crate::core::tally::{VoteTally, VoteTallyEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Winner {
    pub destination: AccountId,
    pub votes: i64,
}

/// Ranks every tallied destination. The order is total, so it is reproducible.
pub fn rank_candidates(tally: &VoteTally) -> Vec<VoteTallyEntry> {
    let mut ranked: Vec<VoteTallyEntry> = tally.entries().collect();
    ranked.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| b.destination.cmp(&a.destination))
    });
    ranked
}

/// Selects winners using the protocol rank cap.
pub fn select_winners(tally: &VoteTally, total_coins: i64) -> Vec<Winner> {
    select_winners_with_cap(tally, total_coins, INFLATION_NUM_WINNERS)
}

pub fn select_winners_with_cap(
    tally: &VoteTally,
    total_coins: i64,
    max_winners: usize,
) -> Vec<Winner> {
    let min_votes = min_winning_votes(total_coins);
    rank_candidates(tally)
        .into_iter()
        .take(max_winners)
        .filter(|c| c.votes >= min_votes)
        .map(|c| Winner { destination: c.destination, votes: c.votes })
        .collect()
}
