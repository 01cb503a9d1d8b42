//! Vote tally: sums balances by declared inflation destination.

use std::collections::HashMap;

use tracing::debug;

use crate::core::account::AccountId;
use crate::core::state::LedgerStateAccess;
use crate::error::{InflationError, Result};

/// Accumulated votes for one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTallyEntry {
    pub destination: AccountId,
    pub votes: i64,
}

/// Unordered mapping destination -> accumulated votes, rebuilt every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTally {
    votes: HashMap<AccountId, i64>,
}

impl VoteTally {
    /// Scans every existing account once. Destinations do not need to exist.
    pub fn collect<L: LedgerStateAccess + ?Sized>(ledger: &L) -> Result<Self> {
        let mut tally = VoteTally::default();
        let mut voters = 0usize;
        for account in ledger.existing_accounts() {
            if account.balance < 0 {
                continue;
            }
            if let Some(dest) = account.inflation_dest {
                tally.add(dest, account.balance)?;
                voters += 1;
            }
        }
        debug!(voters, destinations = tally.len(), "inflation votes tallied");
        Ok(tally)
    }

    pub fn add(&mut self, destination: AccountId, balance: i64) -> Result<()> {
        let slot = self.votes.entry(destination).or_insert(0);
        *slot = slot.checked_add(balance).ok_or_else(|| {
            InflationError::ArithmeticFault(format!("vote total overflows for {}", destination))
        })?;
        Ok(())
    }

    pub fn votes_for(&self, destination: &AccountId) -> Option<i64> {
        self.votes.get(destination).copied()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Entries in arbitrary order; callers that need an order must sort.
    pub fn entries(&self) -> impl Iterator<Item = VoteTallyEntry> + '_ {
        self.votes
            .iter()
            .map(|(destination, votes)| VoteTallyEntry { destination: *destination, votes: *votes })
    }
}
