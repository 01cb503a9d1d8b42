//! Ledger header fields touched by the inflation operation.

use serde::{Deserialize, Serialize};

/// Ledger header. `total_coins`, `fee_pool` and `inflation_seq` are consensus
/// fields with fixed widths (i64, i64, u64).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    #[serde(default)]
    pub ledger_seq: u32,
    pub ledger_version: u32,
    /// Close time in unix seconds.
    pub close_time: u64,
    /// Total native supply.
    pub total_coins: i64,
    /// Collected fees not yet redistributed.
    pub fee_pool: i64,
    /// Number of successful inflation runs.
    #[serde(default)]
    pub inflation_seq: u64,
}

impl LedgerHeader {
    pub fn genesis(ledger_version: u32, total_coins: i64) -> Self {
        Self {
            ledger_seq: 1,
            ledger_version,
            close_time: 0,
            total_coins,
            fee_pool: 0,
            inflation_seq: 0,
        }
    }

    pub(crate) fn hash_into(&self, hasher: &mut sha2::Sha256) {
        use sha2::Digest;
        hasher.update(self.ledger_seq.to_le_bytes());
        hasher.update(self.ledger_version.to_le_bytes());
        hasher.update(self.close_time.to_le_bytes());
        hasher.update(self.total_coins.to_le_bytes());
        hasher.update(self.fee_pool.to_le_bytes());
        hasher.update(self.inflation_seq.to_le_bytes());
    }
}
