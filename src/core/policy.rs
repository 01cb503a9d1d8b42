//! Protocol-version policy for the inflation operation.
//!
//! Behaviour changed twice in ledger history. The policy is resolved once per run
//! from the ledger version so each rule set can be audited on its own.
//!
//! | Versions | Policy       | total_coins update           | payout cap       |
//! |----------|--------------|------------------------------|------------------|
//! | 0..=7    | `Legacy`     | += each share, in the loop   | none             |
//! | 8..=9    | `SupplyOnce` | += inflation amount, once    | none             |
//! | 10..     | `Capped`     | += inflation amount, once    | max receivable   |

use serde::Serialize;

/// Last version that accrues total coins per paid share.
pub const LAST_LEGACY_SUPPLY_VERSION: u32 = 7;

/// First version that caps payouts at the destination's receivable limit.
pub const FIRST_CAPPED_VERSION: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProtocolPolicy {
    Legacy,
    SupplyOnce,
    Capped,
}

impl ProtocolPolicy {
    /// Every version from 10 up runs under `Capped`.
    pub fn for_version(ledger_version: u32) -> Self {
        match ledger_version {
            v if v <= LAST_LEGACY_SUPPLY_VERSION => ProtocolPolicy::Legacy,
            v if v < FIRST_CAPPED_VERSION => ProtocolPolicy::SupplyOnce,
            _ => ProtocolPolicy::Capped,
        }
    }

    /// Total coins grow by each share as it is paid.
    pub fn accrues_supply_per_share(self) -> bool {
        self == ProtocolPolicy::Legacy
    }

    /// Total coins grow by the full inflation amount after all payouts.
    pub fn adds_inflation_after_payouts(self) -> bool {
        !self.accrues_supply_per_share()
    }

    pub fn caps_to_max_receivable(self) -> bool {
        self == ProtocolPolicy::Capped
    }

    /// Expected change of `sum(balances) + fee_pool - total_coins` for a run.
    ///
    /// Legacy runs leak `inflation - paid` into the drift; later versions keep it.
    pub fn expected_supply_drift(self, inflation_amount: i64, paid: i64) -> i128 {
        match self {
            ProtocolPolicy::Legacy => inflation_amount as i128 - paid as i128,
            ProtocolPolicy::SupplyOnce | ProtocolPolicy::Capped => 0,
        }
    }
}
