//! Supply conservation check for inflation runs.
//!
//! # Invariant
//! `total_coins == sum(balances) + fee_pool`. Expressed as a drift,
//! `sum(balances) + fee_pool - total_coins`, which must be zero.
//!
//! Runs under ledger versions 0..=7 are replayed bit-exactly, including the
//! historic accounting where `total_coins` grew by what was paid rather than by
//! the inflation amount. Those runs shift the drift by `inflation - paid`. The
//! check therefore compares the change in drift against what the version policy
//! prescribes: zero from version 8 on, which keeps a conserving ledger conserving.
//!
//! # Determinism
//! Sums are widened to i128 and are independent of iteration order.

use crate::core::policy::ProtocolPolicy;
use crate::core::state::LedgerStateAccess;
use crate::error::{InflationError, Result};

/// `sum(balances) + fee_pool - total_coins` for the current view.
pub fn supply_drift<L: LedgerStateAccess + ?Sized>(ledger: &L) -> i128 {
    let balances: i128 = ledger.existing_accounts().map(|a| a.balance as i128).sum();
    let header = ledger.header();
    balances + header.fee_pool as i128 - header.total_coins as i128
}

/// Verifies that a run moved the drift by exactly the amount its policy allows.
pub fn check_conservation<L: LedgerStateAccess + ?Sized>(
    ledger: &L,
    policy: ProtocolPolicy,
    drift_before: i128,
    inflation_amount: i64,
    paid: i64,
) -> Result<()> {
    let expected_drift = policy.expected_supply_drift(inflation_amount, paid);
    let actual_drift = supply_drift(ledger) - drift_before;
    if actual_drift != expected_drift {
        return Err(InflationError::ConservationViolation {
            expected_drift,
            actual_drift,
        });
    }
    Ok(())
}
