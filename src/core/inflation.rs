//! The inflation operation: tally, select, calculate, apply, verify.
//!
//! Everything runs against one ledger-state transaction supplied by the caller.
//! On `Ok` the caller commits; on `Err` it drops the transaction, so none of the
//! partial effects escape.

use serde::Serialize;
use tracing::{info, warn};

use crate::core::calculator::InflationCalculator;
use crate::core::effects::{LedgerEffectApplier, PayoutRecord};
use crate::core::invariants::{check_conservation, supply_drift};
use crate::core::params::next_inflation_time;
use crate::core::policy::ProtocolPolicy;
use crate::core::state::LedgerStateAccess;
use crate::core::tally::VoteTally;
use crate::core::winners::select_winners;
use crate::error::{InflationError, Result};

/// Operation-level result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InflationResultCode {
    Success,
    NotTime,
}

/// Runs one inflation at `close_time` under `ledger_version`.
///
/// Fails with `NotTime` (nothing touched) unless `close_time` has reached the
/// window for the current `inflation_seq`.
pub fn run_inflation<L: LedgerStateAccess + ?Sized>(
    ledger_version: u32,
    close_time: u64,
    ledger: &mut L,
) -> Result<Vec<PayoutRecord>> {
    let policy = ProtocolPolicy::for_version(ledger_version);

    let seq = ledger.header().inflation_seq;
    let next_window = next_inflation_time(seq);
    if close_time < next_window {
        warn!(close_time, next_window, inflation_seq = seq, "inflation not due");
        return Err(InflationError::NotTime { close_time, next_window });
    }

    let drift_before = supply_drift(ledger);
    let total_coins = ledger.header().total_coins;

    let tally = VoteTally::collect(ledger)?;
    let winners = select_winners(&tally, total_coins);
    let plan = InflationCalculator::new(policy).plan(ledger, &winners)?;
    let payouts = LedgerEffectApplier::new(policy).apply(ledger, &plan)?;

    let paid = plan.total_paid()?;
    check_conservation(ledger, policy, drift_before, plan.inflation_amount, paid)?;

    let header = ledger.header();
    info!(
        inflation_seq = header.inflation_seq,
        ledger_version,
        ?policy,
        winners = winners.len(),
        payouts = payouts.len(),
        inflation_amount = plan.inflation_amount,
        paid,
        fee_pool = header.fee_pool,
        total_coins = header.total_coins,
        "inflation applied"
    );
    Ok(payouts)
}
