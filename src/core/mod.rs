// Inflation state transition for a replicated ledger.
//
// DETERMINISM GUARANTEES:
// =======================
// 1. Same ledger state + same ledger version + same close time -> same result
// 2. Integer arithmetic only; proportional shares truncate toward zero
// 3. No system time: the close time is an input, never read from the clock
// 4. Hash-map iteration never decides an outcome: ranking uses a total order,
//    sums are order independent, state roots sort by account id
//
// INVARIANTS:
// - total_coins == sum(balances) + fee_pool is kept by every run from ledger
//   version 8 on (see invariants.rs for the legacy accounting)
// - A run either commits in full or leaves no trace

pub mod account;
pub mod arith;
pub mod calculator;
pub mod effects;
pub mod header;
pub mod inflation;
pub mod invariants;
pub mod params;
pub mod policy;
pub mod state;
pub mod tally;
pub mod winners;

use serde::Serialize;
use tracing::error;

use crate::core::effects::PayoutRecord;
use crate::core::header::LedgerHeader;
use crate::core::inflation::{run_inflation, InflationResultCode};
use crate::core::state::{LedgerStateAccess, LedgerStore, StateSnapshot};
use crate::error::{InflationError, Result};

/// Outcome of one admitted-or-rejected inflation operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InflationOutcome {
    pub code: InflationResultCode,
    pub payouts: Vec<PayoutRecord>,
}

impl InflationOutcome {
    pub fn is_success(&self) -> bool {
        self.code == InflationResultCode::Success
    }
}

/// Drives ledger closes and inflation operations against a `LedgerStore`.
#[derive(Debug)]
pub struct Core {
    store: LedgerStore,
}

impl Core {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn header(&self) -> LedgerHeader {
        self.store.header()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.store.snapshot()
    }

    /// Starts the next ledger at `close_time` under `ledger_version`.
    ///
    /// The version may only move forward; close time may not go back.
    pub fn close_ledger(&self, close_time: u64, ledger_version: u32) -> Result<LedgerHeader> {
        let mut txn = self.store.open();
        let header = txn.header_mut();
        if ledger_version < header.ledger_version {
            return Err(InflationError::Ledger(format!(
                "ledger version cannot decrease: {} -> {}",
                header.ledger_version, ledger_version
            )));
        }
        if close_time < header.close_time {
            return Err(InflationError::Ledger(format!(
                "close time cannot go back: {} -> {}",
                header.close_time, close_time
            )));
        }
        header.ledger_seq = header.ledger_seq.saturating_add(1);
        header.ledger_version = ledger_version;
        header.close_time = close_time;
        let closed = header.clone();
        txn.commit();
        Ok(closed)
    }

    /// Applies an inflation operation in the current ledger.
    ///
    /// A `NotTime` rejection is returned as an outcome, not an error. Every other
    /// failure is returned as an error after the transaction is rolled back.
    pub fn apply_inflation(&self) -> Result<InflationOutcome> {
        let mut txn = self.store.open();
        let (version, close_time) = {
            let header = txn.header();
            (header.ledger_version, header.close_time)
        };

        match run_inflation(version, close_time, &mut txn) {
            Ok(payouts) => {
                txn.commit();
                Ok(InflationOutcome {
                    code: InflationResultCode::Success,
                    payouts,
                })
            }
            Err(InflationError::NotTime { .. }) => Ok(InflationOutcome {
                code: InflationResultCode::NotTime,
                payouts: Vec::new(),
            }),
            Err(e) => {
                if e.is_fatal() {
                    error!(error = %e, ledger_version = version, "inflation aborted");
                }
                Err(e)
            }
        }
    }

    /// Closes a ledger at `close_time` and applies inflation in it.
    pub fn close_with_inflation(
        &self,
        close_time: u64,
        ledger_version: u32,
    ) -> Result<InflationOutcome> {
        self.close_ledger(close_time, ledger_version)?;
        self.apply_inflation()
    }
}
