//! Inflation amount and per-winner shares.
//!
//! `inflation = total_coins * 190721 / 1e9` and `pool = inflation + fee_pool`,
//! both from the pre-run header. Each winner's share is
//! `pool * votes / total_coins`, truncated, so the shares can never add up to more
//! than the pool.

use serde::Serialize;
use tracing::debug;

use crate::core::account::AccountId;
use crate::core::arith::{scaled_divide, Rounding};
use crate::core::params::{INFLATION_RATE_DIVISOR, INFLATION_RATE_TRILLIONTHS};
use crate::core::policy::ProtocolPolicy;
use crate::core::state::LedgerStateAccess;
use crate::core::winners::Winner;
use crate::error::{InflationError, Result};

/// One share that will be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedShare {
    pub destination: AccountId,
    pub votes: i64,
    /// Proportional share before any cap.
    pub raw_share: i64,
    /// Amount that will actually be credited.
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionPlan {
    pub inflation_amount: i64,
    /// `inflation_amount + fee_pool` before the run.
    pub pool: i64,
    /// Shares to pay, in winner order.
    pub shares: Vec<PlannedShare>,
}

impl DistributionPlan {
    pub fn total_paid(&self) -> Result<i64> {
        self.shares.iter().try_fold(0i64, |acc, s| {
            acc.checked_add(s.amount).ok_or_else(|| {
                InflationError::ArithmeticFault("payout total overflows".to_string())
            })
        })
    }

    /// Part of the pool that is not paid out and rolls into the next fee pool.
    pub fn leftover(&self) -> Result<i64> {
        Ok(self.pool - self.total_paid()?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InflationCalculator {
    policy: ProtocolPolicy,
}

impl InflationCalculator {
    pub fn new(policy: ProtocolPolicy) -> Self {
        Self { policy }
    }

    pub fn inflation_amount(total_coins: i64) -> Result<i64> {
        scaled_divide(
            total_coins,
            INFLATION_RATE_TRILLIONTHS,
            INFLATION_RATE_DIVISOR,
            Rounding::Down,
        )
    }

    /// Plans the payouts for `winners` against the header of `ledger`.
    ///
    /// Destinations that do not exist are dropped here; their share stays in the
    /// pool. Under the capped policy each share is limited to what the
    /// destination can still receive. Shares of zero are dropped in every
    /// version.
    pub fn plan<L: LedgerStateAccess + ?Sized>(
        &self,
        ledger: &L,
        winners: &[Winner],
    ) -> Result<DistributionPlan> {
        let header = ledger.header();
        let total_coins = header.total_coins;
        let inflation_amount = Self::inflation_amount(total_coins)?;
        let pool = inflation_amount.checked_add(header.fee_pool).ok_or_else(|| {
            InflationError::ArithmeticFault(format!(
                "inflation pool overflows: {} + {}",
                inflation_amount, header.fee_pool
            ))
        })?;

        let mut shares = Vec::with_capacity(winners.len());
        for winner in winners {
            let raw_share = scaled_divide(pool, winner.votes, total_coins, Rounding::Down)?;

            let Some(account) = ledger.load_account(&winner.destination) else {
                debug!(
                    destination = %winner.destination,
                    raw_share,
                    "winner does not exist, share withheld"
                );
                continue;
            };

            let amount = if self.policy.caps_to_max_receivable() {
                raw_share.min(ledger.max_receivable(account))
            } else {
                raw_share
            };

            // a zero share changes no balance and is not reported
            if amount == 0 {
                continue;
            }

            shares.push(PlannedShare {
                destination: winner.destination,
                votes: winner.votes,
                raw_share,
                amount,
            });
        }

        let plan = DistributionPlan { inflation_amount, pool, shares };
        if plan.total_paid()? > pool {
            return Err(InflationError::ArithmeticFault(format!(
                "planned payouts exceed pool {}",
                pool
            )));
        }
        Ok(plan)
    }
}
