//! Applies a distribution plan to balances and the ledger header.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::account::AccountId;
use crate::core::calculator::DistributionPlan;
use crate::core::policy::ProtocolPolicy;
use crate::core::state::LedgerStateAccess;
use crate::error::{InflationError, Result};

/// One payout of an inflation run, as returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub destination: AccountId,
    pub amount: i64,
}

pub struct LedgerEffectApplier {
    policy: ProtocolPolicy,
}

impl LedgerEffectApplier {
    pub fn new(policy: ProtocolPolicy) -> Self {
        Self { policy }
    }

    /// Credits every planned share, then updates `total_coins`, `fee_pool` and
    /// `inflation_seq`. Errors leave the transaction partially written; the
    /// caller must not commit it.
    pub fn apply<L: LedgerStateAccess + ?Sized>(
        &self,
        ledger: &mut L,
        plan: &DistributionPlan,
    ) -> Result<Vec<PayoutRecord>> {
        let mut payouts = Vec::with_capacity(plan.shares.len());
        let mut left = plan.pool;

        for share in &plan.shares {
            let account = ledger
                .load_account_mut(&share.destination)
                .ok_or(InflationError::AccountNotFound(share.destination))?;
            account.balance = account.balance.checked_add(share.amount).ok_or_else(|| {
                InflationError::ArithmeticFault(format!(
                    "balance overflow crediting {} to {}",
                    share.amount, share.destination
                ))
            })?;

            left -= share.amount;
            if self.policy.accrues_supply_per_share() {
                let header = ledger.header_mut();
                header.total_coins = checked_supply_add(header.total_coins, share.amount)?;
            }

            debug!(destination = %share.destination, amount = share.amount, "inflation payout");
            payouts.push(PayoutRecord {
                destination: share.destination,
                amount: share.amount,
            });
        }

        let header = ledger.header_mut();
        if self.policy.adds_inflation_after_payouts() {
            header.total_coins = checked_supply_add(header.total_coins, plan.inflation_amount)?;
        }
        header.fee_pool = left;
        header.inflation_seq = header
            .inflation_seq
            .checked_add(1)
            .ok_or_else(|| InflationError::ArithmeticFault("inflation_seq overflow".to_string()))?;

        Ok(payouts)
    }
}

fn checked_supply_add(total_coins: i64, amount: i64) -> Result<i64> {
    total_coins.checked_add(amount).ok_or_else(|| {
        InflationError::ArithmeticFault(format!(
            "total coins overflow: {} + {}",
            total_coins, amount
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account::Account;
    use crate::core::calculator::PlannedShare;
    use crate::core::header::LedgerHeader;
    use crate::core::state::LedgerStore;

    fn id(name: &str) -> AccountId {
        AccountId::from_name(name)
    }

    fn setup() -> LedgerStore {
        let mut header = LedgerHeader::genesis(10, 10_000);
        header.fee_pool = 100;
        LedgerStore::from_genesis(
            header,
            vec![Account::new(id("a"), 5_000), Account::new(id("b"), 4_900)],
        )
        .unwrap()
    }

    fn plan() -> DistributionPlan {
        DistributionPlan {
            inflation_amount: 1,
            pool: 101,
            shares: vec![
                PlannedShare { destination: id("a"), votes: 6_000, raw_share: 60, amount: 60 },
                PlannedShare { destination: id("b"), votes: 3_000, raw_share: 30, amount: 30 },
            ],
        }
    }

    #[test]
    fn test_legacy_accrues_per_share() {
        let store = setup();
        let mut txn = store.open();
        let payouts = LedgerEffectApplier::new(ProtocolPolicy::Legacy)
            .apply(&mut txn, &plan())
            .unwrap();
        assert_eq!(payouts.len(), 2);
        assert_eq!(txn.header().total_coins, 10_090);
        assert_eq!(txn.header().fee_pool, 11);
        assert_eq!(txn.header().inflation_seq, 1);
        assert_eq!(txn.load_account(&id("a")).unwrap().balance, 5_060);
    }

    #[test]
    fn test_supply_once_adds_inflation_amount() {
        let store = setup();
        let mut txn = store.open();
        let payouts = LedgerEffectApplier::new(ProtocolPolicy::SupplyOnce)
            .apply(&mut txn, &plan())
            .unwrap();
        assert_eq!(
            payouts,
            vec![
                PayoutRecord { destination: id("a"), amount: 60 },
                PayoutRecord { destination: id("b"), amount: 30 },
            ]
        );
        assert_eq!(txn.header().total_coins, 10_001);
        assert_eq!(txn.header().fee_pool, 11);
        assert_eq!(txn.snapshot().supply_drift(), 0);
    }

    #[test]
    fn test_balance_overflow_faults() {
        let store = LedgerStore::from_genesis(
            LedgerHeader::genesis(9, i64::MAX),
            vec![Account::new(id("a"), i64::MAX - 10)],
        )
        .unwrap();
        let mut txn = store.open();
        let plan = DistributionPlan {
            inflation_amount: 0,
            pool: 20,
            shares: vec![PlannedShare {
                destination: id("a"),
                votes: 1,
                raw_share: 20,
                amount: 20,
            }],
        };
        let res = LedgerEffectApplier::new(ProtocolPolicy::SupplyOnce).apply(&mut txn, &plan);
        assert!(matches!(res, Err(InflationError::ArithmeticFault(_))));
    }
}
