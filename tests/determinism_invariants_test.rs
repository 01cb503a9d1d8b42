use std::cell::Cell;

use ledger_inflation::*;
use proptest::prelude::*;

fn id(name: &str) -> AccountId {
    AccountId::from_name(name)
}

fn build_core(
    version: u32,
    balances: &[i64],
    votes: &[Option<usize>],
    fee_pool: i64,
    liabilities: &[i64],
) -> Core {
    let mut accounts = Vec::new();
    for (i, bal) in balances.iter().enumerate() {
        let mut acc = Account::new(id(&format!("acc{}", i)), *bal)
            .with_buying_liabilities(liabilities.get(i).copied().unwrap_or(0));
        if let Some(Some(dest)) = votes.get(i) {
            // destinations past the account range do not exist
            acc = acc.with_inflation_dest(id(&format!("acc{}", dest)));
        }
        accounts.push(acc);
    }
    let total: i64 = balances.iter().sum::<i64>() + fee_pool;
    let mut header = LedgerHeader::genesis(version, total);
    header.fee_pool = fee_pool;
    Core::new(LedgerStore::from_genesis(header, accounts).unwrap())
}

#[test]
fn test_repeated_runs_produce_identical_state_roots() {
    let balances = [40_000_000_000i64, 25_000_000_000, 9_000_000_000, 1, 777_777_777];
    let votes = [Some(1), Some(0), Some(1), Some(4), Some(9)];

    let roots: Vec<String> = (0..3)
        .map(|_| {
            let core = build_core(10, &balances, &votes, 12_345, &[]);
            core.close_with_inflation(INFLATION_START_TIME, 10).unwrap();
            core.close_with_inflation(INFLATION_START_TIME + INFLATION_FREQUENCY, 10).unwrap();
            core.snapshot().state_root()
        })
        .collect();
    assert_eq!(roots[0], roots[1]);
    assert_eq!(roots[1], roots[2]);
}

#[test]
fn test_replay_from_restored_snapshot() {
    let core = build_core(9, &[5_000_000_000, 3_000_000_000], &[Some(0), Some(0)], 0, &[]);
    let genesis = core.snapshot();

    let first = core.close_with_inflation(INFLATION_START_TIME, 9).unwrap();
    let root = core.snapshot().state_root();

    core.store().restore(&genesis);
    let replay = core.close_with_inflation(INFLATION_START_TIME, 9).unwrap();
    assert_eq!(first, replay);
    assert_eq!(core.snapshot().state_root(), root);
}

#[test]
fn test_winner_order_is_stable_under_insertion_order() {
    let mut forward = VoteTally::default();
    let mut backward = VoteTally::default();
    let entries: Vec<(AccountId, i64)> = (0..64)
        .map(|i| (id(&format!("d{}", i)), (i % 5) as i64 * 100))
        .collect();
    for (d, v) in &entries {
        forward.add(*d, *v).unwrap();
    }
    for (d, v) in entries.iter().rev() {
        backward.add(*d, *v).unwrap();
    }
    assert_eq!(select_winners(&forward, 1_000), select_winners(&backward, 1_000));
    assert_eq!(rank_candidates(&forward), rank_candidates(&backward));
}

/// Accessor whose account iteration loses an account once payouts start,
/// as a store with a broken index would.
struct LossyLedger<'a, 'b> {
    inner: &'a mut LedgerTxn<'b>,
    hidden: AccountId,
    hiding: Cell<bool>,
}

impl<'a, 'b> LedgerStateAccess for LossyLedger<'a, 'b> {
    fn header(&self) -> &LedgerHeader {
        self.inner.header()
    }

    fn header_mut(&mut self) -> &mut LedgerHeader {
        self.inner.header_mut()
    }

    fn existing_accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_> {
        let hidden = self.hidden;
        let hiding = self.hiding.get();
        Box::new(
            self.inner
                .existing_accounts()
                .filter(move |a| !(hiding && a.id == hidden)),
        )
    }

    fn load_account(&self, id: &AccountId) -> Option<&Account> {
        self.inner.load_account(id)
    }

    fn load_account_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.hiding.set(true);
        self.inner.load_account_mut(id)
    }
}

#[test]
fn test_conservation_violation_aborts_without_commit() {
    let core = build_core(10, &[6_000_000_000, 4_000_000_000], &[Some(0), None], 0, &[]);
    let before = core.snapshot();

    let err = {
        let mut txn = core.store().open();
        let mut lossy = LossyLedger {
            inner: &mut txn,
            hidden: id("acc1"),
            hiding: Cell::new(false),
        };
        run_inflation(10, INFLATION_START_TIME, &mut lossy).unwrap_err()
    };

    assert!(matches!(err, InflationError::ConservationViolation { .. }));
    assert!(err.is_fatal());
    assert_eq!(core.snapshot(), before);
    assert_eq!(core.header().inflation_seq, 0);
}

#[test]
fn test_not_time_does_not_touch_sequence() {
    let core = build_core(3, &[1_000_000_000], &[Some(0)], 0, &[]);
    core.close_with_inflation(INFLATION_START_TIME, 3).unwrap();
    let before = core.snapshot();
    for offset in [1, 3_600, INFLATION_FREQUENCY - 1] {
        let outcome = core.close_with_inflation(INFLATION_START_TIME + offset, 3).unwrap();
        assert_eq!(outcome.code, InflationResultCode::NotTime);
    }
    assert_eq!(core.header().inflation_seq, 1);
    assert_eq!(core.header().total_coins, before.header().total_coins);
    assert_eq!(core.header().fee_pool, before.header().fee_pool);
}

fn ledger_strategy() -> impl Strategy<Value = (Vec<i64>, Vec<Option<usize>>, Vec<i64>, i64)> {
    (1usize..24).prop_flat_map(|n| {
        (
            prop::collection::vec(1i64..=50_000_000_000, n),
            prop::collection::vec(prop::option::of(0usize..(n + 3)), n),
            prop::collection::vec(prop_oneof![Just(0i64), Just(i64::MAX - 50_000_001_000)], n),
            0i64..=10_000_000_000,
        )
    })
}

proptest! {
    #[test]
    fn conservation_holds_from_version_8(
        (balances, votes, liabilities, fee_pool) in ledger_strategy(),
        version in 8u32..=CURRENT_LEDGER_PROTOCOL_VERSION + 4,
    ) {
        let core = build_core(version, &balances, &votes, fee_pool, &liabilities);
        prop_assert_eq!(core.snapshot().supply_drift(), 0);
        let outcome = core.close_with_inflation(INFLATION_START_TIME, version).unwrap();
        prop_assert!(outcome.is_success());
        prop_assert_eq!(core.snapshot().supply_drift(), 0);
    }

    #[test]
    fn legacy_drift_matches_unpaid_inflation(
        (balances, votes, _liabilities, fee_pool) in ledger_strategy(),
        version in 0u32..=7,
    ) {
        let core = build_core(version, &balances, &votes, fee_pool, &[]);
        let total = core.header().total_coins;
        let outcome = core.close_with_inflation(INFLATION_START_TIME, version).unwrap();
        let paid: i64 = outcome.payouts.iter().map(|p| p.amount).sum();
        let inflation = InflationCalculator::inflation_amount(total).unwrap();
        prop_assert_eq!(core.header().total_coins, total + paid);
        prop_assert_eq!(core.snapshot().supply_drift(), inflation as i128 - paid as i128);
    }

    #[test]
    fn payouts_never_exceed_pool(
        (balances, votes, liabilities, fee_pool) in ledger_strategy(),
        version in 0u32..=CURRENT_LEDGER_PROTOCOL_VERSION,
    ) {
        let core = build_core(version, &balances, &votes, fee_pool, &liabilities);
        let total = core.header().total_coins;
        let outcome = core.close_with_inflation(INFLATION_START_TIME, version).unwrap();
        let paid: i64 = outcome.payouts.iter().map(|p| p.amount).sum();
        let pool = InflationCalculator::inflation_amount(total).unwrap() + fee_pool;
        prop_assert!(paid <= pool);
        prop_assert!(outcome.payouts.iter().all(|p| p.amount > 0));
        prop_assert_eq!(core.header().fee_pool, pool - paid);
        prop_assert_eq!(core.header().inflation_seq, 1);
    }

    #[test]
    fn cap_applies_only_from_version_10(
        (balances, votes, liabilities, fee_pool) in ledger_strategy(),
        version in 0u32..=CURRENT_LEDGER_PROTOCOL_VERSION,
    ) {
        let core = build_core(version, &balances, &votes, fee_pool, &liabilities);
        let before = core.snapshot();
        let total = before.header().total_coins;
        let outcome = core.close_with_inflation(INFLATION_START_TIME, version).unwrap();
        let pool = InflationCalculator::inflation_amount(total).unwrap() + fee_pool;
        // recompute votes from the pre-run state
        let replay =
            LedgerStore::from_genesis(before.header().clone(), before.get_all_accounts()).unwrap();
        let tally = VoteTally::collect(&replay.open()).unwrap();
        for payout in &outcome.payouts {
            let account = before.get_account(&payout.destination).unwrap();
            let votes = tally.votes_for(&payout.destination).unwrap();
            let raw = scaled_divide(pool, votes, total, Rounding::Down).unwrap();
            if version >= FIRST_CAPPED_VERSION {
                prop_assert!(payout.amount <= account.available_to_receive());
                prop_assert_eq!(payout.amount, raw.min(account.available_to_receive()));
            } else {
                prop_assert_eq!(payout.amount, raw);
            }
        }
    }

    #[test]
    fn runs_are_deterministic(
        (balances, votes, liabilities, fee_pool) in ledger_strategy(),
        version in 0u32..=CURRENT_LEDGER_PROTOCOL_VERSION,
    ) {
        let a = build_core(version, &balances, &votes, fee_pool, &liabilities);
        let b = build_core(version, &balances, &votes, fee_pool, &liabilities);
        let ra = a.close_with_inflation(INFLATION_START_TIME, version).unwrap();
        let rb = b.close_with_inflation(INFLATION_START_TIME, version).unwrap();
        prop_assert_eq!(ra, rb);
        prop_assert_eq!(a.snapshot().state_root(), b.snapshot().state_root());
    }
}
