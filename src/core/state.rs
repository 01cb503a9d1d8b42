//! Ledger state: accounts and the ledger header, with transactional access.
//!
//! # Transactions
//! `LedgerStore::open` returns a `LedgerTxn` that holds the store's write lock
//! and stages all changes on a copy-on-write view (`Arc::make_mut`, so accounts
//! are only cloned on the first write). `commit` publishes the staged view;
//! dropping the transaction without committing discards it. No partial state is
//! ever visible outside the transaction.
//!
//! # Determinism
//! Account maps are hashed, so anything that observes iteration order (state
//! roots, listings) sorts by `AccountId` first.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use sha2::{Digest, Sha256};

use crate::core::account::{Account, AccountId};
use crate::core::header::LedgerHeader;
use crate::error::{InflationError, Result};

/// Read/write access to one ledger-state transaction.
///
/// The inflation operation is written against this trait only.
pub trait LedgerStateAccess {
    fn header(&self) -> &LedgerHeader;

    fn header_mut(&mut self) -> &mut LedgerHeader;

    /// One-shot iteration over every account that exists in this transaction.
    fn existing_accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_>;

    fn load_account(&self, id: &AccountId) -> Option<&Account>;

    fn load_account_mut(&mut self, id: &AccountId) -> Option<&mut Account>;

    /// Largest native amount `account` can still receive.
    fn max_receivable(&self, account: &Account) -> i64 {
        account.available_to_receive()
    }
}

#[derive(Debug, Clone)]
struct LedgerData {
    accounts: Arc<HashMap<AccountId, Account>>,
    header: LedgerHeader,
}

/// Immutable view of the ledger at one point in time. Creation is O(1): the
/// account map is shared with the store until the store next writes.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    accounts: Arc<HashMap<AccountId, Account>>,
    header: LedgerHeader,
}

impl StateSnapshot {
    pub fn header(&self) -> &LedgerHeader {
        &self.header
    }

    pub fn get_account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Balance of an existing account. Absent accounts have no balance.
    pub fn get_balance(&self, id: &AccountId) -> Option<i64> {
        self.accounts.get(id).map(|a| a.balance)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// All accounts, sorted by id.
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let mut v: Vec<Account> = self.accounts.values().cloned().collect();
        v.sort_by(|a, b| a.id.cmp(&b.id));
        v
    }

    /// Sum of all balances, widened so it cannot overflow.
    pub fn total_balances(&self) -> i128 {
        self.accounts.values().map(|a| a.balance as i128).sum()
    }

    /// `sum(balances) + fee_pool - total_coins`. Zero when the supply invariant holds.
    pub fn supply_drift(&self) -> i128 {
        self.total_balances() + self.header.fee_pool as i128 - self.header.total_coins as i128
    }

    /// SHA-256 over the header and sorted accounts, hex encoded.
    pub fn state_root(&self) -> String {
        let mut hasher = Sha256::new();
        self.header.hash_into(&mut hasher);
        for acc in self.get_all_accounts() {
            hasher.update(acc.id.as_bytes());
            hasher.update(acc.balance.to_le_bytes());
            hasher.update(acc.buying_liabilities.to_le_bytes());
            match acc.inflation_dest {
                Some(dest) => {
                    hasher.update([1u8]);
                    hasher.update(dest.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
        hex::encode(hasher.finalize())
    }
}

impl PartialEq for StateSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && *self.accounts == *other.accounts
    }
}

impl Eq for StateSnapshot {}

/// Root ledger state.
#[derive(Debug)]
pub struct LedgerStore {
    data: RwLock<LedgerData>,
}

impl LedgerStore {
    pub fn new(header: LedgerHeader) -> Self {
        Self {
            data: RwLock::new(LedgerData {
                accounts: Arc::new(HashMap::new()),
                header,
            }),
        }
    }

    /// Builds a store from a header and an initial account set.
    pub fn from_genesis(header: LedgerHeader, accounts: Vec<Account>) -> Result<Self> {
        let store = Self::new(header);
        {
            let mut txn = store.open();
            for acc in accounts {
                txn.create_account(acc)?;
            }
            txn.commit();
        }
        Ok(store)
    }

    /// Opens a transaction. Holds the write lock until committed or dropped, so
    /// calling `snapshot` or `open` on the same store meanwhile would block.
    pub fn open(&self) -> LedgerTxn<'_> {
        let guard = self.data.write();
        let staged = (*guard).clone();
        LedgerTxn { guard, staged }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let data = self.data.read();
        StateSnapshot {
            accounts: Arc::clone(&data.accounts),
            header: data.header.clone(),
        }
    }

    pub fn header(&self) -> LedgerHeader {
        self.data.read().header.clone()
    }

    /// Replaces the current state with `snapshot`. The snapshot is not modified.
    pub fn restore(&self, snapshot: &StateSnapshot) {
        let mut data = self.data.write();
        data.accounts = Arc::clone(&snapshot.accounts);
        data.header = snapshot.header.clone();
    }
}

/// A staged ledger-state transaction. See the module docs.
#[derive(Debug)]
pub struct LedgerTxn<'a> {
    guard: RwLockWriteGuard<'a, LedgerData>,
    staged: LedgerData,
}

impl<'a> LedgerTxn<'a> {
    pub fn commit(self) {
        let LedgerTxn { mut guard, staged } = self;
        *guard = staged;
    }

    /// Discards staged changes. Equivalent to dropping the transaction.
    pub fn rollback(self) {}

    pub fn create_account(&mut self, account: Account) -> Result<()> {
        if account.balance < 0 {
            return Err(InflationError::Ledger(format!(
                "negative balance {} for {}",
                account.balance, account.id
            )));
        }
        let accounts = Arc::make_mut(&mut self.staged.accounts);
        if accounts.contains_key(&account.id) {
            return Err(InflationError::Ledger(format!(
                "account already exists: {}",
                account.id
            )));
        }
        accounts.insert(account.id, account);
        Ok(())
    }

    pub fn remove_account(&mut self, id: &AccountId) -> Result<Account> {
        Arc::make_mut(&mut self.staged.accounts)
            .remove(id)
            .ok_or(InflationError::AccountNotFound(*id))
    }

    pub fn set_inflation_dest(&mut self, id: &AccountId, dest: Option<AccountId>) -> Result<()> {
        let account = self
            .load_account_mut(id)
            .ok_or(InflationError::AccountNotFound(*id))?;
        account.inflation_dest = dest;
        Ok(())
    }

    /// Read view of the staged state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            accounts: Arc::clone(&self.staged.accounts),
            header: self.staged.header.clone(),
        }
    }
}

impl<'a> LedgerStateAccess for LedgerTxn<'a> {
    fn header(&self) -> &LedgerHeader {
        &self.staged.header
    }

    fn header_mut(&mut self) -> &mut LedgerHeader {
        &mut self.staged.header
    }

    fn existing_accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_> {
        Box::new(self.staged.accounts.values())
    }

    fn load_account(&self, id: &AccountId) -> Option<&Account> {
        self.staged.accounts.get(id)
    }

    fn load_account_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        if !self.staged.accounts.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.staged.accounts).get_mut(id)
    }
}
