//! JSON ledger snapshot files used by the CLI and by tests.
//!
//! ```json
//! {
//!   "header": { "ledger_version": 10, "close_time": 1404172800,
//!               "total_coins": 10000, "fee_pool": 0 },
//!   "accounts": [
//!     { "account": "A", "balance": 6000, "inflation_dest": "A" },
//!     { "account": "B", "balance": 4000 }
//!   ]
//! }
//! ```
//!
//! An account reference is either a 64-char hex public key or a name, in which
//! case the key is derived from the name (`AccountId::from_name`).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::account::{Account, AccountId, ACCOUNT_ID_LEN};
use crate::core::header::LedgerHeader;
use crate::core::state::{LedgerStore, StateSnapshot};
use crate::error::{InflationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub account: String,
    pub balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_dest: Option<String>,
    #[serde(default)]
    pub buying_liabilities: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshotFile {
    pub header: LedgerHeader,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// Resolves a hex key or a name to an account id.
pub fn resolve_account_ref(reference: &str) -> AccountId {
    if reference.len() == ACCOUNT_ID_LEN * 2 {
        if let Ok(id) = AccountId::from_hex(reference) {
            return id;
        }
    }
    AccountId::from_name(reference)
}

impl LedgerSnapshotFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref()).map_err(|e| {
            InflationError::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: LedgerSnapshotFile = serde_json::from_str(raw)?;
        file.validate()?;
        Ok(file)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.header.total_coins < 0 || self.header.fee_pool < 0 {
            return Err(InflationError::Config(
                "total_coins and fee_pool must be non-negative".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for acc in &self.accounts {
            if acc.balance < 0 || acc.buying_liabilities < 0 {
                return Err(InflationError::Config(format!(
                    "account {} has a negative amount",
                    acc.account
                )));
            }
            if !seen.insert(resolve_account_ref(&acc.account)) {
                return Err(InflationError::Config(format!(
                    "duplicate account {}",
                    acc.account
                )));
            }
        }
        Ok(())
    }

    pub fn to_accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|c| Account {
                id: resolve_account_ref(&c.account),
                balance: c.balance,
                inflation_dest: c.inflation_dest.as_deref().map(resolve_account_ref),
                buying_liabilities: c.buying_liabilities,
            })
            .collect()
    }

    pub fn into_store(self) -> Result<LedgerStore> {
        let accounts = self.to_accounts();
        LedgerStore::from_genesis(self.header, accounts)
    }

    /// Serializable form of a snapshot. Accounts are written with hex keys.
    pub fn from_snapshot(snapshot: &StateSnapshot) -> Self {
        let accounts = snapshot
            .get_all_accounts()
            .into_iter()
            .map(|a| AccountConfig {
                account: a.id.to_hex(),
                balance: a.balance,
                inflation_dest: a.inflation_dest.map(|d| d.to_hex()),
                buying_liabilities: a.buying_liabilities,
            })
            .collect();
        Self {
            header: snapshot.header().clone(),
            accounts,
        }
    }
}
