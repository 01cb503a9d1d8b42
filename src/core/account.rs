//! Account identities and account entries.
//!
//! An `AccountId` is a 32-byte public key. Ordering is by raw bytes, which is the
//! tie-break order used when two inflation destinations have equal votes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{InflationError, Result};

/// Length of a public key in bytes.
pub const ACCOUNT_ID_LEN: usize = 32;

/// Public key identifying an account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derives a key from a human-readable name (SHA-256 of the name).
    ///
    /// Used by snapshot files and tests so that accounts can be referred to as
    /// "A1", "voter2", and so on.
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = hex::decode(s)?;
        if raw.len() != ACCOUNT_ID_LEN {
            return Err(InflationError::Config(format!(
                "account id must be {} bytes, got {}",
                ACCOUNT_ID_LEN,
                raw.len()
            )));
        }
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        write!(f, "AccountId({}..)", &self.to_hex()[..8])
    }
}

impl FromStr for AccountId {
    type Err = InflationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AccountId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Account entry as stored in the ledger.
///
/// `inflation_dest` is a plain identifier: the target may not exist, and it is
/// only resolved by lookup at payout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Native balance in the smallest unit.
    pub balance: i64,
    #[serde(default)]
    pub inflation_dest: Option<AccountId>,
    /// Native amount reserved for open buy offers.
    #[serde(default)]
    pub buying_liabilities: i64,
}

impl Account {
    pub fn new(id: AccountId, balance: i64) -> Self {
        Self {
            id,
            balance,
            inflation_dest: None,
            buying_liabilities: 0,
        }
    }

    pub fn with_inflation_dest(mut self, dest: AccountId) -> Self {
        self.inflation_dest = Some(dest);
        self
    }

    pub fn with_buying_liabilities(mut self, liabilities: i64) -> Self {
        self.buying_liabilities = liabilities;
        self
    }

    /// Largest native amount the account can still receive:
    /// `i64::MAX - balance - buying_liabilities`, saturating.
    pub fn available_to_receive(&self) -> i64 {
        i64::MAX
            .saturating_sub(self.balance)
            .saturating_sub(self.buying_liabilities)
            .max(0)
    }
}
