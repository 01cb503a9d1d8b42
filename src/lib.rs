pub mod config;
pub mod core;
pub mod error;

pub use error::{InflationError, Result};

// Core API exports
pub use config::{resolve_account_ref, AccountConfig, LedgerSnapshotFile};
pub use crate::core::account::{Account, AccountId, ACCOUNT_ID_LEN};
pub use crate::core::arith::{scaled_divide, Rounding};
pub use crate::core::calculator::{DistributionPlan, InflationCalculator, PlannedShare};
pub use crate::core::effects::{LedgerEffectApplier, PayoutRecord};
pub use crate::core::header::LedgerHeader;
pub use crate::core::inflation::{run_inflation, InflationResultCode};
pub use crate::core::invariants::{check_conservation, supply_drift};
pub use crate::core::params::{
    min_winning_votes,
    next_inflation_time,
    CURRENT_LEDGER_PROTOCOL_VERSION,
    INFLATION_FREQUENCY,
    INFLATION_NUM_WINNERS,
    INFLATION_RATE_DIVISOR,
    INFLATION_RATE_TRILLIONTHS,
    INFLATION_START_TIME,
    INFLATION_WIN_MIN_DIVISOR,
    INFLATION_WIN_MIN_PERCENT,
};
pub use crate::core::policy::{ProtocolPolicy, FIRST_CAPPED_VERSION, LAST_LEGACY_SUPPLY_VERSION};
pub use crate::core::state::{LedgerStateAccess, LedgerStore, LedgerTxn, StateSnapshot};
pub use crate::core::tally::{VoteTally, VoteTallyEntry};
pub use crate::core::winners::{rank_candidates, select_winners, select_winners_with_cap, Winner};
pub use crate::core::{Core, InflationOutcome};
