//! Consensus constants for the inflation operation. These are part of the
//! replicated state machine and must never be made runtime-configurable.

/// Weekly inflation rate numerator: 0.000190721 ≈ 1% per year compounded weekly.
pub const INFLATION_RATE_TRILLIONTHS: i64 = 190_721;

/// Denominator for `INFLATION_RATE_TRILLIONTHS`.
pub const INFLATION_RATE_DIVISOR: i64 = 1_000_000_000;

/// Eligibility threshold numerator: 5 basis points of total coins (0.05%).
pub const INFLATION_WIN_MIN_PERCENT: i64 = 5;

/// Denominator for `INFLATION_WIN_MIN_PERCENT`.
pub const INFLATION_WIN_MIN_DIVISOR: i64 = 10_000;

/// Maximum number of ranked destinations considered per run.
pub const INFLATION_NUM_WINNERS: usize = 2000;

/// First admissible close time: 2014-07-01T00:00:00Z.
pub const INFLATION_START_TIME: u64 = 1_404_172_800;

/// Length of one inflation window in seconds (one week).
pub const INFLATION_FREQUENCY: u64 = 7 * 24 * 60 * 60;

/// Latest ledger protocol version that changed the inflation rules. Later
/// versions apply the same rules.
pub const CURRENT_LEDGER_PROTOCOL_VERSION: u32 = 10;

/// Minimum accumulated votes a destination needs to win, from pre-run total coins.
///
/// ```
/// use ledger_inflation::core::params::min_winning_votes;
///
/// assert_eq!(min_winning_votes(10_000), 5);
/// assert_eq!(min_winning_votes(1_999), 0);
/// ```
pub fn min_winning_votes(total_coins: i64) -> i64 {
    // total_coins * 5 overflows i64 above i64::MAX / 5.
    ((total_coins as i128 * INFLATION_WIN_MIN_PERCENT as i128)
        / INFLATION_WIN_MIN_DIVISOR as i128) as i64
}

/// Earliest close time at which the run with sequence `inflation_seq` may execute.
pub fn next_inflation_time(inflation_seq: u64) -> u64 {
    INFLATION_START_TIME.saturating_add(inflation_seq.saturating_mul(INFLATION_FREQUENCY))
}
