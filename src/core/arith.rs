//! Overflow-safe scaled division `(a * b) / c` for non-negative i64 operands.
//!
//! The product is formed in u128, which holds any product of two i64 values, so
//! the only failure modes are a zero divisor, a negative operand, or a quotient
//! that does not fit back into i64. All three are arithmetic faults: the
//! inflation invariants make them unreachable, so hitting one means the ledger
//! state is already inconsistent.

use crate::error::{InflationError, Result};

/// Rounding applied to the quotient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round toward zero (truncate). Used for every inflation share.
    Down,
    /// Round away from zero.
    Up,
}

/// Computes `(a * b) / c` with the requested rounding.
///
/// ```
/// use ledger_inflation::core::arith::{scaled_divide, Rounding};
///
/// assert_eq!(scaled_divide(10, 3, 4, Rounding::Down).unwrap(), 7);
/// assert_eq!(scaled_divide(10, 3, 4, Rounding::Up).unwrap(), 8);
/// assert_eq!(scaled_divide(i64::MAX, i64::MAX, i64::MAX, Rounding::Down).unwrap(), i64::MAX);
/// ```
pub fn scaled_divide(a: i64, b: i64, c: i64, rounding: Rounding) -> Result<i64> {
    if a < 0 || b < 0 {
        return Err(InflationError::ArithmeticFault(format!(
            "negative operand in scaled divide: {} * {}",
            a, b
        )));
    }
    if c <= 0 {
        return Err(InflationError::ArithmeticFault(format!(
            "non-positive divisor in scaled divide: {}",
            c
        )));
    }

    let product = a as u128 * b as u128;
    let divisor = c as u128;
    let mut quotient = product / divisor;
    if rounding == Rounding::Up && product % divisor != 0 {
        quotient += 1;
    }

    i64::try_from(quotient).map_err(|_| {
        InflationError::ArithmeticFault(format!(
            "scaled divide result overflows i64: {} * {} / {}",
            a, b, c
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(scaled_divide(7, 1, 2, Rounding::Down).unwrap(), 3);
        assert_eq!(scaled_divide(1, 1, 3, Rounding::Down).unwrap(), 0);
        assert_eq!(scaled_divide(0, 999, 7, Rounding::Down).unwrap(), 0);
    }

    #[test]
    fn test_round_up_only_on_remainder() {
        assert_eq!(scaled_divide(6, 1, 2, Rounding::Up).unwrap(), 3);
        assert_eq!(scaled_divide(7, 1, 2, Rounding::Up).unwrap(), 4);
    }

    #[test]
    fn test_no_intermediate_overflow() {
        // 1e18 * 190721 overflows i64 but not u128.
        let total = 1_000_000_000_000_000_000i64;
        assert_eq!(
            scaled_divide(total, 190_721, 1_000_000_000, Rounding::Down).unwrap(),
            190_721_000_000_000
        );
        assert_eq!(
            scaled_divide(i64::MAX, i64::MAX - 1, i64::MAX, Rounding::Down).unwrap(),
            i64::MAX - 1
        );
    }

    #[test]
    fn test_faults() {
        assert!(matches!(
            scaled_divide(1, 1, 0, Rounding::Down),
            Err(InflationError::ArithmeticFault(_))
        ));
        assert!(matches!(
            scaled_divide(-1, 1, 1, Rounding::Down),
            Err(InflationError::ArithmeticFault(_))
        ));
        assert!(matches!(
            scaled_divide(i64::MAX, 2, 1, Rounding::Down),
            Err(InflationError::ArithmeticFault(_))
        ));
    }
}
