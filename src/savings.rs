//! # Savings Evaluation Module
//!
//! Questo modulo calcola il rapporto di risparmio e decide se tenere o
//! scartare l'output di un encoder.
//!
//! ## Convenzione di segno:
//! Il rapporto è `((input - output) / input) * -1`: un valore negativo
//! significa output più piccolo (guadagno), un valore positivo output più
//! grande (regressione). La soglia `min_savings` confronta il rapporto con
//! segno, quindi con soglia attiva ogni run sotto `min_savings / 100` viene
//! riportato all'originale.

/// Outcome of the threshold check for one encode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the encoder output and write it to the destination.
    Replace(SavingsKind),
    /// Discard the encoder output, the original file stays as is.
    Revert,
}

/// How a replaced result compares to the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsKind {
    /// Output smaller than the input (ratio < 0).
    Gain,
    /// Output equal or larger (ratio >= 0); still saved unless the
    /// threshold rejected it.
    Regression,
}

/// Compute the signed savings ratio for a pair of sizes.
///
/// # Arguments
/// - `input_size`: Size of the original file in bytes
/// - `output_size`: Size of the encoder output in bytes
///
/// # Returns
/// - `f64`: Negative when the output is smaller, positive when larger,
///   `0.0` when unchanged or when the input is empty
pub fn savings_ratio(input_size: u64, output_size: u64) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    ((input_size as f64 - output_size as f64) / input_size as f64) * -1.0
}

/// Apply the accept/revert policy to a pair of sizes.
///
/// `min_savings` is a percentage (0-100); zero disables the threshold and
/// every result is replaced. With a positive threshold the signed ratio is
/// compared against `min_savings / 100` and anything below reverts.
pub fn evaluate(input_size: u64, output_size: u64, min_savings: f64) -> Decision {
    let ratio = savings_ratio(input_size, output_size);

    if min_savings > 0.0 && ratio < min_savings / 100.0 {
        return Decision::Revert;
    }

    if ratio < 0.0 {
        Decision::Replace(SavingsKind::Gain)
    } else {
        Decision::Replace(SavingsKind::Regression)
    }
}

/// Render a savings ratio as a signed percent string.
///
/// Magnitudes above 1% round to whole percents; at or below 1% one decimal
/// place is kept, so small nonzero savings never collapse to "0%".
pub fn format_percent(ratio: f64) -> String {
    // normalize -0.0 so an unchanged file prints without a sign
    let ratio = if ratio == 0.0 { 0.0 } else { ratio };
    let percent = ratio * 100.0;
    if ratio.abs() > 0.01 {
        format!("{:.0}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_sign_convention() {
        // smaller output -> negative ratio
        assert_eq!(savings_ratio(100_000, 60_000), -0.4);
        assert_eq!(savings_ratio(50_000, 49_000), -0.02);
        // larger output -> positive ratio
        assert!(savings_ratio(100, 110) > 0.0);
        // unchanged or empty input -> zero
        assert_eq!(savings_ratio(500, 500), 0.0);
        assert_eq!(savings_ratio(0, 10), 0.0);
    }

    #[test]
    fn test_zero_threshold_always_replaces() {
        assert_eq!(
            evaluate(100_000, 60_000, 0.0),
            Decision::Replace(SavingsKind::Gain)
        );
        assert_eq!(
            evaluate(100, 150, 0.0),
            Decision::Replace(SavingsKind::Regression)
        );
        assert_eq!(
            evaluate(100, 100, 0.0),
            Decision::Replace(SavingsKind::Regression)
        );
    }

    #[test]
    fn test_threshold_reverts_small_gain() {
        // 2% smaller with a 10% threshold reverts
        assert_eq!(evaluate(50_000, 49_000, 10.0), Decision::Revert);
    }

    #[test]
    fn test_threshold_reverts_large_gain_too() {
        // the signed ratio of any size reduction sits below a positive
        // threshold, so this reverts as well
        assert_eq!(evaluate(100_000, 60_000, 10.0), Decision::Revert);
    }

    #[test]
    fn test_threshold_boundary_exact() {
        // ratio == min_savings / 100 exactly: not below, so replace
        let decision = evaluate(100, 110, 10.0);
        assert_eq!(decision, Decision::Replace(SavingsKind::Regression));

        // one byte less of growth drops below the boundary and reverts
        assert_eq!(evaluate(100, 109, 10.0), Decision::Revert);
    }

    #[test]
    fn test_regression_above_threshold_is_replaced() {
        assert_eq!(
            evaluate(100, 150, 10.0),
            Decision::Replace(SavingsKind::Regression)
        );
    }

    #[test]
    fn test_format_percent_whole() {
        assert_eq!(format_percent(-0.4), "-40%");
        assert_eq!(format_percent(0.05), "5%");
        assert_eq!(format_percent(-1.0), "-100%");
    }

    #[test]
    fn test_format_percent_small_keeps_decimal() {
        // magnitude <= 1% keeps one decimal, never "0%"
        assert_eq!(format_percent(-0.005), "-0.5%");
        assert_eq!(format_percent(0.004), "0.4%");
        assert_eq!(format_percent(-0.01), "-1.0%");
        assert_eq!(format_percent(0.01), "1.0%");
    }

    #[test]
    fn test_format_percent_zero() {
        assert_eq!(format_percent(0.0), "0.0%");
        // a computed -0.0 must not print a sign
        assert_eq!(format_percent(savings_ratio(500, 500)), "0.0%");
    }
}
