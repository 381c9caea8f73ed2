//! Percentage helpers shared by every aggregator.

/// `numerator / denominator × 100`, clamped to `[0, 100]`.
/// A zero denominator yields `0.0`.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    clamp_percent(numerator as f64 / denominator as f64 * 100.0)
}

/// Clamp to `[0, 100]`; NaN becomes `0.0`.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Round to two decimal places, as published in the indicator table.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
