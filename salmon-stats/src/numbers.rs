//! Numeric conversion helpers centralizing the lossy casts used by formatters.

use num_traits::cast::cast;

/// Convert a count to f64, allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Truncate a f64 toward zero and clamp it to the i32 range, returning 0 for
/// non-finite values.
#[must_use]
pub fn trunc_f64_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).trunc();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Whole-valued f64 as i64, or `None` for fractional, non-finite or
/// out-of-range values.
#[must_use]
pub fn integral_f64_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    cast::<f64, i64>(value)
}

/// Share of `part` in `whole`, or `None` when `whole` is zero.
#[must_use]
pub fn ratio(part: u32, whole: u32) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(f64::from(part) / f64::from(whole))
}

/// Saturating sum of counts.
#[must_use]
pub fn sum<I: IntoIterator<Item = u32>>(counts: I) -> u32 {
    counts
        .into_iter()
        .fold(0_u32, |acc, n| acc.saturating_add(n))
}
