//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the i64 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i64>(clamped).unwrap_or(if clamped > 0.0 { i64::MAX } else { 0 })
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a length or index into f64.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Map a possibly-negative rounded slot number onto `0..len`.
///
/// Returns 0 for an empty strip or a non-finite slot.
#[must_use]
pub fn wrap_slot_index(slot: f64, len: usize) -> usize {
    if len == 0 || !slot.is_finite() {
        return 0;
    }
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let wrapped = round_f64_to_i64(slot).rem_euclid(len_i);
    usize::try_from(wrapped).unwrap_or(0)
}
