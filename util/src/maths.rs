//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit the magnitude of a value to `limit`, keeping its sign.
///
/// Returns the (possibly limited) value and whether the limit was applied. When
/// `|value| > limit` the result is `(value / |value|) * limit`. A zero value is never limited, so
/// there is no division by zero. NaN values are passed through untouched.
///
/// `limit` is expected to be non-negative.
pub fn saturate<T>(value: T, limit: T) -> (T, bool)
where
    T: Float
{
    let mag = value.abs();

    if mag > limit && mag > T::zero() {
        (value / mag * limit, true)
    }
    else {
        (value, false)
    }
}

/// Convert an angle in degrees into radians.
pub fn deg_to_rad<T>(value: T) -> T
where
    T: Float
{
    value.to_radians()
}

/// Convert an angle in radians into degrees.
pub fn rad_to_deg<T>(value: T) -> T
where
    T: Float
{
    value.to_degrees()
}
