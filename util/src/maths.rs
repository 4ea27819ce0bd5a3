//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the closed range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Return `1` for strictly positive values and `-1` otherwise.
///
/// Unlike `f64::signum` zero maps to `-1`.
pub fn sign_pos<T>(value: T) -> T
where
    T: Float,
{
    if value > T::zero() {
        T::one()
    } else {
        -T::one()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &-1f64, &1f64), 1.0);
        assert_eq!(clamp(&-1.5f64, &-1f64, &1f64), -1.0);
        assert_eq!(clamp(&0.3f64, &-1f64, &1f64), 0.3);
    }

    #[test]
    fn test_sign_pos() {
        assert_eq!(sign_pos(3.0f64), 1.0);
        assert_eq!(sign_pos(-0.1f64), -1.0);
        assert_eq!(sign_pos(0.0f64), -1.0);
    }
}
