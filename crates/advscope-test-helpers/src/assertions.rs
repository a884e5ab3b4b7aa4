//! Assertion macros for timings.

/// Assert that two floating-point values are within `tolerance` of each other.
///
/// ```rust
/// use advscope_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(30.0_f64, 30.02, 0.05);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`: {}",
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    };
}

/// Assert that every value of a collection is within `tolerance` of `expected`.
///
/// ```rust
/// use advscope_test_helpers::assert_all_near;
///
/// assert_all_near!(&[20.0_f64, 20.01, 19.99], 20.0, 0.05);
/// ```
#[macro_export]
macro_rules! assert_all_near {
    ($collection:expr, $expected:expr, $tolerance:expr $(,)?) => {
        let expected = $expected;
        let tolerance = $tolerance;
        for (i, value) in $collection.iter().enumerate() {
            let diff = (*value - expected).abs();
            if diff > tolerance {
                panic!(
                    "assertion failed: value {} at index {} is {} away from {} (tolerance {})",
                    value, i, diff, expected, tolerance
                );
            }
        }
    };
}

/// Assert that a collection never decreases.
///
/// ```rust
/// use advscope_test_helpers::assert_sorted;
///
/// assert_sorted!(&[0.0_f64, 1.28, 1.28, 6.28]);
/// ```
#[macro_export]
macro_rules! assert_sorted {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev > curr {
                    panic!(
                        "assertion failed: collection is not sorted\n  first unsorted pair at index {}: {:?} > {:?}",
                        i, prev, curr
                    );
                }
                prev = curr;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_passes() {
        assert_approx_eq!(3.75_f64, 3.74, 0.02);
        assert_approx_eq!(100.0_f64, 100.0, 0.0, "interval {}", "B");
    }

    #[test]
    #[should_panic(expected = "assertion failed: `(left ≈ right)`")]
    fn test_approx_eq_fails() {
        assert_approx_eq!(30.0_f64, 33.0, 2.88);
    }

    #[test]
    #[should_panic(expected = "at index 2")]
    fn test_all_near_fails() {
        assert_all_near!(&[20.0_f64, 20.0, 25.0], 20.0, 2.0);
    }

    #[test]
    #[should_panic(expected = "collection is not sorted")]
    fn test_sorted_fails() {
        assert_sorted!(&[1.0_f64, 0.5]);
    }
}
