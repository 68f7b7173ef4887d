//! Small-sample corrected Akaike information criterion

/// `AICc = 2k - 2 LL + (2k^2 + 2k) / (n - k - 1)`.
///
/// Returns `+inf` when `n - k - 1 <= 0`, where the correction is undefined.
pub fn aicc(log_likelihood: f64, k: usize, n: usize) -> f64 {
    if n <= k + 1 {
        return f64::INFINITY;
    }
    let k_f = k as f64;
    let aic = 2.0 * k_f - 2.0 * log_likelihood;
    aic + (2.0 * k_f * k_f + 2.0 * k_f) / (n - k - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_known_value() {
        // k = 2, n = 10: 4 - 2LL + 12/7
        assert_relative_eq!(aicc(-5.0, 2, 10), 4.0 + 10.0 + 12.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary() {
        assert!(aicc(-1.0, 2, 3).is_infinite());
        assert!(aicc(-1.0, 2, 4).is_finite());
    }

    proptest! {
        #[test]
        fn prop_infinite_when_undefined(ll in -1e6f64..1e6, k in 1usize..10, extra in 0usize..2) {
            // n - k - 1 <= 0
            let n = k + 1 - extra.min(k + 1);
            prop_assert_eq!(aicc(ll, k, n), f64::INFINITY);
        }

        #[test]
        fn prop_correction_is_positive(ll in -1e6f64..1e6, n in 4usize..1000) {
            prop_assert!(aicc(ll, 2, n) > 4.0 - 2.0 * ll);
        }
    }
}
