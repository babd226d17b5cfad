//! Deterministic float ordering for label priority and hit-test ties.

use core::cmp::Ordering;

/// `-0.0` folds to `0.0` and every NaN to one canonical NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Total order over canonicalized values. NaN sorts after every number.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn signed_zeros_compare_equal() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn prevalence_sort_is_descending_and_nan_safe() {
        let mut v = vec![15.0, f64::NAN, 24.0, 18.0, 24.0];
        v.sort_by(|a, b| stable_total_cmp_f64(*b, *a));
        assert!(v[0].is_nan());
        assert_eq!(&v[1..], &[24.0, 24.0, 18.0, 15.0]);
    }
}
