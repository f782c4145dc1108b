//! Classifier-free guidance combination.
//!
//! Kept standalone so the formula is testable in isolation from the solver.

use ndarray::{Array1, ArrayView1};

use crate::{Error, Result};

/// Combine unconditioned and conditioned velocity estimates:
///
/// \[
/// v_g = v_u + (v_c - v_u)\,w.
/// \]
///
/// `w = 0` returns the unconditioned estimate, `w = 1` the conditioned one,
/// and `w > 1` extrapolates past it. When the two estimates are identical the
/// result is that estimate regardless of `w`.
pub fn classifier_free_combine(
    uncond: &ArrayView1<f32>,
    cond: &ArrayView1<f32>,
    scale: f32,
) -> Result<Array1<f32>> {
    if !scale.is_finite() {
        return Err(Error::Config("guidance scale must be finite"));
    }
    if uncond.len() != cond.len() {
        return Err(Error::Shape(
            "conditioned and unconditioned velocities must have the same length",
        ));
    }

    let mut out = Array1::<f32>::zeros(uncond.len());
    for i in 0..uncond.len() {
        out[i] = uncond[i] + (cond[i] - uncond[i]) * scale;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn scale_one_reduces_to_conditioned() {
        // cond = 2x, uncond = x: at w=1 the (cond - uncond) term is scaled by 1.
        let x = array![1.0f32, -2.0, 0.5];
        let uncond = x.clone();
        let cond = x.mapv(|v| v * 2.0);

        let g = classifier_free_combine(&uncond.view(), &cond.view(), 1.0).unwrap();
        assert_eq!(g, cond);
    }

    #[test]
    fn scale_zero_reduces_to_unconditioned() {
        let uncond = array![0.25f32, -4.0];
        let cond = array![100.0f32, 100.0];

        let g = classifier_free_combine(&uncond.view(), &cond.view(), 0.0).unwrap();
        assert_eq!(g, uncond);
    }

    #[test]
    fn mismatched_lengths_are_a_shape_error() {
        let uncond = array![1.0f32, 2.0];
        let cond = array![1.0f32];

        let err = classifier_free_combine(&uncond.view(), &cond.view(), 1.0).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn non_finite_scale_is_a_config_error() {
        let v = array![1.0f32];
        let err = classifier_free_combine(&v.view(), &v.view(), f32::NAN).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    proptest! {
        #[test]
        fn prop_identical_estimates_are_fixed_points(
            len in 1usize..16,
            scale in -8.0f32..8.0f32,
            vals in prop::collection::vec(-10.0f32..10.0f32, 16),
        ) {
            let v = Array1::from_vec(vals[..len].to_vec());
            let g = classifier_free_combine(&v.view(), &v.view(), scale).unwrap();
            for i in 0..len {
                prop_assert_eq!(g[i].to_bits(), v[i].to_bits());
            }
        }

        #[test]
        fn prop_combine_is_linear_interpolation_per_element(
            len in 1usize..16,
            scale in -4.0f32..4.0f32,
            us in prop::collection::vec(-10.0f32..10.0f32, 16),
            cs in prop::collection::vec(-10.0f32..10.0f32, 16),
        ) {
            let u = Array1::from_vec(us[..len].to_vec());
            let c = Array1::from_vec(cs[..len].to_vec());
            let g = classifier_free_combine(&u.view(), &c.view(), scale).unwrap();
            for i in 0..len {
                let expected = u[i] + (c[i] - u[i]) * scale;
                prop_assert_eq!(g[i].to_bits(), expected.to_bits());
            }
        }
    }
}
