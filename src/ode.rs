//! Guided fixed-step Euler sampling of flow models.
//!
//! This crate uses ODE sampling of the form:
//! \[
//! \frac{dZ}{dt} = v_\theta(Z, t; c),
//! \]
//! integrated with the backward-signed explicit Euler update
//! \(Z \leftarrow Z - v_g \cdot dt\) over an inclusive uniform time grid,
//! where \(v_g\) is the classifier-free combination of a conditioned and an
//! unconditioned model evaluation.
//!
//! We keep this module tiny and deterministic: no adaptive stepping, no hidden
//! tolerances, no retries.

use ndarray::{Array1, ArrayView1};

use crate::field::{Conditioning, VectorField};
use crate::guidance::classifier_free_combine;
use crate::{Error, Result};

/// Number of grid points for a span and requested step size.
///
/// Computes `abs(int((tf - t0) / dt)) + 1`: the ratio truncates toward zero
/// and its magnitude sets the step count, so the count is identical for a
/// span and its reverse. The sign of `dt` does not choose the integration
/// direction; `t0`/`tf` ordering does.
pub fn num_grid_points(t0: f32, tf: f32, dt: f32) -> Result<usize> {
    if !t0.is_finite() || !tf.is_finite() {
        return Err(Error::Config("t_span endpoints must be finite"));
    }
    if !dt.is_finite() || dt == 0.0 {
        return Err(Error::Config("step size must be nonzero and finite"));
    }
    Ok((((tf - t0) / dt) as i64).unsigned_abs() as usize + 1)
}

/// Uniformly spaced inclusive time grid from `t0` to `tf`.
///
/// The grid has [`num_grid_points`] entries and runs in the direction of
/// `tf - t0`. When `tf - t0` is not an exact multiple of `dt`, the realized
/// spacing differs slightly from `dt`; with a single point the grid is just
/// `[t0]`. Callers must not assume exact reproduction of `dt`.
pub fn time_grid(t0: f32, tf: f32, dt: f32) -> Result<Array1<f32>> {
    let n = num_grid_points(t0, tf, dt)?;
    Ok(Array1::linspace(t0, tf, n))
}

/// Integrate a guided flow ODE with fixed explicit Euler steps.
///
/// For each consecutive pair of grid points, the model is evaluated twice at
/// the earlier time (once with `conditioning`, once with
/// [`Conditioning::Unconditioned`]), the estimates are combined with
/// [`classifier_free_combine`], and the state is updated:
///
/// \[
/// Z_i = Z_{i-1} - v_g(Z_{i-1}, t_{i-1})\,dt.
/// \]
///
/// The minus sign integrates backward along the field; it is part of the
/// contract. A collapsed span (`t0 == tf`) yields a single grid point, zero
/// loop iterations, and the initial state back unchanged.
///
/// Exactly `num_grid_points - 1` evaluation pairs are performed. Both branch
/// outputs are validated against the state length on every step; a model
/// failure aborts the solve immediately with no partial result.
pub fn solve_cfg_euler<M: VectorField>(
    model: &M,
    init: &ArrayView1<f32>,
    t_span: (f32, f32),
    dt: f32,
    conditioning: Conditioning<'_>,
    guidance_scale: f32,
) -> Result<Array1<f32>> {
    if !guidance_scale.is_finite() {
        return Err(Error::Config("guidance scale must be finite"));
    }
    let (t0, tf) = t_span;
    let t = time_grid(t0, tf, dt)?;

    let mut z = init.to_owned();
    for i in 1..t.len() {
        let t_prev = t[i - 1];

        let cond_v = model.velocity(&z.view(), t_prev, conditioning)?;
        let uncond_v = model.velocity(&z.view(), t_prev, Conditioning::Unconditioned)?;
        if cond_v.len() != z.len() || uncond_v.len() != z.len() {
            return Err(Error::Shape(
                "model velocity length must match the state length",
            ));
        }

        let guided = classifier_free_combine(&uncond_v.view(), &cond_v.view(), guidance_scale)?;
        for k in 0..z.len() {
            z[k] -= guided[k] * dt;
        }
    }

    Ok(z)
}
