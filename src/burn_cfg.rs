//! Burn-backed (opt-in) guided Euler sampling.
//!
//! This module is intentionally **additive**: it provides a concrete `burn`
//! backend path with real device placement without changing the default
//! `ndarray`-only API surface of `cfgflow`.
//!
//! The state is batched (`[batch, d]`) and the update is applied across the
//! whole batch at once. The backend alias is a plain inference backend (no
//! `Autodiff` wrapper), so model evaluations carry no gradient tracking by
//! construction.

use burn_core as burn;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use burn_ndarray::NdArray;

use crate::ode::time_grid;
use crate::{Error, Result};

/// Default burn backend for this crate’s tests: ndarray, inference only.
pub type BurnBackend = NdArray<f32>;

/// Conditioning for a batched burn vector field.
///
/// Same two-case contract as the ndarray path: the unconditioned branch
/// withholds conditioning entirely, it never substitutes a padded tensor.
#[derive(Debug, Clone)]
pub enum BurnConditioning<B: Backend> {
    Conditioned {
        /// Conditioning batch, `[batch, c]`.
        data: Tensor<B, 2>,
        /// Optional class-conditioning batch, `[batch, k]`.
        class_data: Option<Tensor<B, 2>>,
    },
    Unconditioned,
}

/// A batched velocity field over burn tensors.
///
/// Shapes:
/// - `x`: `[batch, d]`
/// - returns: `[batch, d]` (validated by the solver on every evaluation)
pub trait BurnVectorField<B: Backend> {
    fn velocity(
        &self,
        x: Tensor<B, 2>,
        t: f32,
        conditioning: &BurnConditioning<B>,
    ) -> Result<Tensor<B, 2>>;
}

/// Guided Euler solve on a burn backend.
///
/// Moves `init` to `device`, builds the same inclusive grid as the ndarray
/// path, and applies the identical update batched over rows:
/// \(Z \leftarrow Z - (v_u + (v_c - v_u)\,w)\,dt\).
pub fn solve_cfg_euler_burn<B, M>(
    model: &M,
    init: Tensor<B, 2>,
    t_span: (f32, f32),
    dt: f32,
    conditioning: &BurnConditioning<B>,
    guidance_scale: f32,
    device: &B::Device,
) -> Result<Tensor<B, 2>>
where
    B: Backend,
    M: BurnVectorField<B>,
{
    if !guidance_scale.is_finite() {
        return Err(Error::Config("guidance scale must be finite"));
    }
    let t = time_grid(t_span.0, t_span.1, dt)?;

    let mut z = init.to_device(device);
    let unconditioned = BurnConditioning::Unconditioned;

    for i in 1..t.len() {
        let t_prev = t[i - 1];
        let dims = z.dims();

        let cond_v = model.velocity(z.clone(), t_prev, conditioning)?;
        let uncond_v = model.velocity(z.clone(), t_prev, &unconditioned)?;
        if cond_v.dims() != dims || uncond_v.dims() != dims {
            return Err(Error::Shape("model velocity dims must match the state dims"));
        }

        let guided = uncond_v.clone() + (cond_v - uncond_v).mul_scalar(guidance_scale);
        z = z - guided.mul_scalar(dt);
    }

    Ok(z)
}
