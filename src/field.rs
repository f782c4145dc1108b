//! Vector-field capability and conditioning variants.
//!
//! The model interface has exactly two call modes, conditioned and
//! unconditioned, and they are statically distinguishable here instead of
//! being selected by optional-null arguments.

use ndarray::{Array1, Array2, ArrayView1};

use crate::Result;

/// Conditioning passed to a vector-field evaluation.
///
/// The solver forwards the bundle opaquely; it never inspects the contents
/// beyond passing or withholding them. The unconditioned branch of guidance is
/// obtained by withholding conditioning entirely ([`Conditioning::Unconditioned`]),
/// never by substituting a padded tensor.
#[derive(Debug, Clone, Copy)]
pub enum Conditioning<'a> {
    /// A conditioning vector, with optional class conditioning.
    Conditioned {
        data: ArrayView1<'a, f32>,
        class_data: Option<ArrayView1<'a, f32>>,
    },
    /// No conditioning at all.
    Unconditioned,
}

impl<'a> Conditioning<'a> {
    /// Conditioned on `data`, with no class conditioning.
    pub fn on(data: ArrayView1<'a, f32>) -> Self {
        Self::Conditioned {
            data,
            class_data: None,
        }
    }
}

/// A (possibly conditioned) velocity field \(v(x, t; c)\).
///
/// Evaluations are forward-only: the solver never mutates model state and
/// carries no gradient machinery. Implementations must accept
/// [`Conditioning::Unconditioned`] and must return a vector of the same length
/// as `x`; the solver validates the length on every call.
pub trait VectorField {
    fn velocity(
        &self,
        x: &ArrayView1<f32>,
        t: f32,
        conditioning: Conditioning<'_>,
    ) -> Result<Array1<f32>>;
}

/// Adapts a plain closure into a [`VectorField`].
pub struct FnField<F>(pub F);

impl<F> VectorField for FnField<F>
where
    F: Fn(&ArrayView1<f32>, f32, Conditioning<'_>) -> Result<Array1<f32>>,
{
    fn velocity(
        &self,
        x: &ArrayView1<f32>,
        t: f32,
        conditioning: Conditioning<'_>,
    ) -> Result<Array1<f32>> {
        (self.0)(x, t, conditioning)
    }
}

/// A linear vector field with separate unconditioned and conditioned terms:
///
/// \[
/// v(x, t; y, k) = W_x x + w_t t + b \;\; (+\, W_y y + W_c k \text{ when conditioned}),
/// \]
///
/// This is an intentionally boring baseline: enough structure to exercise the
/// guided solver end to end without importing an ML framework.
#[derive(Debug, Clone)]
pub struct LinearCondField {
    /// State weights, `d × d`.
    pub w_x: Array2<f32>,
    /// Conditioning weights, `d × d`. Applied only when conditioned.
    pub w_y: Array2<f32>,
    /// Class-conditioning weights, `d × k`. Applied only when class conditioning is present.
    pub w_c: Array2<f32>,
    /// Time weights, length `d`.
    pub w_t: Array1<f32>,
    /// Bias, length `d`.
    pub b: Array1<f32>,
}

impl LinearCondField {
    /// All-zero field for state dimension `d` and class dimension `k`.
    pub fn new_zeros(d: usize, k: usize) -> Self {
        Self {
            w_x: Array2::zeros((d, d)),
            w_y: Array2::zeros((d, d)),
            w_c: Array2::zeros((d, k)),
            w_t: Array1::zeros(d),
            b: Array1::zeros(d),
        }
    }

    pub fn d(&self) -> usize {
        self.w_x.nrows()
    }
}

impl VectorField for LinearCondField {
    fn velocity(
        &self,
        x: &ArrayView1<f32>,
        t: f32,
        conditioning: Conditioning<'_>,
    ) -> Result<Array1<f32>> {
        let d = self.d();
        debug_assert_eq!(x.len(), d);

        let mut out = Array1::<f32>::zeros(d);
        for i in 0..d {
            let mut s = 0.0f32;
            for j in 0..d {
                s += self.w_x[[i, j]] * x[j];
            }
            s += self.w_t[i] * t;
            s += self.b[i];
            out[i] = s;
        }

        if let Conditioning::Conditioned { data, class_data } = conditioning {
            debug_assert_eq!(data.len(), d);
            for i in 0..d {
                let mut s = 0.0f32;
                for j in 0..d {
                    s += self.w_y[[i, j]] * data[j];
                }
                out[i] += s;
            }
            if let Some(class) = class_data {
                debug_assert_eq!(class.len(), self.w_c.ncols());
                for i in 0..d {
                    let mut s = 0.0f32;
                    for j in 0..class.len() {
                        s += self.w_c[[i, j]] * class[j];
                    }
                    out[i] += s;
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_field_is_zero_in_both_modes() {
        let field = LinearCondField::new_zeros(3, 2);
        let x = array![1.0f32, -2.0, 3.0];
        let y = array![0.5f32, 0.5, 0.5];

        let v_un = field
            .velocity(&x.view(), 0.3, Conditioning::Unconditioned)
            .unwrap();
        let v_co = field
            .velocity(&x.view(), 0.3, Conditioning::on(y.view()))
            .unwrap();

        assert!(v_un.iter().all(|&v| v == 0.0));
        assert!(v_co.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn conditioned_terms_only_fire_when_conditioned() {
        let d = 2;
        let mut field = LinearCondField::new_zeros(d, 1);
        field.w_x = Array2::eye(d);
        field.w_y = Array2::eye(d);

        let x = array![1.0f32, 2.0];
        let y = array![10.0f32, 20.0];

        let v_un = field
            .velocity(&x.view(), 0.0, Conditioning::Unconditioned)
            .unwrap();
        let v_co = field
            .velocity(&x.view(), 0.0, Conditioning::on(y.view()))
            .unwrap();

        assert_eq!(v_un, array![1.0f32, 2.0]);
        assert_eq!(v_co, array![11.0f32, 22.0]);
    }

    #[test]
    fn class_conditioning_adds_its_term() {
        let d = 2;
        let mut field = LinearCondField::new_zeros(d, 1);
        field.w_c = array![[1.0f32], [2.0]];

        let x = array![0.0f32, 0.0];
        let y = array![0.0f32, 0.0];
        let class = array![3.0f32];

        let v = field
            .velocity(
                &x.view(),
                0.0,
                Conditioning::Conditioned {
                    data: y.view(),
                    class_data: Some(class.view()),
                },
            )
            .unwrap();

        assert_eq!(v, array![3.0f32, 6.0]);
    }

    #[test]
    fn closure_adapter_is_a_vector_field() {
        let field = FnField(|x: &ArrayView1<f32>, _t: f32, c: Conditioning<'_>| {
            Ok(match c {
                Conditioning::Conditioned { .. } => x.mapv(|v| v * 2.0),
                Conditioning::Unconditioned => x.to_owned(),
            })
        });

        let x = array![1.0f32, -1.0];
        let y = array![0.0f32, 0.0];
        let v_un = field
            .velocity(&x.view(), 0.5, Conditioning::Unconditioned)
            .unwrap();
        let v_co = field
            .velocity(&x.view(), 0.5, Conditioning::on(y.view()))
            .unwrap();

        assert_eq!(v_un, array![1.0f32, -1.0]);
        assert_eq!(v_co, array![2.0f32, -2.0]);
    }
}
