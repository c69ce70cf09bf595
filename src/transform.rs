//! Bijections from unconstrained space onto constrained parameter manifolds.
//!
//! NUTS only moves through `R^n`. A constrained parameter is sampled by drawing
//! its unconstrained preimage, mapping it forward, and adding the log-determinant
//! of the forward Jacobian to the log-density so the change of variables stays
//! correctly weighted.

use crate::error::{OrdinalError, Result};

/// A stateless, smooth bijection `R^dim -> M` with a tracked Jacobian.
pub trait Transform {
    /// Length of both the unconstrained and the constrained vector.
    fn dim(&self) -> usize;

    /// Maps `unconstrained` into `constrained` and returns `log|det J|`.
    ///
    /// Slice lengths must equal [`Transform::dim`]; this is the hot path and
    /// is not checked in release builds.
    fn forward(&self, unconstrained: &[f64], constrained: &mut [f64]) -> f64;

    /// Maps a constrained vector back to its unconstrained preimage.
    fn inverse(&self, constrained: &[f64], unconstrained: &mut [f64]) -> Result<()>;

    /// Pulls a gradient taken w.r.t. the constrained vector back to
    /// unconstrained space, including the gradient of `log|det J|`.
    fn backward(
        &self,
        unconstrained: &[f64],
        grad_constrained: &[f64],
        grad_unconstrained: &mut [f64],
    );

    /// Allocating form of [`Transform::forward`].
    fn constrain(&self, unconstrained: &[f64]) -> (Vec<f64>, f64) {
        let mut out = vec![0.0; self.dim()];
        let log_det = self.forward(unconstrained, &mut out);
        (out, log_det)
    }

    /// Allocating form of [`Transform::inverse`].
    fn unconstrain(&self, constrained: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.dim()];
        self.inverse(constrained, &mut out)?;
        Ok(out)
    }
}

/// Maps `u` to a strictly increasing vector via
/// `c[0] = u[0]`, `c[i] = c[i-1] + exp(u[i])`.
///
/// The Jacobian is lower triangular with diagonal `[1, exp(u[1]), ..]`, so
/// `log|det J| = u[1] + .. + u[n-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedTransform {
    dim: usize,
}

impl OrderedTransform {
    /// `dim` is the number of cutpoints, `K - 1`. Zero cutpoints cannot
    /// describe an ordinal outcome and is rejected.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(OrdinalError::InvalidClassCount { n_classes: 1 });
        }
        Ok(Self { dim })
    }

    pub fn for_classes(n_classes: usize) -> Result<Self> {
        if n_classes < 2 {
            return Err(OrdinalError::InvalidClassCount { n_classes });
        }
        Self::new(n_classes - 1)
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.dim {
            return Err(OrdinalError::DimensionMismatch {
                what,
                expected: self.dim,
                got,
            });
        }
        Ok(())
    }
}

impl Transform for OrderedTransform {
    fn dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, unconstrained: &[f64], constrained: &mut [f64]) -> f64 {
        debug_assert_eq!(unconstrained.len(), self.dim);
        debug_assert_eq!(constrained.len(), self.dim);

        constrained[0] = unconstrained[0];
        let mut log_det = 0.0;
        for i in 1..self.dim {
            constrained[i] = constrained[i - 1] + unconstrained[i].exp();
            log_det += unconstrained[i];
        }
        log_det
    }

    fn inverse(&self, constrained: &[f64], unconstrained: &mut [f64]) -> Result<()> {
        self.check_len("cutpoints", constrained.len())?;
        self.check_len("unconstrained cutpoints", unconstrained.len())?;

        unconstrained[0] = constrained[0];
        for i in 1..self.dim {
            let gap = constrained[i] - constrained[i - 1];
            // negated form so NaN gaps are rejected too
            if !(gap > 0.0 && gap.is_finite()) {
                return Err(OrdinalError::NotStrictlyIncreasing {
                    index: i,
                    prev: constrained[i - 1],
                    next: constrained[i],
                });
            }
            unconstrained[i] = gap.ln();
        }
        Ok(())
    }

    fn backward(
        &self,
        unconstrained: &[f64],
        grad_constrained: &[f64],
        grad_unconstrained: &mut [f64],
    ) {
        debug_assert_eq!(unconstrained.len(), self.dim);
        debug_assert_eq!(grad_constrained.len(), self.dim);
        debug_assert_eq!(grad_unconstrained.len(), self.dim);

        // c[i] depends on u[j] for every j <= i, so u[j] collects the suffix
        // sum of the incoming gradient. The +1 is d(log|det J|)/du[j].
        let mut suffix = 0.0;
        for j in (1..self.dim).rev() {
            suffix += grad_constrained[j];
            grad_unconstrained[j] = unconstrained[j].exp() * suffix + 1.0;
        }
        suffix += grad_constrained[0];
        grad_unconstrained[0] = suffix;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rejects_zero_cutpoints() {
        assert!(matches!(
            OrderedTransform::new(0),
            Err(OrdinalError::InvalidClassCount { .. })
        ));
        assert!(matches!(
            OrderedTransform::for_classes(1),
            Err(OrdinalError::InvalidClassCount { n_classes: 1 })
        ));
        assert_eq!(OrderedTransform::for_classes(4).unwrap().dim(), 3);
    }

    #[test]
    fn single_cutpoint_is_identity() {
        let t = OrderedTransform::new(1).unwrap();
        let (c, log_det) = t.constrain(&[-0.7]);
        assert_eq!(c, vec![-0.7]);
        assert_eq!(log_det, 0.0);

        let mut grad_u = [0.0];
        t.backward(&[-0.7], &[2.5], &mut grad_u);
        assert_eq!(grad_u, [2.5]);
    }

    #[test]
    fn forward_is_strictly_increasing() {
        let t = OrderedTransform::new(4).unwrap();
        let u = [1.5, -3.0, 0.0, 2.0];
        let (c, log_det) = t.constrain(&u);
        for w in c.windows(2) {
            assert!(w[0] < w[1], "{c:?}");
        }
        assert_abs_diff_eq!(c[1], 1.5 + (-3.0f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(log_det, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn inverse_round_trip() {
        let t = OrderedTransform::new(3).unwrap();
        let c = [-0.11, 2.18, 2.5];
        let u = t.unconstrain(&c).unwrap();
        let (back, _) = t.constrain(&u);
        for (a, b) in c.iter().zip(&back) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn inverse_rejects_ties_and_decreases() {
        let t = OrderedTransform::new(3).unwrap();
        let err = t.unconstrain(&[0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, OrdinalError::NotStrictlyIncreasing { index: 2, .. }));

        let err = t.unconstrain(&[0.0, -1.0, 2.0]).unwrap_err();
        assert!(matches!(err, OrdinalError::NotStrictlyIncreasing { index: 1, .. }));

        assert!(t.unconstrain(&[0.0, f64::NAN, 2.0]).is_err());
    }

    #[test]
    fn inverse_checks_length() {
        let t = OrderedTransform::new(2).unwrap();
        let err = t.unconstrain(&[0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            OrdinalError::DimensionMismatch { expected: 2, got: 3, .. }
        ));
    }

    #[test]
    fn backward_matches_finite_differences() {
        // f(u) = w . forward(u) + log|det J(u)|
        let t = OrderedTransform::new(4).unwrap();
        let w = [0.3, -1.2, 0.8, 0.5];
        let f = |u: &[f64]| {
            let (c, log_det) = t.constrain(u);
            c.iter().zip(&w).map(|(c, w)| c * w).sum::<f64>() + log_det
        };

        let u = [0.4, -0.6, 0.2, 1.1];
        let mut grad = [0.0; 4];
        t.backward(&u, &w, &mut grad);

        let h = 1e-6;
        for j in 0..4 {
            let mut up = u;
            let mut down = u;
            up[j] += h;
            down[j] -= h;
            let numeric = (f(&up) - f(&down)) / (2.0 * h);
            assert_abs_diff_eq!(grad[j], numeric, epsilon = 1e-6);
        }
    }
}
