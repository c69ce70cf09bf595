//! Draws mapped back to the constrained parameters, and posterior predictive
//! class probabilities.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::Trace;
use crate::error::{OrdinalError, Result};
use crate::model::OrdinalRegression;
use crate::ordered_logistic::OrderedLogistic;

#[derive(Debug, Clone)]
pub struct Posterior {
    /// One row per draw.
    pub coefficients: Array2<f64>,
    /// One row per draw; every row is strictly increasing.
    pub cutpoints: Array2<f64>,
    pub divergences: u64,
}

impl Posterior {
    /// Pools the draws of all `traces`.
    pub fn from_traces(model: &OrdinalRegression, traces: &[Trace]) -> Result<Self> {
        let n_draws: usize = traces.iter().map(|t| t.draws.nrows()).sum();
        if n_draws == 0 {
            return Err(OrdinalError::InvalidConfig("no draws to summarise".into()));
        }

        let d = model.n_coefficients();
        let m = model.n_cutpoints();
        let mut coefficients = Vec::with_capacity(n_draws * d);
        let mut cutpoints = Vec::with_capacity(n_draws * m);
        for draw in traces.iter().flat_map(|t| t.draws.outer_iter()) {
            let params = model.constrain(&draw.to_vec())?;
            coefficients.extend(params.coefficients);
            cutpoints.extend(params.cutpoints);
        }

        Ok(Self {
            coefficients: Array2::from_shape_vec((n_draws, d), coefficients)?,
            cutpoints: Array2::from_shape_vec((n_draws, m), cutpoints)?,
            divergences: traces.iter().map(|t| t.divergences).sum(),
        })
    }

    pub fn n_draws(&self) -> usize {
        self.coefficients.nrows()
    }

    pub fn coefficient_means(&self) -> Array1<f64> {
        self.coefficients.sum_axis(Axis(0)) / self.n_draws() as f64
    }

    pub fn cutpoint_means(&self) -> Array1<f64> {
        self.cutpoints.sum_axis(Axis(0)) / self.n_draws() as f64
    }

    /// Class probabilities for `x_row`, averaged over the posterior draws.
    pub fn predict_proba(&self, x_row: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if x_row.len() != self.coefficients.ncols() {
            return Err(OrdinalError::DimensionMismatch {
                what: "covariate row",
                expected: self.coefficients.ncols(),
                got: x_row.len(),
            });
        }

        let n_classes = self.cutpoints.ncols() + 1;
        let mut total = Array1::zeros(n_classes);
        for (beta, cutpoints) in self.coefficients.outer_iter().zip(self.cutpoints.outer_iter()) {
            let eta = x_row.dot(&beta);
            let cutpoints = cutpoints.to_vec();
            total += &Array1::from(OrderedLogistic::new(eta, &cutpoints).probs());
        }
        Ok(total / self.n_draws() as f64)
    }
}
