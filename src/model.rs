//! Ordinal regression posterior in unconstrained coordinates.
//!
//! The sampler position is `[beta_0 .. beta_{d-1}, u_0 .. u_{K-2}]`; cutpoints
//! are `OrderedTransform::forward(u)`. The log-density is the plain sum of
//! the ordered-logistic likelihood, the transform's `log|det J|` and the prior
//! terms, and the gradient is derived by hand for each of them.

use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

use crate::ProbabilisticModel;
use crate::data::OrdinalData;
use crate::error::{OrdinalError, Result};
use crate::link::normal_logp;
use crate::ordered_logistic::{OrderedLogistic, log_prob_grad};
use crate::transform::{OrderedTransform, Transform};

/// Independent prior on each regression coefficient.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior {
    Flat,
    Normal { mu: f64, sigma: f64 },
}

impl Default for Prior {
    fn default() -> Self {
        Prior::Normal { mu: 0.0, sigma: 1.0 }
    }
}

impl Prior {
    fn validate(&self) -> Result<()> {
        match self {
            Prior::Flat => Ok(()),
            Prior::Normal { sigma, .. } => check_sigma(*sigma),
        }
    }

    fn log_density(&self, values: &[f64], grad: &mut [f64]) -> f64 {
        match self {
            Prior::Flat => 0.0,
            Prior::Normal { mu, sigma } => values
                .iter()
                .zip(grad.iter_mut())
                .map(|(&v, g)| {
                    *g -= (v - mu) / (sigma * sigma);
                    normal_logp(v, *mu, *sigma)
                })
                .sum(),
        }
    }
}

/// Prior on the ordered cutpoints.
///
/// `Flat` leaves the ordering constraint as the only information. `Normal`
/// evaluates an extra Normal density on the already-ordered cutpoints; it is
/// not renormalised for the truncation to the ordered region, so the result
/// is an unnormalised prior.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CutpointPrior {
    #[default]
    Flat,
    Normal { mu: Vec<f64>, sigma: f64 },
}

impl CutpointPrior {
    fn validate(&self, n_cutpoints: usize) -> Result<()> {
        match self {
            CutpointPrior::Flat => Ok(()),
            CutpointPrior::Normal { mu, sigma } => {
                if mu.len() != n_cutpoints {
                    return Err(OrdinalError::DimensionMismatch {
                        what: "cutpoint prior means",
                        expected: n_cutpoints,
                        got: mu.len(),
                    });
                }
                check_sigma(*sigma)
            }
        }
    }

    fn log_density(&self, cutpoints: &[f64], grad: &mut [f64]) -> f64 {
        match self {
            CutpointPrior::Flat => 0.0,
            CutpointPrior::Normal { mu, sigma } => cutpoints
                .iter()
                .zip(mu)
                .zip(grad.iter_mut())
                .map(|((&c, &m), g)| {
                    *g -= (c - m) / (sigma * sigma);
                    normal_logp(c, m, *sigma)
                })
                .sum(),
        }
    }
}

fn check_sigma(sigma: f64) -> Result<()> {
    if sigma > 0.0 && sigma.is_finite() {
        Ok(())
    } else {
        Err(OrdinalError::InvalidConfig(format!(
            "prior sigma must be positive and finite, got {sigma}"
        )))
    }
}

/// Constrained parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub coefficients: Array1<f64>,
    pub cutpoints: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct OrdinalRegression {
    data: OrdinalData,
    transform: OrderedTransform,
    coefficient_prior: Prior,
    cutpoint_prior: CutpointPrior,
    parallel: bool,
}

impl OrdinalRegression {
    pub fn new(data: OrdinalData) -> Result<Self> {
        let transform = OrderedTransform::for_classes(data.n_classes())?;
        log::debug!(
            "ordinal regression: {} observations, {} covariates, {} classes",
            data.n_obs(),
            data.n_covariates(),
            data.n_classes()
        );
        Ok(Self {
            data,
            transform,
            coefficient_prior: Prior::default(),
            cutpoint_prior: CutpointPrior::default(),
            parallel: false,
        })
    }

    pub fn with_coefficient_prior(mut self, prior: Prior) -> Result<Self> {
        prior.validate()?;
        self.coefficient_prior = prior;
        Ok(self)
    }

    pub fn with_cutpoint_prior(mut self, prior: CutpointPrior) -> Result<Self> {
        prior.validate(self.n_cutpoints())?;
        self.cutpoint_prior = prior;
        Ok(self)
    }

    /// Evaluate the per-observation sum on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn data(&self) -> &OrdinalData {
        &self.data
    }

    pub fn n_coefficients(&self) -> usize {
        self.data.n_covariates()
    }

    pub fn n_cutpoints(&self) -> usize {
        self.transform.dim()
    }

    fn check_position(&self, position: &[f64]) -> Result<()> {
        if position.len() != self.dim() {
            return Err(OrdinalError::DimensionMismatch {
                what: "position",
                expected: self.dim(),
                got: position.len(),
            });
        }
        Ok(())
    }

    /// Maps a sampler position to coefficients and ordered cutpoints.
    pub fn constrain(&self, position: &[f64]) -> Result<Params> {
        self.check_position(position)?;
        let (beta, u) = position.split_at(self.n_coefficients());
        let (cutpoints, _) = self.transform.constrain(u);
        Ok(Params {
            coefficients: Array1::from(beta.to_vec()),
            cutpoints: Array1::from(cutpoints),
        })
    }

    /// Inverse of [`OrdinalRegression::constrain`]; fails unless the cutpoints
    /// are strictly increasing.
    pub fn unconstrain(&self, params: &Params) -> Result<Vec<f64>> {
        if params.coefficients.len() != self.n_coefficients() {
            return Err(OrdinalError::DimensionMismatch {
                what: "coefficients",
                expected: self.n_coefficients(),
                got: params.coefficients.len(),
            });
        }
        let cutpoints = params.cutpoints.to_vec();
        let u = self.transform.unconstrain(&cutpoints)?;
        Ok(params.coefficients.iter().copied().chain(u).collect())
    }

    /// Zero coefficients and cutpoints spread evenly over `[-1, 1]`.
    pub fn initial_position(&self) -> Result<Vec<f64>> {
        let m = self.n_cutpoints();
        let cutpoints = if m == 1 {
            Array1::zeros(1)
        } else {
            Array1::linspace(-1.0, 1.0, m)
        };
        self.unconstrain(&Params {
            coefficients: Array1::zeros(self.n_coefficients()),
            cutpoints,
        })
    }

    /// Class probabilities for one covariate row at a given position.
    pub fn class_probabilities(
        &self,
        position: &[f64],
        x_row: ArrayView1<'_, f64>,
    ) -> Result<Vec<f64>> {
        let params = self.constrain(position)?;
        if x_row.len() != self.n_coefficients() {
            return Err(OrdinalError::DimensionMismatch {
                what: "covariate row",
                expected: self.n_coefficients(),
                got: x_row.len(),
            });
        }
        let eta = x_row.dot(&params.coefficients);
        let cutpoints = params.cutpoints.to_vec();
        Ok(OrderedLogistic::new(eta, &cutpoints).probs())
    }

    /// Sum of per-observation log-probabilities. Writes `d/deta_i` into
    /// `grad_eta` and returns the gradient w.r.t. the cutpoints.
    fn log_likelihood(
        &self,
        eta: &Array1<f64>,
        cutpoints: &[f64],
        grad_eta: &mut Array1<f64>,
    ) -> (f64, Vec<f64>) {
        let m = cutpoints.len();
        let fold = |(lp, mut grad_c): (f64, Vec<f64>), g: &mut f64, eta_i: &f64, k: &usize| {
            let (lp_i, d_eta) = log_prob_grad(*eta_i, cutpoints, *k, &mut grad_c);
            *g = d_eta;
            (lp + lp_i, grad_c)
        };
        let zip = Zip::from(grad_eta).and(eta).and(self.data.y());

        if self.parallel {
            zip.par_fold(
                || (0.0, vec![0.0; m]),
                fold,
                |(lp_a, mut grad_a), (lp_b, grad_b)| {
                    for (a, b) in grad_a.iter_mut().zip(&grad_b) {
                        *a += b;
                    }
                    (lp_a + lp_b, grad_a)
                },
            )
        } else {
            zip.fold((0.0, vec![0.0; m]), fold)
        }
    }
}

impl ProbabilisticModel for OrdinalRegression {
    fn dim(&self) -> usize {
        self.n_coefficients() + self.n_cutpoints()
    }

    fn value(&self, position: &Array1<f64>) -> f64 {
        let mut grad = vec![0.0; self.dim()];
        self.value_and_grad(&position.to_vec(), &mut grad)
    }

    fn grad(&self, position: &Array1<f64>) -> Array1<f64> {
        let mut grad = vec![0.0; self.dim()];
        self.value_and_grad(&position.to_vec(), &mut grad);
        Array1::from(grad)
    }

    fn value_and_grad(&self, position: &[f64], grad: &mut [f64]) -> f64 {
        debug_assert_eq!(position.len(), self.dim());
        debug_assert_eq!(grad.len(), self.dim());

        let d = self.n_coefficients();
        let (beta_slice, u) = position.split_at(d);
        let (grad_beta, grad_u) = grad.split_at_mut(d);

        let mut cutpoints = vec![0.0; self.n_cutpoints()];
        let log_det = self.transform.forward(u, &mut cutpoints);

        let beta = ArrayView1::from(beta_slice);
        let eta = self.data.x().dot(&beta);
        let mut grad_eta = Array1::zeros(eta.len());
        let (loglik, mut grad_cutpoints) = self.log_likelihood(&eta, &cutpoints, &mut grad_eta);

        // chain rule through eta = X beta
        ArrayViewMut1::from(&mut *grad_beta).assign(&self.data.x().t().dot(&grad_eta));
        let coefficient_prior = self.coefficient_prior.log_density(beta_slice, grad_beta);
        let cutpoint_prior = self.cutpoint_prior.log_density(&cutpoints, &mut grad_cutpoints);

        self.transform.backward(u, &grad_cutpoints, grad_u);

        loglik + log_det + coefficient_prior + cutpoint_prior
    }
}
