//! Ordered-logistic (proportional odds) likelihood.
//!
//! With cutpoints `c[0] < .. < c[K-2]` and class boundaries
//! `b = [-inf, c[0], .., c[K-2], +inf]`, the probability of class `k` is
//! `sigmoid(b[k+1] - eta) - sigmoid(b[k] - eta)`.
//!
//! Nothing here checks that the cutpoints are increasing. They are expected to
//! come out of [`OrderedTransform`](crate::transform::OrderedTransform), and
//! this code runs once per observation per leapfrog step.

use rand::Rng;
use rand::distr::Distribution;

use crate::link::{log1mexp, log_sigmoid, sigmoid};

/// Ordered-logistic distribution for a single latent score.
#[derive(Debug, Clone, Copy)]
pub struct OrderedLogistic<'c> {
    pub eta: f64,
    pub cutpoints: &'c [f64],
}

impl<'c> OrderedLogistic<'c> {
    pub fn new(eta: f64, cutpoints: &'c [f64]) -> Self {
        Self { eta, cutpoints }
    }

    pub fn n_classes(&self) -> usize {
        self.cutpoints.len() + 1
    }

    /// `P(Y <= k)`.
    pub fn cdf(&self, k: usize) -> f64 {
        match self.cutpoints.get(k) {
            Some(&c) => sigmoid(c - self.eta),
            None => 1.0,
        }
    }

    pub fn log_prob(&self, k: usize) -> f64 {
        log_prob(self.eta, self.cutpoints, k)
    }

    pub fn prob(&self, k: usize) -> f64 {
        self.log_prob(k).exp()
    }

    /// All `K` class probabilities, obtained by differencing the CDF so they
    /// telescope to one.
    pub fn probs(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_classes());
        let mut lower = 0.0;
        for k in 0..self.n_classes() {
            let upper = self.cdf(k);
            out.push((upper - lower).max(0.0));
            lower = upper;
        }
        out
    }

    /// Inverse-CDF draw for a given `u` in `[0, 1)`.
    pub fn sample_with_uniform(&self, u: f64) -> usize {
        self.cutpoints
            .iter()
            .position(|&c| u < sigmoid(c - self.eta))
            .unwrap_or(self.cutpoints.len())
    }
}

impl Distribution<usize> for OrderedLogistic<'_> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.sample_with_uniform(rng.random::<f64>())
    }
}

/// `ln P(Y = k | eta, cutpoints)`.
///
/// Interior classes use
/// `ln(sigmoid(b) - sigmoid(a)) = ln sigmoid(b) + ln sigmoid(-a) + ln(1 - exp(a - b))`
/// with `a = c[k-1] - eta`, `b = c[k] - eta`, which stays finite where the
/// direct difference rounds to zero. Returns `-inf` for `k >= K`.
pub fn log_prob(eta: f64, cutpoints: &[f64], k: usize) -> f64 {
    let last = cutpoints.len();
    if k > last {
        return f64::NEG_INFINITY;
    }
    if last == 0 {
        return 0.0;
    }
    if k == 0 {
        return log_sigmoid(cutpoints[0] - eta);
    }
    if k == last {
        return log_sigmoid(eta - cutpoints[last - 1]);
    }
    let a = cutpoints[k - 1] - eta;
    let b = cutpoints[k] - eta;
    log_sigmoid(b) + log_sigmoid(-a) + log1mexp(a - b)
}

/// Like [`log_prob`], also accumulating `d/dc` into `grad_cutpoints` and
/// returning `(log_prob, d/deta)`.
pub fn log_prob_grad(
    eta: f64,
    cutpoints: &[f64],
    k: usize,
    grad_cutpoints: &mut [f64],
) -> (f64, f64) {
    let last = cutpoints.len();
    if k > last {
        return (f64::NEG_INFINITY, 0.0);
    }
    if last == 0 {
        return (0.0, 0.0);
    }

    if k == 0 {
        let b = cutpoints[0] - eta;
        let d_b = sigmoid(-b);
        grad_cutpoints[0] += d_b;
        return (log_sigmoid(b), -d_b);
    }
    if k == last {
        let a = cutpoints[last - 1] - eta;
        let d_a = -sigmoid(a);
        grad_cutpoints[last - 1] += d_a;
        return (log_sigmoid(-a), -d_a);
    }

    let a = cutpoints[k - 1] - eta;
    let b = cutpoints[k] - eta;
    // d/db ln(1 - exp(a - b)) = 1 / expm1(b - a)
    let r = (b - a).exp_m1().recip();
    let d_b = sigmoid(-b) + r;
    let d_a = -sigmoid(a) - r;
    grad_cutpoints[k] += d_b;
    grad_cutpoints[k - 1] += d_a;

    let lp = log_sigmoid(b) + log_sigmoid(-a) + log1mexp(a - b);
    (lp, -(d_a + d_b))
}

pub fn sample<R: Rng + ?Sized>(eta: f64, cutpoints: &[f64], rng: &mut R) -> usize {
    OrderedLogistic::new(eta, cutpoints).sample(rng)
}
