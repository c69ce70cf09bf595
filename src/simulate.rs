//! Toy data for ordinal regression: Gaussian covariates, a linear latent
//! score, and classes drawn from the ordered-logistic at known cutpoints.

use ndarray::{Array1, Array2, Zip};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand_distr::{Normal, Uniform};

use crate::data::OrdinalData;
use crate::error::{OrdinalError, Result};
use crate::ordered_logistic::OrderedLogistic;
use crate::transform::{OrderedTransform, Transform};

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub n_obs: usize,
    /// True regression weights; one covariate column per entry.
    pub coefficients: Vec<f64>,
    /// True cutpoints, strictly increasing. `len + 1` classes are generated.
    pub cutpoints: Vec<f64>,
    pub covariate_sd: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_obs: 200,
            coefficients: vec![1.2],
            cutpoints: vec![-0.5, 1.5],
            covariate_sd: 1.0,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_obs == 0 {
            return Err(OrdinalError::InvalidConfig("n_obs must be positive".into()));
        }
        if self.coefficients.is_empty() {
            return Err(OrdinalError::InvalidConfig(
                "at least one coefficient is required".into(),
            ));
        }
        if !(self.covariate_sd > 0.0 && self.covariate_sd.is_finite()) {
            return Err(OrdinalError::InvalidConfig(format!(
                "covariate_sd must be positive and finite, got {}",
                self.covariate_sd
            )));
        }
        // the inverse transform only exists for strictly increasing input
        OrderedTransform::new(self.cutpoints.len())?.unconstrain(&self.cutpoints)?;
        Ok(())
    }
}

pub fn simulate(config: &SimulationConfig) -> Result<OrdinalData> {
    config.validate()?;

    // current ndarray-rand requires its own rand 0.8 rng
    let mut rng = StdRng::seed_from_u64(config.seed);
    let d = config.coefficients.len();

    let normal = Normal::new(0.0, config.covariate_sd)
        .map_err(|e| OrdinalError::InvalidConfig(e.to_string()))?;
    let x = Array2::random_using((config.n_obs, d), normal, &mut rng);
    let uniforms = Array1::random_using(config.n_obs, Uniform::new(0.0, 1.0), &mut rng);

    let beta = Array1::from_vec(config.coefficients.clone());
    let eta = x.dot(&beta);

    let y = Zip::from(&eta).and(&uniforms).map_collect(|&eta, &u| {
        OrderedLogistic::new(eta, &config.cutpoints).sample_with_uniform(u)
    });

    let data = OrdinalData::new(x, y, config.cutpoints.len() + 1)?;
    log::debug!(
        "simulated {} observations, class counts {:?}",
        data.n_obs(),
        data.class_counts()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_data() {
        let config = SimulationConfig::default();
        let a = simulate(&config).unwrap();
        let b = simulate(&config).unwrap();
        assert_eq!(a.x(), b.x());
        assert_eq!(a.y(), b.y());
        assert_eq!(a.n_classes(), 3);
    }

    #[test]
    fn every_class_appears_with_balanced_cutpoints() {
        let config = SimulationConfig {
            n_obs: 500,
            ..SimulationConfig::default()
        };
        let counts = simulate(&config).unwrap().class_counts();
        assert!(counts.iter().all(|&c| c > 0), "{counts:?}");
        assert_eq!(counts.iter().sum::<usize>(), 500);
    }

    #[test]
    fn rejects_unordered_cutpoints() {
        let config = SimulationConfig {
            cutpoints: vec![1.0, 0.0],
            ..SimulationConfig::default()
        };
        assert!(matches!(
            simulate(&config),
            Err(OrdinalError::NotStrictlyIncreasing { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_missing_cutpoints() {
        let config = SimulationConfig {
            cutpoints: vec![],
            ..SimulationConfig::default()
        };
        assert!(matches!(
            simulate(&config),
            Err(OrdinalError::InvalidClassCount { .. })
        ));
    }
}
