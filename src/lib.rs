pub mod config;
pub mod data;
pub mod error;
pub mod link;
pub mod model;
pub mod ordered_logistic;
pub mod posterior;
pub mod simulate;
pub mod transform;

use std::fmt::Debug;

use ndarray::{Array1, Array2, ArrayViewMut1};
use nuts_rs::{Chain, CpuLogpFunc, CpuMath, Settings};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

pub use config::SamplerConfig;
pub use data::OrdinalData;
pub use error::{OrdinalError, PosteriorLogpError, Result};
pub use model::{CutpointPrior, OrdinalRegression, Params, Prior};
pub use ordered_logistic::OrderedLogistic;
pub use posterior::Posterior;
pub use simulate::{SimulationConfig, simulate};
pub use transform::{OrderedTransform, Transform};

/// A differentiable log-density over an unconstrained position.
pub trait ProbabilisticModel {
    fn dim(&self) -> usize;
    fn value(&self, position: &Array1<f64>) -> f64;
    fn grad(&self, position: &Array1<f64>) -> Array1<f64>;

    /// Log-density with its gradient written into `grad`. Models that share
    /// work between the two should override this; the sampler only calls it.
    fn value_and_grad(&self, position: &[f64], grad: &mut [f64]) -> f64 {
        let w = Array1::from(position.to_vec());
        ArrayViewMut1::from(grad).assign(&self.grad(&w));
        self.value(&w)
    }
}

/// Post-warmup draws of one chain, one row per draw, in unconstrained space.
#[derive(Debug, Clone)]
pub struct Trace {
    pub chain: u64,
    pub draws: Array2<f64>,
    pub divergences: u64,
}

/// Runs one seeded chain from `initial_position`.
///
/// nuts-rs rejects a start at which any gradient component is exactly zero
/// (for example the mode of a symmetric density), so start slightly off it.
pub fn run_nuts<M: ProbabilisticModel>(
    model: M,
    config: &SamplerConfig,
    initial_position: &[f64],
) -> Result<Trace> {
    check_run(&model, config, initial_position)?;
    run_chain(model, config, 0, initial_position)
}

/// Runs `n_chains` independent chains on the rayon pool. Chain `i` is seeded
/// with `config.seed + i`. `initial_position` has the same nonzero-gradient
/// requirement as in [`run_nuts`].
pub fn run_chains<M>(
    model: &M,
    config: &SamplerConfig,
    initial_position: &[f64],
    n_chains: u64,
) -> Result<Vec<Trace>>
where
    M: ProbabilisticModel + Clone + Sync,
{
    check_run(model, config, initial_position)?;
    if n_chains == 0 {
        return Err(OrdinalError::InvalidConfig("n_chains must be positive".into()));
    }
    (0..n_chains)
        .into_par_iter()
        .map(|chain| run_chain(model.clone(), config, chain, initial_position))
        .collect()
}

fn check_run<M: ProbabilisticModel>(
    model: &M,
    config: &SamplerConfig,
    initial_position: &[f64],
) -> Result<()> {
    config.validate()?;
    if initial_position.len() != model.dim() {
        return Err(OrdinalError::DimensionMismatch {
            what: "initial position",
            expected: model.dim(),
            got: initial_position.len(),
        });
    }
    Ok(())
}

fn run_chain<M: ProbabilisticModel>(
    model: M,
    config: &SamplerConfig,
    chain: u64,
    initial_position: &[f64],
) -> Result<Trace> {
    let dim = model.dim();
    let settings = config.to_settings();
    let kernel = CPUKernel::new(model);
    let math = CpuMath::new(kernel);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(chain));
    let mut sampler = settings.new_chain(chain, math, &mut rng);

    log::info!(
        "chain {chain}: {} tuning + {} draws, dim {dim}",
        config.num_tune,
        config.num_draws
    );
    sampler.set_position(initial_position)?;

    for _ in 0..config.num_tune {
        sampler.draw()?;
    }

    let mut trace = Vec::with_capacity(config.num_draws as usize * dim); // Collection of all draws
    let mut divergences = 0;
    for _ in 0..config.num_draws {
        let (draw, info) = sampler.draw()?;
        if info.diverging {
            divergences += 1;
        }
        trace.extend_from_slice(&draw);
    }

    if divergences > 0 {
        log::warn!("chain {chain}: {divergences} divergent transitions after tuning");
    }
    log::info!("chain {chain}: finished");

    // convert trace to Array2
    let draws = Array2::from_shape_vec((config.num_draws as usize, dim), trace)?;
    Ok(Trace {
        chain,
        draws,
        divergences,
    })
}

struct CPUKernel<M: ProbabilisticModel> {
    model: M,
}

impl<M: ProbabilisticModel> CPUKernel<M> {
    fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ProbabilisticModel> Debug for CPUKernel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPUKernel").field("dim", &self.model.dim()).finish()
    }
}

impl<M: ProbabilisticModel> CpuLogpFunc for CPUKernel<M> {
    type LogpError = PosteriorLogpError;

    // Only used for transforming adaptation.
    type TransformParams = ();

    fn dim(&self) -> usize {
        self.model.dim()
    }

    fn logp(
        &mut self,
        position: &[f64],
        grad: &mut [f64],
    ) -> std::result::Result<f64, Self::LogpError> {
        let logp = self.model.value_and_grad(position, grad);
        if !logp.is_finite() {
            log::debug!("rejecting position with log density {logp}");
            return Err(PosteriorLogpError::NonFinite(logp));
        }
        Ok(logp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct StandardNormal {
        dim: usize,
    }

    impl ProbabilisticModel for StandardNormal {
        fn dim(&self) -> usize {
            self.dim
        }

        fn value(&self, position: &Array1<f64>) -> f64 {
            -0.5 * position.dot(position)
        }

        fn grad(&self, position: &Array1<f64>) -> Array1<f64> {
            -position
        }
    }

    fn short_run() -> SamplerConfig {
        SamplerConfig::default().with_num_tune(200).with_num_draws(400)
    }

    #[test]
    fn default_value_and_grad_delegates() {
        let model = StandardNormal { dim: 2 };
        let mut grad = [0.0; 2];
        let value = model.value_and_grad(&[1.0, -2.0], &mut grad);
        assert_eq!(value, -2.5);
        assert_eq!(grad, [-1.0, 2.0]);
    }

    #[test]
    fn run_nuts_shapes_and_determinism() {
        let model = StandardNormal { dim: 3 };
        let start = [0.5, -0.3, 0.2];
        let a = run_nuts(model.clone(), &short_run(), &start).unwrap();
        let b = run_nuts(model, &short_run(), &start).unwrap();
        assert_eq!(a.draws.dim(), (400, 3));
        assert_eq!(a.draws, b.draws);
    }

    #[test]
    fn run_nuts_checks_inputs() {
        let model = StandardNormal { dim: 3 };
        assert!(matches!(
            run_nuts(model.clone(), &short_run(), &[0.0; 2]),
            Err(OrdinalError::DimensionMismatch { expected: 3, got: 2, .. })
        ));
        assert!(matches!(
            run_nuts(model, &short_run().with_num_draws(0), &[0.0; 3]),
            Err(OrdinalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_gradient_start_is_a_sampler_error() {
        let model = StandardNormal { dim: 2 };
        assert!(matches!(
            run_nuts(model.clone(), &short_run(), &[0.0; 2]),
            Err(OrdinalError::Sampler(_))
        ));
        assert!(matches!(
            run_chains(&model, &short_run(), &[0.0, 1.0], 2),
            Err(OrdinalError::Sampler(_))
        ));
    }

    #[test]
    fn chains_are_independently_seeded() {
        let model = StandardNormal { dim: 2 };
        let traces = run_chains(&model, &short_run(), &[0.5, -0.3], 3).unwrap();
        assert_eq!(traces.len(), 3);
        assert_eq!(
            traces.iter().map(|t| t.chain).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_ne!(traces[0].draws, traces[1].draws);

        let mean = traces[0].draws.mean_axis(ndarray::Axis(0)).unwrap();
        for m in mean.iter() {
            assert!(m.abs() < 0.3, "chain mean {m} too far from 0");
        }
    }
}
