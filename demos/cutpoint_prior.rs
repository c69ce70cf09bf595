//! Ordinal regression with a Normal prior placed directly on the ordered
//! cutpoints, sampled with four chains in parallel.
//!
//! The Normal density is evaluated on the cutpoints after the ordering
//! transform and simply added to the log-density. It is not renormalised for
//! the ordered region, so the prior is unnormalised on purpose.

use ndarray::{Axis, array};
use ordinal_nuts::{
    CutpointPrior, OrdinalRegression, Posterior, Prior, Result, SamplerConfig, SimulationConfig,
    run_chains, simulate,
};

fn main() -> Result<()> {
    let truth = SimulationConfig {
        n_obs: 150,
        coefficients: vec![0.9, -0.6],
        cutpoints: vec![-1.5, -0.2, 1.0, 2.4],
        seed: 7,
        ..SimulationConfig::default()
    };
    let data = simulate(&truth)?;
    println!("Class counts: {:?}", data.class_counts());

    let model = OrdinalRegression::new(data)?
        .with_coefficient_prior(Prior::Normal { mu: 0.0, sigma: 2.0 })?
        .with_cutpoint_prior(CutpointPrior::Normal {
            mu: vec![-2.0, -0.5, 0.5, 2.0],
            sigma: 1.0,
        })?
        .with_parallel(true);

    let config = SamplerConfig::default().with_num_tune(500).with_num_draws(500);
    let traces = run_chains(&model, &config, &model.initial_position()?, 4)?;
    for trace in &traces {
        let mean = trace.draws.sum_axis(Axis(0)) / trace.draws.nrows() as f64;
        println!("chain {} mean (unconstrained): {:.3}", trace.chain, mean);
    }

    let posterior = Posterior::from_traces(&model, &traces)?;
    println!("True coefficients: {:?}", truth.coefficients);
    println!("Posterior mean coefficients: {:.3}", posterior.coefficient_means());
    println!("True cutpoints: {:?}", truth.cutpoints);
    println!("Posterior mean cutpoints: {:.3}", posterior.cutpoint_means());
    println!("Divergences: {}", posterior.divergences);

    let probs = posterior.predict_proba(array![1.0, -1.0].view())?;
    println!("P(Y = k | x = [1, -1]): {:.3}", probs);
    Ok(())
}
