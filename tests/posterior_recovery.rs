//! End-to-end: simulate ordinal data, sample with NUTS, recover the truth.

use ordinal_nuts::{
    CutpointPrior, OrdinalRegression, Posterior, ProbabilisticModel, SamplerConfig,
    SimulationConfig, run_chains, run_nuts, simulate,
};

fn truth() -> SimulationConfig {
    SimulationConfig {
        n_obs: 400,
        coefficients: vec![1.2],
        cutpoints: vec![-0.5, 1.5],
        seed: 11,
        ..SimulationConfig::default()
    }
}

fn config() -> SamplerConfig {
    SamplerConfig::default().with_num_tune(400).with_num_draws(400).with_seed(3)
}

#[test]
fn flat_cutpoints_recover_parameters() {
    let truth = truth();
    let model = OrdinalRegression::new(simulate(&truth).unwrap()).unwrap();
    let trace = run_nuts(model.clone(), &config(), &model.initial_position().unwrap()).unwrap();
    assert_eq!(trace.draws.dim(), (400, model.dim()));

    let posterior = Posterior::from_traces(&model, &[trace]).unwrap();
    for row in posterior.cutpoints.outer_iter() {
        assert!(row[0] < row[1], "unordered draw {row}");
    }

    let beta = posterior.coefficient_means();
    let cutpoints = posterior.cutpoint_means();
    assert!((beta[0] - 1.2).abs() < 0.4, "beta mean {beta}");
    assert!((cutpoints[0] + 0.5).abs() < 0.5, "cutpoint means {cutpoints}");
    assert!((cutpoints[1] - 1.5).abs() < 0.5, "cutpoint means {cutpoints}");
}

#[test]
fn normal_cutpoint_prior_with_parallel_chains() {
    let model = OrdinalRegression::new(simulate(&truth()).unwrap())
        .unwrap()
        .with_cutpoint_prior(CutpointPrior::Normal {
            mu: vec![-1.0, 1.0],
            sigma: 1.0,
        })
        .unwrap()
        .with_parallel(true);

    let traces = run_chains(&model, &config(), &model.initial_position().unwrap(), 2).unwrap();
    let posterior = Posterior::from_traces(&model, &traces).unwrap();
    assert_eq!(posterior.n_draws(), 800);

    let beta = posterior.coefficient_means();
    assert!((beta[0] - 1.2).abs() < 0.4, "beta mean {beta}");

    let probs = posterior.predict_proba(ndarray::array![0.0].view()).unwrap();
    assert!((probs.sum() - 1.0).abs() < 1e-9);
    // with eta = 0 the middle class straddles 0 and holds the most mass
    assert!(probs[1] > probs[0] && probs[1] > probs[2], "{probs}");
}
