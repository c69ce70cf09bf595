use ndarray::array;
use ordinal_nuts::{
    OrdinalRegression, Posterior, ProbabilisticModel, Result, SamplerConfig, SimulationConfig,
    run_nuts, simulate,
};

fn main() -> Result<()> {
    // three ordered classes driven by a single covariate
    let truth = SimulationConfig {
        n_obs: 300,
        coefficients: vec![1.2],
        cutpoints: vec![-0.11, 2.18],
        ..SimulationConfig::default()
    };
    let data = simulate(&truth)?;
    println!("Class counts: {:?}", data.class_counts());

    // ordered cutpoints with no other prior information
    let model = OrdinalRegression::new(data)?;
    let initial_position = model.initial_position()?;
    println!("Parameters: {}", model.dim());

    let config = SamplerConfig::default().with_num_tune(1000).with_num_draws(1000);
    let trace = run_nuts(model.clone(), &config, &initial_position)?;

    let posterior = Posterior::from_traces(&model, &[trace])?;
    println!("Posterior mean coefficients: {:.3}", posterior.coefficient_means());
    println!("Posterior mean cutpoints: {:.3}", posterior.cutpoint_means());
    println!("Divergences: {}", posterior.divergences);

    for x in [-2.0, 0.0, 2.0] {
        let probs = posterior.predict_proba(array![x].view())?;
        println!("P(Y = k | x = {x:+.1}): {:.3}", probs);
    }
    Ok(())
}
