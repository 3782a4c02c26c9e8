use faer::Mat;
use marginal_two_part::{
    EvaluationOptions, ParameterVector, SimulationOptions, TwoPartParameters, evaluate,
    evaluate_gradient, evaluate_with_options, outcome_diagnostics,
    reference_negative_log_likelihood, simulate_marginal_two_part,
};

fn main() {
    let truth = TwoPartParameters::new(vec![0.4, -0.6], vec![1.0, 0.35], 0.7_f64.ln());
    let input = simulate_marginal_two_part(
        &truth,
        SimulationOptions {
            rows: 500,
            seed: 2024,
            random_weights: true,
        },
    )
    .expect("simulate");

    let diagnostics = outcome_diagnostics(&input.outcome).expect("diagnostics");
    println!(
        "rows: {}, zeros: {}, positive share: {:.3}, sd(ln y | y > 0): {:.3}",
        diagnostics.n_rows,
        diagnostics.n_zero,
        diagnostics.positive_share,
        diagnostics.log_positive_sd.unwrap_or(f64::NAN)
    );

    let weights = input
        .sample_weights
        .clone()
        .unwrap_or_else(|| Mat::from_fn(input.n_rows(), 1, |_row, _col| 1.0));
    let start = TwoPartParameters::new(vec![0.0, 0.0], vec![0.0, 0.0], 0.0);
    let labels = ["(Intercept)", "x"];
    let parameters = ParameterVector::from_parts(&labels, &labels, &start).expect("labels");

    let nll = evaluate(
        &parameters,
        &input.outcome,
        &input.zero_design,
        &input.mean_design,
        &weights,
    )
    .expect("evaluate");
    let reference = reference_negative_log_likelihood(
        &start,
        &input.outcome,
        &input.zero_design,
        &input.mean_design,
        &weights,
    );
    println!("nll at zero: {nll:.6} (reference {reference:.6})");

    let parallel = evaluate_with_options(
        &parameters,
        &input.outcome,
        &input.zero_design,
        &input.mean_design,
        &weights,
        EvaluationOptions {
            threads: 4,
            min_rows_per_thread: 64,
            skip_zero_weights: false,
        },
    )
    .expect("parallel evaluate");
    println!("parallel nll: {parallel:.6}");

    let gradient = evaluate_gradient(
        &parameters,
        &input.outcome,
        &input.zero_design,
        &input.mean_design,
        &weights,
    )
    .expect("gradient");
    for entry in gradient.entries() {
        println!("d/d{}: {:.4}", entry.name, entry.value);
    }

    let predictions = truth
        .predict(&input.zero_design, &input.mean_design)
        .expect("predict");
    println!(
        "first row: Pr(y > 0) = {:.3}, E[y] = {:.3}",
        predictions.prob_positive[(0, 0)],
        predictions.marginal_mean[(0, 0)]
    );
}
