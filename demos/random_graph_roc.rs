//! ROC sweep on random sparse graphs
//!
//! Repeats generate -> sample -> glasso path -> score and prints the mean
//! and 10th/90th percentile of the true/false positive rates per penalty.
//!
//! Run with `RUST_LOG=glasso_roc=info` to see progress.

use glasso_roc::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let p = 20;
    let config = ExperimentConfig::random(p, 100, 0.1)
        .repetitions(50)
        .seed(2024)
        .threshold(1e-4)
        .build()?;
    let path = RegularizationPath::geometric(0.1 / p as f64, 0.5, 12)?;

    println!("=== glasso ROC on random graphs ===\n");
    let json = serde_json::to_string_pretty(&config).map_err(std::io::Error::from)?;
    println!("{json}\n");

    let result = run(&config, &path, &Glasso::default())?;

    println!(
        "{:>8}  {:>6} [{:>6}, {:>6}]  {:>6} [{:>6}, {:>6}]",
        "rho", "tpr", "q10", "q90", "fpr", "q10", "q90"
    );
    for row in &result.summaries {
        println!(
            "{:>8.4}  {:>6.3} [{:>6.3}, {:>6.3}]  {:>6.3} [{:>6.3}, {:>6.3}]",
            row.rho, row.tpr.mean, row.tpr.q10, row.tpr.q90, row.fpr.mean, row.fpr.q10, row.fpr.q90
        );
    }

    println!();
    write_summary_csv(std::io::stdout().lock(), &result.summaries)?;
    Ok(())
}
