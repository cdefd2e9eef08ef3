//! Evaluate command: hold-out accuracy report for a dataset.

use super::require_file;
use crate::error::Result;
use crate::output;
use homeauto::data::Dataset;
use homeauto::evaluation::{evaluate, EvalConfig, EvaluationReport};
use homeauto::tree::ForestConfig;
use homeauto::vocab::title_case;
use std::path::Path;

/// Flags for `homeauto evaluate`.
#[derive(Debug, Clone)]
pub(crate) struct EvaluateOptions {
    pub seed: u64,
    pub trees: usize,
    pub samples: usize,
    pub test_size: f64,
}

impl EvaluateOptions {
    fn to_config(&self) -> EvalConfig {
        EvalConfig::default()
            .with_forest(ForestConfig::default().with_n_estimators(self.trees))
            .with_random_state(self.seed)
            .with_test_size(self.test_size)
            .with_detailed_samples(self.samples)
    }
}

pub(crate) fn run(path: &Path, options: &EvaluateOptions, json: bool) -> Result<()> {
    require_file(path)?;
    let dataset = Dataset::from_path(path)?;
    let config = options.to_config();
    config.forest.validate()?;

    if !json {
        output::info(&format!(
            "training {} trees per forest on {} rows",
            options.trees,
            dataset.len()
        ));
    }
    let report = evaluate(&dataset, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &EvaluationReport) {
    output::section("Summary");
    output::kv("Train rows", report.n_train);
    output::kv("Test rows", report.n_test);
    for c in report.device_accuracy.iter().chain(&report.light_accuracy) {
        output::kv(&title_case(&c.column), output::accuracy(c.accuracy));
    }
    output::kv("Music Type", output::accuracy(report.music_accuracy));

    let (devices, lights, music) = report.sample_match_percentages();
    output::kv(
        "Strict sample match",
        format!("devices {devices:.2}%, lights {lights:.2}%, music {music:.2}%"),
    );
    if report.music_accuracy < 0.5 {
        output::warning("music accuracy is below 0.5; the dataset may be too small");
    }
}
