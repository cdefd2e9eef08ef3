//! Hold-out evaluation of the three classifiers.
//!
//! [`evaluate`] encodes the dataset, draws one shuffled split shared by all
//! three target tables, trains on the training rows and scores predictions
//! on the held-out rows. Alongside per-column accuracy it keeps a detailed
//! record of the first few test rows and tallies strict whole-group matches.

use crate::data::Dataset;
use crate::error::{HomeError, Result};
use crate::metrics::{accuracy, column_accuracies, rows_match};
use crate::model_selection::split_indices;
use crate::preprocessing::{DecodedFeatures, FeatureEncoder};
use crate::recommend::ModelBundle;
use crate::tree::ForestConfig;
use crate::vocab::{title_case, DEVICE_COLUMNS, LIGHT_COLUMNS};
use serde::Serialize;
use std::fmt;

const RULE: &str = "--------------------------------------------------";

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Fraction of rows held out (default 0.2)
    pub test_size: f64,
    /// Seed shared by the split (default 42)
    pub random_state: u64,
    /// Hyper-parameters for all three classifiers
    pub forest: ForestConfig,
    /// Test rows reported in detail (default 50)
    pub n_detailed_samples: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            forest: ForestConfig::default(),
            n_detailed_samples: 50,
        }
    }
}

impl EvalConfig {
    /// Fraction of rows held out for testing.
    #[must_use]
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Seeds both the split and the forests.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self.forest = self.forest.with_random_state(seed);
        self
    }

    /// Forest hyper-parameters shared by all three models.
    #[must_use]
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// How many test rows get a detailed report block.
    #[must_use]
    pub fn with_detailed_samples(mut self, n: usize) -> Self {
        self.n_detailed_samples = n;
        self
    }
}

/// Accuracy of one target column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAccuracy {
    pub column: String,
    pub accuracy: f32,
}

/// Inputs, actual values and predictions for one held-out row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleDetail {
    pub features: DecodedFeatures,
    pub actual_devices: Vec<usize>,
    pub predicted_devices: Vec<usize>,
    pub actual_lights: Vec<usize>,
    pub predicted_lights: Vec<usize>,
    pub actual_music: String,
    pub predicted_music: String,
    pub devices_match: bool,
    pub lights_match: bool,
    pub music_match: bool,
}

/// Detailed samples whose whole group prediction was right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchTally {
    pub devices: usize,
    pub lights: usize,
    pub music: usize,
}

/// Everything an evaluation run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub n_train: usize,
    pub n_test: usize,
    pub device_accuracy: Vec<ColumnAccuracy>,
    pub light_accuracy: Vec<ColumnAccuracy>,
    pub music_accuracy: f32,
    pub samples: Vec<SampleDetail>,
    pub matched: MatchTally,
}

impl EvaluationReport {
    /// Strict match rates over the detailed samples, in percent, as
    /// `(devices, lights, music)`.
    #[must_use]
    pub fn sample_match_percentages(&self) -> (f32, f32, f32) {
        if self.samples.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let n = self.samples.len() as f32;
        let pct = |count: usize| count as f32 / n * 100.0;
        (
            pct(self.matched.devices),
            pct(self.matched.lights),
            pct(self.matched.music),
        )
    }
}

fn labelled(columns: &[&str], accuracies: Vec<f32>) -> Vec<ColumnAccuracy> {
    columns
        .iter()
        .zip(accuracies)
        .map(|(column, accuracy)| ColumnAccuracy {
            column: (*column).to_string(),
            accuracy,
        })
        .collect()
}

/// Runs a full hold-out evaluation.
///
/// Feature encoders are fit on the whole dataset, so every test row can be
/// encoded. The music encoder only sees training rows.
///
/// # Errors
///
/// Returns an error if the dataset is too small to split, or training fails.
///
/// # Example
///
/// ```
/// use homeauto::prelude::*;
///
/// let dataset = homeauto::synthetic::generate(200, 3);
/// let config = EvalConfig::default()
///     .with_forest(ForestConfig::default().with_n_estimators(5))
///     .with_detailed_samples(10);
/// let report = evaluate(&dataset, &config).unwrap();
///
/// assert_eq!(report.n_train + report.n_test, 200);
/// assert_eq!(report.samples.len(), 10);
/// assert!((0.0..=1.0).contains(&report.music_accuracy));
/// ```
pub fn evaluate(dataset: &Dataset, config: &EvalConfig) -> Result<EvaluationReport> {
    if dataset.is_empty() {
        return Err(HomeError::EmptyData(
            "cannot evaluate on an empty dataset".to_string(),
        ));
    }

    let mut features = FeatureEncoder::new();
    let x = features.fit_transform(dataset)?;
    let devices = dataset.device_targets()?;
    let lights = dataset.light_targets()?;
    let music = dataset.music_targets();

    let split = split_indices(dataset.len(), config.test_size, Some(config.random_state))?;
    tracing::info!(n_train = split.n_train(), n_test = split.n_test(), "split dataset");

    let (x_train, x_test) = split.split_matrix(&x);
    let (devices_train, devices_test) = split.split_matrix(&devices);
    let (lights_train, lights_test) = split.split_matrix(&lights);
    let (music_train, music_test) = split.split_slice(&music);

    let bundle = ModelBundle::fit_encoded(
        features,
        &x_train,
        &devices_train,
        &lights_train,
        &music_train,
        &config.forest,
    )?;

    tracing::debug!(rows = x_test.n_rows(), "predicting held-out rows");
    let devices_pred = bundle.predict_devices(&x_test)?;
    let lights_pred = bundle.predict_lights(&x_test)?;
    let music_pred = bundle.predict_music(&x_test)?;
    let music_pred_refs: Vec<&str> = music_pred.iter().map(String::as_str).collect();

    let device_accuracy = labelled(&DEVICE_COLUMNS, column_accuracies(&devices_pred, &devices_test)?);
    let light_accuracy = labelled(&LIGHT_COLUMNS, column_accuracies(&lights_pred, &lights_test)?);
    let music_accuracy = accuracy(&music_pred_refs, &music_test)?;

    let n_detailed = config.n_detailed_samples.min(split.n_test());
    let mut matched = MatchTally::default();
    let mut samples = Vec::with_capacity(n_detailed);
    for i in 0..n_detailed {
        let devices_match = rows_match(&devices_pred, &devices_test, i);
        let lights_match = rows_match(&lights_pred, &lights_test, i);
        let music_match = music_pred[i] == music_test[i];
        matched.devices += usize::from(devices_match);
        matched.lights += usize::from(lights_match);
        matched.music += usize::from(music_match);

        samples.push(SampleDetail {
            features: bundle.features().decode_row(x_test.row(i))?,
            actual_devices: devices_test.row(i).to_vec(),
            predicted_devices: devices_pred.row(i).to_vec(),
            actual_lights: lights_test.row(i).to_vec(),
            predicted_lights: lights_pred.row(i).to_vec(),
            actual_music: music_test[i].to_string(),
            predicted_music: music_pred[i].clone(),
            devices_match,
            lights_match,
            music_match,
        });
    }

    Ok(EvaluationReport {
        n_train: split.n_train(),
        n_test: split.n_test(),
        device_accuracy,
        light_accuracy,
        music_accuracy,
        samples,
        matched,
    })
}

struct Labelled<'a>(&'a [&'a str], &'a [usize]);

impl fmt::Display for Labelled<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().zip(self.1).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{name}': {value}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Testing on {} samples", self.n_test)?;
        writeln!(f)?;
        writeln!(f, "Test Results:")?;
        writeln!(f, "{RULE}")?;

        writeln!(f)?;
        writeln!(f, "Device Control Accuracy:")?;
        for c in &self.device_accuracy {
            writeln!(f, "{}: {:.2}", title_case(&c.column), c.accuracy)?;
        }
        writeln!(f)?;
        writeln!(f, "Light Control Accuracy:")?;
        for c in &self.light_accuracy {
            writeln!(f, "{}: {:.2}", title_case(&c.column), c.accuracy)?;
        }
        writeln!(f)?;
        writeln!(f, "Music Type Prediction Accuracy: {:.2}", self.music_accuracy)?;

        let n = self.samples.len();
        writeln!(f)?;
        writeln!(f, "Detailed Examples (First {n} samples):")?;
        writeln!(f, "{RULE}")?;
        for (i, s) in self.samples.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Sample {}:", i + 1)?;
            writeln!(f, "Input Features:")?;
            writeln!(f, "Mood: {}", s.features.mood)?;
            writeln!(f, "Condition: {}", s.features.person_condition)?;
            writeln!(f, "Time of Day: {}", s.features.time_of_day)?;
            writeln!(f, "At Home: {}", s.features.at_home)?;
            writeln!(f, "Is Holiday: {}", s.features.is_holiday)?;
            writeln!(f)?;
            writeln!(f, "Actual values:")?;
            writeln!(f, "Devices: {}", Labelled(&DEVICE_COLUMNS, &s.actual_devices))?;
            writeln!(f, "Lights: {}", Labelled(&LIGHT_COLUMNS, &s.actual_lights))?;
            writeln!(f, "Music: {}", s.actual_music)?;
            writeln!(f)?;
            writeln!(f, "Predicted values:")?;
            writeln!(f, "Devices: {}", Labelled(&DEVICE_COLUMNS, &s.predicted_devices))?;
            writeln!(f, "Lights: {}", Labelled(&LIGHT_COLUMNS, &s.predicted_lights))?;
            writeln!(f, "Music: {}", s.predicted_music)?;
        }

        let (devices, lights, music) = self.sample_match_percentages();
        writeln!(f)?;
        writeln!(f, "Accuracy for the {n} detailed samples:")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Devices: {devices:.2}%")?;
        writeln!(f, "Lights: {lights:.2}%")?;
        write!(f, "Music: {music:.2}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    fn quick_config() -> EvalConfig {
        EvalConfig::default().with_forest(ForestConfig::default().with_n_estimators(10))
    }

    #[test]
    fn test_evaluate_shapes() {
        let ds = synthetic::generate(250, 11);
        let report = evaluate(&ds, &quick_config()).expect("evaluate");
        assert_eq!(report.n_test, 50);
        assert_eq!(report.n_train, 200);
        assert_eq!(report.device_accuracy.len(), 6);
        assert_eq!(report.light_accuracy.len(), 4);
        assert_eq!(report.samples.len(), 50);
        for c in report.device_accuracy.iter().chain(&report.light_accuracy) {
            assert!((0.0..=1.0).contains(&c.accuracy), "{}: {}", c.column, c.accuracy);
        }
    }

    #[test]
    fn test_detailed_samples_capped_by_test_rows() {
        let ds = synthetic::generate(60, 2);
        let report = evaluate(&ds, &quick_config()).expect("evaluate");
        assert_eq!(report.n_test, 12);
        assert_eq!(report.samples.len(), 12);
    }

    #[test]
    fn test_group_match_is_strict() {
        let ds = synthetic::generate(200, 4);
        let report = evaluate(&ds, &quick_config()).expect("evaluate");
        for s in &report.samples {
            assert_eq!(s.devices_match, s.actual_devices == s.predicted_devices);
            assert_eq!(s.lights_match, s.actual_lights == s.predicted_lights);
        }
        let strict = report.samples.iter().filter(|s| s.devices_match).count();
        assert_eq!(report.matched.devices, strict);
    }

    #[test]
    fn test_evaluate_is_reproducible() {
        let ds = synthetic::generate(150, 9);
        let a = evaluate(&ds, &quick_config()).expect("evaluate");
        let b = evaluate(&ds, &quick_config()).expect("evaluate");
        assert_eq!(a, b);
    }

    #[test]
    fn test_learns_synthetic_rules() {
        let ds = synthetic::generate(600, 13);
        let report = evaluate(&ds, &quick_config()).expect("evaluate");
        let mean = report.device_accuracy.iter().map(|c| c.accuracy).sum::<f32>()
            / report.device_accuracy.len() as f32;
        assert!(mean > 0.8, "mean device accuracy {mean}");
    }

    #[test]
    fn test_report_rendering() {
        let ds = synthetic::generate(100, 6);
        let report = evaluate(&ds, &quick_config().with_detailed_samples(2)).expect("evaluate");
        let text = report.to_string();
        assert!(text.starts_with("Testing on 20 samples"));
        assert!(text.contains("Watch Tv: "));
        assert!(text.contains("Sample 2:"));
        assert!(!text.contains("Sample 3:"));
        assert!(text.contains("Accuracy for the 2 detailed samples:"));
    }

    #[test]
    fn test_evaluate_rejects_tiny_dataset() {
        let ds = synthetic::generate(1, 0);
        assert!(evaluate(&ds, &quick_config()).is_err());
        let empty: Dataset = std::iter::empty().collect();
        assert!(matches!(
            evaluate(&empty, &quick_config()),
            Err(HomeError::EmptyData(_))
        ));
    }
}
