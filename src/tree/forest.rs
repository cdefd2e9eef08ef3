//! Random Forest classifier - an ensemble of decision trees.

use super::DecisionTreeClassifier;
use crate::error::{HomeError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Every feature at every split.
    All,
    /// `ceil(sqrt(n_features))`, the usual classification default.
    Sqrt,
    /// A fixed count (clamped to `1..=n_features`).
    Count(usize),
}

impl MaxFeatures {
    /// Resolves to a concrete count for `n_features` columns.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyper-parameters shared by every classifier in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth per tree (`None` = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Features examined per split
    pub max_features: MaxFeatures,
    /// Seed for bootstrap and feature sampling (`None` = nondeterministic)
    pub random_state: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            random_state: Some(42),
        }
    }
}

impl ForestConfig {
    /// Sets the number of trees.
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the minimum number of samples needed to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Sets the per-split feature budget.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Checks the hyper-parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_estimators` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(HomeError::InvalidHyperparameter {
                param: "n_estimators".to_string(),
                value: "0".to_string(),
                constraint: "at least 1 tree".to_string(),
            });
        }
        Ok(())
    }
}

/// Random Forest classifier.
///
/// Combines multiple decision trees trained on bootstrap samples
/// with random feature selection to reduce overfitting and improve accuracy.
/// Predictions are a majority vote; ties go to the smallest class index.
///
/// # Example
///
/// ```
/// use homeauto::primitives::Matrix;
/// use homeauto::tree::{ForestConfig, RandomForestClassifier};
///
/// let x = Matrix::from_vec(6, 1, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]).expect("valid");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut forest = RandomForestClassifier::new(ForestConfig::default().with_n_estimators(15));
/// forest.fit(&x, &y).expect("fit");
/// assert_eq!(forest.predict(&x).expect("fitted"), y);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    config: ForestConfig,
    n_classes: usize,
}

impl RandomForestClassifier {
    /// Creates an unfitted forest.
    #[must_use]
    pub fn new(config: ForestConfig) -> Self {
        Self {
            trees: Vec::new(),
            config,
            n_classes: 0,
        }
    }

    /// Hyper-parameters this forest was built with.
    #[must_use]
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of classes seen during fit (`max label + 1`).
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Fits the random forest to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if the hyper-parameters are invalid or the data is
    /// empty or misaligned.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        self.config.validate()?;
        let (n_samples, n_features) = x.shape();
        if n_samples != y.len() {
            return Err(HomeError::DimensionMismatch {
                expected: format!("{n_samples} labels"),
                actual: format!("{} labels", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(HomeError::EmptyData(
                "cannot fit a random forest with zero samples".to_string(),
            ));
        }

        let max_features = self.config.max_features.resolve(n_features);
        let mut trees = Vec::with_capacity(self.config.n_estimators);

        // Train each tree on a bootstrap sample
        for i in 0..self.config.n_estimators {
            let seed = self.config.random_state.map(|s| s.wrapping_add(i as u64));
            let bootstrap_indices = bootstrap_sample(n_samples, seed);

            let mut tree = DecisionTreeClassifier::new()
                .with_min_samples_split(self.config.min_samples_split)
                .with_max_features(max_features);
            if let Some(max_depth) = self.config.max_depth {
                tree = tree.with_max_depth(max_depth);
            }
            if let Some(s) = seed {
                tree = tree.with_random_state(s ^ FEATURE_SEED_MIX);
            }

            tree.fit_rows(x, y, bootstrap_indices)?;
            trees.push(tree);
        }

        self.trees = trees;
        self.n_classes = y.iter().copied().max().map_or(1, |m| m + 1);
        tracing::debug!(
            trees = self.trees.len(),
            samples = n_samples,
            classes = self.n_classes,
            max_features,
            "fitted random forest"
        );
        Ok(())
    }

    /// Makes predictions for input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is unfitted or rows have the wrong width.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        (0..x.n_rows()).map(|r| self.predict_row(x.row(r))).collect()
    }

    /// Majority vote for one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is unfitted or the row has the wrong width.
    pub fn predict_row(&self, sample: &[f32]) -> Result<usize> {
        let votes = self.votes(sample)?;
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }

    fn votes(&self, sample: &[f32]) -> Result<Vec<usize>> {
        if self.trees.is_empty() {
            return Err(HomeError::NotFitted("RandomForestClassifier"));
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let class = tree.predict_row(sample)?;
            *votes.get_mut(class).ok_or_else(|| HomeError::UnknownLabel {
                column: "forest vote".to_string(),
                label: format!("class {class} of {}", self.n_classes),
            })? += 1;
        }
        Ok(votes)
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

/// Decorrelates a tree's feature-sampling stream from its bootstrap stream.
const FEATURE_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Creates a bootstrap sample (random sample with replacement).
///
/// Returns indices of samples to include in the bootstrap sample.
fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;

    let dist = Uniform::from(0..n_samples);

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
    } else {
        let mut rng = rand::thread_rng();
        (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Matrix<f32>, Vec<usize>) {
        let mut data = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f32 * 0.1;
            data.extend([jitter, 1.0 - jitter, 0.0]);
            y.push(0);
            data.extend([5.0 + jitter, 6.0 - jitter, 1.0]);
            y.push(1);
        }
        (Matrix::from_vec(40, 3, data).expect("valid"), y)
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(5), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(4), 2);
        assert_eq!(MaxFeatures::All.resolve(5), 5);
        assert_eq!(MaxFeatures::Count(9).resolve(5), 5);
        assert_eq!(MaxFeatures::Count(0).resolve(5), 1);
    }

    #[test]
    fn test_default_config() {
        let config = ForestConfig::default();
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.random_state, Some(42));
        assert_eq!(config.max_features, MaxFeatures::Sqrt);
    }

    #[test]
    fn test_fit_separable() {
        let (x, y) = two_blobs();
        let mut forest = RandomForestClassifier::new(ForestConfig::default().with_n_estimators(20));
        forest.fit(&x, &y).expect("fit");
        assert_eq!(forest.n_trees(), 20);
        assert_eq!(forest.n_classes(), 2);
        let predicted = forest.predict(&x).expect("fitted");
        assert!(crate::metrics::accuracy(&predicted, &y).expect("same length") > 0.95);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let (x, y) = two_blobs();
        let config = ForestConfig::default().with_n_estimators(10).with_random_state(7);
        let mut a = RandomForestClassifier::new(config.clone());
        let mut b = RandomForestClassifier::new(config);
        a.fit(&x, &y).expect("fit");
        b.fit(&x, &y).expect("fit");
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = two_blobs();
        let mut forest = RandomForestClassifier::new(ForestConfig::default().with_n_estimators(0));
        assert!(matches!(
            forest.fit(&x, &y),
            Err(HomeError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_predict_unfitted() {
        let forest = RandomForestClassifier::default();
        assert!(matches!(
            forest.predict_row(&[0.0, 0.0, 0.0]),
            Err(HomeError::NotFitted(_))
        ));
    }

    #[test]
    fn test_bootstrap_sample_in_range() {
        let idx = bootstrap_sample(50, Some(1));
        assert_eq!(idx.len(), 50);
        assert!(idx.iter().all(|&i| i < 50));
        assert_eq!(idx, bootstrap_sample(50, Some(1)));
    }
}
