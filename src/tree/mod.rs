//! Decision tree algorithms and ensemble methods.
//!
//! This module implements:
//! - CART (Classification and Regression Trees) using Gini impurity
//! - Random Forest ensemble classifier
//! - A multi-output wrapper fitting one forest per target column
//!
//! # Example
//!
//! ```
//! use homeauto::primitives::Matrix;
//! use homeauto::tree::DecisionTreeClassifier;
//!
//! // Training data (simple 2D binary classification)
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 0
//!     1.0, 0.0,  // class 1
//!     1.0, 1.0,  // class 1
//! ]).expect("valid matrix");
//! let y = vec![0, 0, 1, 1];
//!
//! let mut tree = DecisionTreeClassifier::new().with_max_depth(3);
//! tree.fit(&x, &y).expect("fit should succeed");
//! assert_eq!(tree.predict(&x).expect("fitted"), y);
//! ```

mod forest;
mod multi_output;

pub use forest::{ForestConfig, MaxFeatures, RandomForestClassifier};
pub use multi_output::MultiOutputClassifier;

use crate::error::{HomeError, Result};
use crate::primitives::Matrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Internal node in a decision tree.
///
/// Contains a split condition (feature and threshold) and pointers to
/// left and right subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<TreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<TreeNode>,
}

/// Leaf node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Predicted class label for this leaf
    pub class_label: usize,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// A node in a decision tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with class prediction
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(n) => 1 + n.left.depth().max(n.right.depth()),
        }
    }

    /// Walks to a leaf; a split on a feature the sample lacks is an error.
    fn classify(&self, sample: &[f32]) -> Result<usize> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf.class_label),
                TreeNode::Node(internal) => {
                    let value = sample.get(internal.feature_idx).ok_or_else(|| {
                        HomeError::DimensionMismatch {
                            expected: format!("feature {}", internal.feature_idx),
                            actual: format!("{} features", sample.len()),
                        }
                    })?;
                    node = if *value <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

/// Decision tree classifier using the CART algorithm.
///
/// Uses Gini impurity for splitting criterion and builds trees recursively.
/// When `max_features` is set, each node considers a random subset of the
/// features, which is how the forest decorrelates its trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: Option<usize>,
    random_state: Option<u64>,
    /// Number of features the model was trained on (for validation)
    n_features: Option<usize>,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            random_state: None,
            n_features: None,
        }
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Nodes with fewer samples than this become leaves.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Number of features examined at each split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Seed for feature subsampling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Fits the decision tree to training data.
    ///
    /// # Arguments
    ///
    /// * `x` - Training features (n_samples × n_features)
    /// * `y` - Training labels (n_samples class indices)
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` disagree in length or are empty.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        self.fit_rows(x, y, indices)
    }

    /// Fits on the rows of `x` named by `rows`; repeated indices count as
    /// repeated samples.
    pub(crate) fn fit_rows(&mut self, x: &Matrix<f32>, y: &[usize], rows: Vec<usize>) -> Result<()> {
        let (n_rows, n_cols) = x.shape();
        if n_rows != y.len() {
            return Err(HomeError::DimensionMismatch {
                expected: format!("{n_rows} labels"),
                actual: format!("{} labels", y.len()),
            });
        }
        if rows.is_empty() {
            return Err(HomeError::EmptyData(
                "cannot fit a decision tree with zero samples".to_string(),
            ));
        }
        if n_cols == 0 {
            return Err(HomeError::EmptyData(
                "cannot fit a decision tree with zero features".to_string(),
            ));
        }

        let n_classes = y.iter().copied().max().map_or(1, |m| m + 1);
        let mut builder = TreeBuilder {
            x,
            y,
            n_classes,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: self.max_features.map(|m| m.min(n_cols)),
            rng: StdRng::seed_from_u64(self.random_state.unwrap_or_else(rand::random)),
        };
        self.n_features = Some(n_cols);
        self.tree = Some(builder.build(rows, 0));
        Ok(())
    }

    /// Predicts class labels for samples.
    ///
    /// # Errors
    ///
    /// Returns an error if called before `fit` or if the feature count
    /// differs from the training data.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        (0..x.n_rows()).map(|row| self.predict_row(x.row(row))).collect()
    }

    /// Predicts the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns an error if called before `fit` or if the sample is too short.
    pub fn predict_row(&self, sample: &[f32]) -> Result<usize> {
        let tree = self
            .tree
            .as_ref()
            .ok_or(HomeError::NotFitted("DecisionTreeClassifier"))?;
        if let Some(expected) = self.n_features {
            if sample.len() != expected {
                return Err(HomeError::DimensionMismatch {
                    expected: format!("{expected} features"),
                    actual: format!("{} features", sample.len()),
                });
            }
        }
        tree.classify(sample)
    }

    /// Depth of the fitted tree, `None` before fit.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(TreeNode::depth)
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for tree building

/// Calculate Gini impurity from per-class counts.
///
/// Formula: Gini = 1 - Σ(p_i²) where p_i is the proportion of class i
fn gini_from_counts(counts: &[usize], total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f32;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f32 / n;
            p * p
        })
        .sum::<f32>()
}

/// Most frequent class; ties go to the smallest class index.
fn majority_from_counts(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// Recursive CART construction over row indices of a shared matrix.
struct TreeBuilder<'a> {
    x: &'a Matrix<f32>,
    y: &'a [usize],
    n_classes: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: Option<usize>,
    rng: StdRng,
}

/// Best split found for a node.
struct Split {
    feature_idx: usize,
    threshold: f32,
    gain: f32,
}

impl TreeBuilder<'_> {
    fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &r in rows {
            counts[self.y[r]] += 1;
        }
        counts
    }

    fn build(&mut self, rows: Vec<usize>, depth: usize) -> TreeNode {
        let counts = self.class_counts(&rows);
        let n_samples = rows.len();
        let leaf = TreeNode::Leaf(Leaf {
            class_label: majority_from_counts(&counts),
            n_samples,
        });

        // Stopping criteria: pure node, too small, or max depth reached
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let at_max_depth = self.max_depth.is_some_and(|d| depth >= d);
        if pure || at_max_depth || n_samples < self.min_samples_split {
            return leaf;
        }

        let Some(split) = self.find_best_split(&rows, &counts) else {
            return leaf;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.x.get(r, split.feature_idx) <= split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return leaf;
        }

        tracing::trace!(
            depth,
            feature = split.feature_idx,
            threshold = split.threshold,
            gain = split.gain,
            "split node"
        );

        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        TreeNode::Node(Node {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Feature visiting order: shuffled when only a subset is examined.
    fn feature_order(&mut self) -> Vec<usize> {
        let n_features = self.x.n_cols();
        let mut order: Vec<usize> = (0..n_features).collect();
        if self.max_features.is_some_and(|k| k < n_features) {
            order.shuffle(&mut self.rng);
        }
        order
    }

    fn is_constant(&self, rows: &[usize], feature_idx: usize) -> bool {
        let first = self.x.get(rows[0], feature_idx);
        rows.iter()
            .all(|&r| (self.x.get(r, feature_idx) - first).abs() <= 1e-10)
    }

    /// Returns the split with highest Gini gain, if any split reduces
    /// impurity.
    ///
    /// Features constant within the node are skipped without using up the
    /// `max_features` budget, so a node only becomes a leaf for lack of
    /// candidates when every feature is constant in it.
    fn find_best_split(&mut self, rows: &[usize], counts: &[usize]) -> Option<Split> {
        let current = gini_from_counts(counts, rows.len());
        let budget = self.max_features.unwrap_or(self.x.n_cols());
        let mut best: Option<Split> = None;
        let mut examined = 0;

        for feature_idx in self.feature_order() {
            if examined == budget {
                break;
            }
            if self.is_constant(rows, feature_idx) {
                continue;
            }
            examined += 1;
            if let Some((threshold, gain)) = self.best_threshold(rows, counts, current, feature_idx)
            {
                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Split {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }

    /// Sweeps the sorted feature values once, moving samples from the right
    /// partition to the left, and scores each midpoint threshold.
    fn best_threshold(
        &self,
        rows: &[usize],
        counts: &[usize],
        current_impurity: f32,
        feature_idx: usize,
    ) -> Option<(f32, f32)> {
        let mut values: Vec<(f32, usize)> = rows
            .iter()
            .map(|&r| (self.x.get(r, feature_idx), self.y[r]))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = values.len();
        if total < 2 {
            return None;
        }
        let mut left_counts = vec![0; self.n_classes];
        let mut right_counts = counts.to_vec();
        let mut best: Option<(f32, f32)> = None;

        for i in 0..total - 1 {
            let (value, label) = values[i];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next = values[i + 1].0;
            if (next - value).abs() <= 1e-10 {
                continue;
            }

            let n_left = i + 1;
            let n_right = total - n_left;
            let weighted = (n_left as f32 * gini_from_counts(&left_counts, n_left)
                + n_right as f32 * gini_from_counts(&right_counts, n_right))
                / total as f32;
            let gain = current_impurity - weighted;
            if gain > 1e-7 && best.map_or(true, |(_, g)| gain > g) {
                best = Some(((value + next) / 2.0, gain));
            }
        }
        best
    }
}
