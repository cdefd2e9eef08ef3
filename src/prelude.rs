//! Convenience re-exports for the common workflow.

pub use crate::data::{Dataset, Observation};
pub use crate::error::{HomeError, Result};
pub use crate::evaluation::{evaluate, EvalConfig, EvaluationReport};
pub use crate::form::{FlowState, FormConfig, FormInput, FormMode, RecommendationFlow, Toggle};
pub use crate::model_selection::{split_indices, SplitIndices};
pub use crate::preprocessing::LabelEncoder;
pub use crate::primitives::Matrix;
pub use crate::recommend::{ModelBundle, Recommender, Scenario};
pub use crate::tree::{
    DecisionTreeClassifier, ForestConfig, MultiOutputClassifier, RandomForestClassifier,
};
pub use crate::vocab::{Condition, Mood, TimeOfDay};
