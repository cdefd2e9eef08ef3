//! homeauto: home-automation recommendations from lifestyle context.
//!
//! A small machine learning stack built around three random forests that map
//! a person's context (mood, condition, time of day, presence, holiday) to
//! device toggles, per-room light levels and a music genre.
//!
//! # Quick Start
//!
//! ```
//! use homeauto::prelude::*;
//!
//! let dataset = homeauto::synthetic::generate(400, 7);
//! let config = ForestConfig::default().with_n_estimators(10);
//! let bundle = ModelBundle::train(&dataset, &config).unwrap();
//! let recommender = Recommender::from_bundle(bundle);
//!
//! let actions = recommender
//!     .predict_home_automation("happy", "at_home", "evening", 1, 0)
//!     .unwrap();
//! assert!(!actions.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: row-major `Matrix` container
//! - [`vocab`]: closed vocabularies and dataset column names
//! - [`data`]: observation rows and CSV datasets
//! - [`synthetic`]: deterministic synthetic dataset generator
//! - [`preprocessing`]: label encoders
//! - [`model_selection`]: aligned train/test splitting
//! - [`tree`]: decision trees, random forests, multi-output wrapper
//! - [`metrics`]: accuracy and whole-vector match counting
//! - [`evaluation`]: the train/score/report harness
//! - [`recommend`]: model bundle, recommender and action rendering
//! - [`form`]: the interactive recommendation flow

pub mod data;
pub mod error;
pub mod evaluation;
pub mod form;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod recommend;
pub mod synthetic;
pub mod tree;
pub mod vocab;

pub use error::{HomeError, Result};
pub use primitives::Matrix;
