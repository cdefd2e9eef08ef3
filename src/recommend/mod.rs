//! Home-automation recommendations.
//!
//! [`Recommender`] owns a loaded [`ModelBundle`] and turns a validated
//! [`Scenario`] into an ordered list of human-readable actions. It is
//! created once at start-up and handed to whoever serves requests.
//!
//! # Example
//!
//! ```
//! use homeauto::prelude::*;
//!
//! let dataset = homeauto::synthetic::generate(300, 1);
//! let bundle = ModelBundle::train(&dataset, &ForestConfig::default().with_n_estimators(5)).unwrap();
//! let recommender = Recommender::from_bundle(bundle);
//!
//! assert!(recommender.validate_input("tired", "sleeping", "night", 1, 0));
//! assert!(!recommender.validate_input("grumpy", "sleeping", "night", 1, 0));
//! ```

mod bundle;

pub use bundle::{ModelBundle, Prediction, BUNDLE_FORMAT_VERSION};

use crate::error::{HomeError, Result};
use crate::vocab::{Condition, Mood, TimeOfDay, LIGHT_COLUMNS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A validated context, ready for prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub mood: Mood,
    pub condition: Condition,
    pub time_of_day: TimeOfDay,
    pub at_home: bool,
    pub is_holiday: bool,
}

impl Scenario {
    /// Parses raw text and 0/1 flags strictly; nothing is substituted.
    ///
    /// # Errors
    ///
    /// Returns an error for text outside the vocabularies or flags other
    /// than 0/1.
    pub fn parse(
        mood: &str,
        person_condition: &str,
        time_of_day: &str,
        at_home: u8,
        is_holiday: u8,
    ) -> Result<Self> {
        Ok(Self {
            mood: mood.parse()?,
            condition: person_condition.parse()?,
            time_of_day: time_of_day.parse()?,
            at_home: parse_flag("at_home", at_home)?,
            is_holiday: parse_flag("is_holiday", is_holiday)?,
        })
    }
}

fn parse_flag(name: &str, value: u8) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(HomeError::InvalidInput(format!(
            "{name} must be 0 or 1, got {other}"
        ))),
    }
}

/// Prediction entry point backed by a single owned model bundle.
#[derive(Debug, Clone)]
pub struct Recommender {
    bundle: ModelBundle,
}

impl Recommender {
    /// Loads the bundle from disk. A failure here is fatal for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle can't be read or decoded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match ModelBundle::load(path) {
            Ok(bundle) => {
                tracing::info!(path = %path.display(), "model bundle loaded");
                Ok(Self { bundle })
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load model bundle");
                Err(e)
            }
        }
    }

    /// Wraps an in-memory bundle.
    #[must_use]
    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self { bundle }
    }

    /// The underlying bundle.
    #[must_use]
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Whether the inputs are in-vocabulary, known to the fitted encoders,
    /// and the flags are 0/1.
    #[must_use]
    pub fn validate_input(
        &self,
        mood: &str,
        person_condition: &str,
        time_of_day: &str,
        at_home: u8,
        is_holiday: u8,
    ) -> bool {
        let features = self.bundle.features();
        Scenario::parse(mood, person_condition, time_of_day, at_home, is_holiday).is_ok()
            && features.knows_mood(mood)
            && features.knows_condition(person_condition)
            && features.knows_time_of_day(time_of_day)
    }

    /// Raw model output for a scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if a category wasn't present in the training data.
    pub fn predict(&self, scenario: &Scenario) -> Result<Prediction> {
        let row = self.bundle.features().encode_row(
            scenario.mood.as_str(),
            scenario.condition.as_str(),
            scenario.time_of_day.as_str(),
            u8::from(scenario.at_home),
            u8::from(scenario.is_holiday),
        )?;
        self.bundle.predict_row(&row)
    }

    /// Ordered action list for a scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if prediction fails.
    pub fn recommend(&self, scenario: &Scenario) -> Result<Vec<String>> {
        let prediction = self.predict(scenario)?;
        let actions = render_actions(&prediction);
        tracing::debug!(?scenario, actions = actions.len(), "generated recommendations");
        Ok(actions)
    }

    /// Text-level entry point: validates, predicts and renders actions.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input or a failed prediction.
    pub fn predict_home_automation(
        &self,
        mood: &str,
        person_condition: &str,
        time_of_day: &str,
        at_home: u8,
        is_holiday: u8,
    ) -> Result<Vec<String>> {
        let scenario = Scenario::parse(mood, person_condition, time_of_day, at_home, is_holiday)?;
        self.recommend(&scenario)
    }
}

/// (on, off) phrasing per device, in `DEVICE_COLUMNS` order.
const DEVICE_ACTIONS: [(&str, &str); 6] = [
    ("Turn on TV", "Turn off TV"),
    ("Play music", "Turn off music"),
    ("Lock smart locks", "Unlock smart locks"),
    ("Turn on security cameras", "Turn off security cameras"),
    ("Arm security system", "Disarm security system"),
    ("Turn on water heater", "Turn off water heater"),
];

/// Renders a prediction as ordered actions: one line per device, then one
/// per room light.
///
/// The music device line names the predicted genre when there is one.
#[must_use]
pub fn render_actions(prediction: &Prediction) -> Vec<String> {
    let mut actions = Vec::with_capacity(DEVICE_ACTIONS.len() + LIGHT_COLUMNS.len());

    for (idx, (&on, &(on_text, off_text))) in
        prediction.devices.iter().zip(DEVICE_ACTIONS.iter()).enumerate()
    {
        let line = match (idx, on) {
            (1, true) if !prediction.music.is_empty() && prediction.music != "none" => {
                format!("Play {} music", prediction.music)
            }
            (_, true) => on_text.to_string(),
            (_, false) => off_text.to_string(),
        };
        actions.push(line);
    }

    for (column, &level) in LIGHT_COLUMNS.iter().zip(prediction.lights.iter()) {
        let room = column.replace('_', " ");
        if level == 0 {
            actions.push(format!("Turn off {room}"));
        } else {
            actions.push(format!("Set {room} brightness to {level}%"));
        }
    }

    actions
}

/// Prefixes each action with its 1-based position.
#[must_use]
pub fn numbered(actions: &[String]) -> Vec<String> {
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| format!("{}. {action}", i + 1))
        .collect()
}
