//! Context-row encoding: three label encoders plus two binary flags.

use super::LabelEncoder;
use crate::data::Dataset;
use crate::error::{HomeError, Result};
use crate::primitives::Matrix;
use crate::vocab::{Condition, Mood, TimeOfDay, FEATURE_COLUMNS};
use serde::{Deserialize, Serialize};

/// Encodes context columns into `[mood, condition, time, at_home, is_holiday]`
/// feature rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    mood: LabelEncoder,
    condition: LabelEncoder,
    time_of_day: LabelEncoder,
}

/// A feature row decoded back to its original text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFeatures {
    pub mood: String,
    pub person_condition: String,
    pub time_of_day: String,
    pub at_home: u8,
    pub is_holiday: u8,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureEncoder {
    /// Creates unfitted encoders for the three categorical columns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mood: LabelEncoder::new(Mood::COLUMN),
            condition: LabelEncoder::new(Condition::COLUMN),
            time_of_day: LabelEncoder::new(TimeOfDay::COLUMN),
        }
    }

    /// Fits each categorical encoder on the dataset's observed values.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        let rows = dataset.rows();
        let moods: Vec<&str> = rows.iter().map(|r| r.mood.as_str()).collect();
        let conditions: Vec<&str> = rows.iter().map(|r| r.person_condition.as_str()).collect();
        let times: Vec<&str> = rows.iter().map(|r| r.time_of_day.as_str()).collect();
        self.mood.fit(&moods)?;
        self.condition.fit(&conditions)?;
        self.time_of_day.fit(&times)?;
        tracing::debug!(
            moods = self.mood.n_classes(),
            conditions = self.condition.n_classes(),
            times = self.time_of_day.n_classes(),
            "fitted feature encoders"
        );
        Ok(())
    }

    /// Encodes every row of the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if a row holds a category unseen during fit.
    pub fn transform(&self, dataset: &Dataset) -> Result<Matrix<f32>> {
        let mut data = Vec::with_capacity(dataset.len() * FEATURE_COLUMNS.len());
        for row in dataset.rows() {
            data.extend(self.encode_row(
                &row.mood,
                &row.person_condition,
                &row.time_of_day,
                row.at_home,
                row.is_holiday,
            )?);
        }
        Matrix::from_vec(dataset.len(), FEATURE_COLUMNS.len(), data).map_err(HomeError::from)
    }

    /// Fits then transforms.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty.
    pub fn fit_transform(&mut self, dataset: &Dataset) -> Result<Matrix<f32>> {
        self.fit(dataset)?;
        self.transform(dataset)
    }

    /// Encodes one context into a feature row.
    ///
    /// # Errors
    ///
    /// Returns an error for unseen categories or flags other than 0/1.
    pub fn encode_row(
        &self,
        mood: &str,
        person_condition: &str,
        time_of_day: &str,
        at_home: u8,
        is_holiday: u8,
    ) -> Result<[f32; 5]> {
        for (name, flag) in [("at_home", at_home), ("is_holiday", is_holiday)] {
            if flag > 1 {
                return Err(HomeError::InvalidInput(format!(
                    "{name} must be 0 or 1, got {flag}"
                )));
            }
        }
        Ok([
            self.mood.encode_one(mood)? as f32,
            self.condition.encode_one(person_condition)? as f32,
            self.time_of_day.encode_one(time_of_day)? as f32,
            f32::from(at_home),
            f32::from(is_holiday),
        ])
    }

    /// Decodes a feature row for reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is too short or holds an index the
    /// encoders never produced.
    pub fn decode_row(&self, row: &[f32]) -> Result<DecodedFeatures> {
        if row.len() < FEATURE_COLUMNS.len() {
            return Err(HomeError::DimensionMismatch {
                expected: format!("{} features", FEATURE_COLUMNS.len()),
                actual: format!("{} features", row.len()),
            });
        }
        Ok(DecodedFeatures {
            mood: self.mood.decode_one(row[0] as usize)?.to_string(),
            person_condition: self.condition.decode_one(row[1] as usize)?.to_string(),
            time_of_day: self.time_of_day.decode_one(row[2] as usize)?.to_string(),
            at_home: row[3] as u8,
            is_holiday: row[4] as u8,
        })
    }

    /// Whether `value` is a category the mood encoder knows.
    #[must_use]
    pub fn knows_mood(&self, value: &str) -> bool {
        self.mood.encode_one(value).is_ok()
    }

    /// Whether `value` is a category the condition encoder knows.
    #[must_use]
    pub fn knows_condition(&self, value: &str) -> bool {
        self.condition.encode_one(value).is_ok()
    }

    /// Whether `value` is a category the time-of-day encoder knows.
    #[must_use]
    pub fn knows_time_of_day(&self, value: &str) -> bool {
        self.time_of_day.encode_one(value).is_ok()
    }
}
