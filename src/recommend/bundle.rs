//! The trained model bundle: encoders plus the three classifiers.

use crate::data::Dataset;
use crate::error::{HomeError, Result};
use crate::preprocessing::{FeatureEncoder, LabelEncoder};
use crate::primitives::Matrix;
use crate::tree::{ForestConfig, MultiOutputClassifier, RandomForestClassifier};
use crate::vocab::{DEVICE_COLUMNS, LIGHT_COLUMNS, MUSIC_COLUMN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Bumped whenever the serialized layout changes.
pub const BUNDLE_FORMAT_VERSION: u32 = 2;

/// Everything one prediction needs.
///
/// Created by [`ModelBundle::train`] (or [`ModelBundle::fit_encoded`] inside
/// the evaluation harness) and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    version: u32,
    features: FeatureEncoder,
    devices: MultiOutputClassifier,
    lights: MultiOutputClassifier,
    /// Sorted distinct training levels per light column; the light forests
    /// predict positions in these lists.
    light_levels: Vec<Vec<usize>>,
    music: RandomForestClassifier,
    music_encoder: LabelEncoder,
}

/// Raw model output for one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    /// Device flags in `DEVICE_COLUMNS` order
    pub devices: Vec<bool>,
    /// Light levels in `LIGHT_COLUMNS` order
    pub lights: Vec<u32>,
    /// Decoded music genre
    pub music: String,
}

impl ModelBundle {
    /// Fits feature encoders on the whole dataset and trains all three
    /// classifiers on every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty or a classifier fails to fit.
    pub fn train(dataset: &Dataset, config: &ForestConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(HomeError::EmptyData(
                "cannot train on an empty dataset".to_string(),
            ));
        }
        let mut features = FeatureEncoder::new();
        let x = features.fit_transform(dataset)?;
        let music = dataset.music_targets();
        Self::fit_encoded(
            features,
            &x,
            &dataset.device_targets()?,
            &dataset.light_targets()?,
            &music,
            config,
        )
    }

    /// Trains the three classifiers on an already-encoded feature matrix.
    ///
    /// The music encoder is fit on `music` alone, so genres that never
    /// appear in these rows can't be predicted.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables are misaligned or empty.
    pub fn fit_encoded(
        features: FeatureEncoder,
        x: &Matrix<f32>,
        devices: &Matrix<usize>,
        lights: &Matrix<usize>,
        music: &[&str],
        config: &ForestConfig,
    ) -> Result<Self> {
        if devices.n_cols() != DEVICE_COLUMNS.len() || lights.n_cols() != LIGHT_COLUMNS.len() {
            return Err(HomeError::DimensionMismatch {
                expected: format!(
                    "{} device and {} light columns",
                    DEVICE_COLUMNS.len(),
                    LIGHT_COLUMNS.len()
                ),
                actual: format!(
                    "{} device and {} light columns",
                    devices.n_cols(),
                    lights.n_cols()
                ),
            });
        }

        tracing::info!(rows = x.n_rows(), trees = config.n_estimators, "training device model");
        let mut device_model = MultiOutputClassifier::new(config.clone());
        device_model.fit(x, devices)?;

        tracing::info!(rows = x.n_rows(), trees = config.n_estimators, "training light model");
        let light_levels = fit_levels(lights);
        let light_codes = encode_levels(&light_levels, lights)?;
        let mut light_model = MultiOutputClassifier::new(config.clone());
        light_model.fit(x, &light_codes)?;

        tracing::info!(rows = x.n_rows(), trees = config.n_estimators, "training music model");
        let mut music_encoder = LabelEncoder::new(MUSIC_COLUMN);
        let music_codes = music_encoder.fit_transform(music)?;
        let mut music_model = RandomForestClassifier::new(config.clone());
        music_model.fit(x, &music_codes)?;

        Ok(Self {
            version: BUNDLE_FORMAT_VERSION,
            features,
            devices: device_model,
            lights: light_model,
            light_levels,
            music: music_model,
            music_encoder,
        })
    }

    /// Feature encoders fitted at training time.
    #[must_use]
    pub fn features(&self) -> &FeatureEncoder {
        &self.features
    }

    /// Music genres the music model can output.
    #[must_use]
    pub fn music_genres(&self) -> &[String] {
        self.music_encoder.classes()
    }

    /// Predicts device flags for encoded rows.
    ///
    /// # Errors
    ///
    /// Returns an error if rows have the wrong width.
    pub fn predict_devices(&self, x: &Matrix<f32>) -> Result<Matrix<usize>> {
        self.devices.predict(x)
    }

    /// Predicts light levels for encoded rows.
    ///
    /// # Errors
    ///
    /// Returns an error if rows have the wrong width.
    pub fn predict_lights(&self, x: &Matrix<f32>) -> Result<Matrix<usize>> {
        let rows = (0..x.n_rows())
            .map(|r| self.predict_light_row(x.row(r)))
            .collect::<Result<Vec<_>>>()?;
        Matrix::from_rows(LIGHT_COLUMNS.len(), &rows).map_err(HomeError::from)
    }

    fn predict_light_row(&self, row: &[f32]) -> Result<Vec<usize>> {
        self.lights
            .predict_row(row)?
            .into_iter()
            .enumerate()
            .map(|(col, code)| decode_level(&self.light_levels, col, code))
            .collect()
    }

    /// Predicts decoded music genres for encoded rows.
    ///
    /// # Errors
    ///
    /// Returns an error if rows have the wrong width.
    pub fn predict_music(&self, x: &Matrix<f32>) -> Result<Vec<String>> {
        let codes = self.music.predict(x)?;
        Ok(self
            .music_encoder
            .inverse_transform(&codes)?
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Runs all three models on one encoded feature row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row has the wrong width.
    pub fn predict_row(&self, row: &[f32]) -> Result<Prediction> {
        let devices = self.devices.predict_row(row)?;
        let lights = self.predict_light_row(row)?;
        let music_code = self.music.predict_row(row)?;
        Ok(Prediction {
            devices: devices.into_iter().map(|d| d != 0).collect(),
            lights: lights
                .into_iter()
                .map(|l| {
                    u32::try_from(l)
                        .map_err(|_| HomeError::Serialization(format!("light level {l} out of range")))
                })
                .collect::<Result<_>>()?,
            music: self.music_encoder.decode_one(music_code)?.to_string(),
        })
    }

    /// Saves the bundle to a binary file using bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        fs::write(path.as_ref(), bytes)?;
        tracing::info!(path = %path.as_ref().display(), "saved model bundle");
        Ok(())
    }

    /// Loads a bundle written by [`ModelBundle::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, doesn't deserialize, or
    /// was written by an incompatible version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let bundle: Self = bincode::deserialize(&bytes)?;
        if bundle.version != BUNDLE_FORMAT_VERSION {
            return Err(HomeError::Serialization(format!(
                "model bundle format {} is not supported (expected {BUNDLE_FORMAT_VERSION})",
                bundle.version
            )));
        }
        Ok(bundle)
    }
}

/// Distinct levels of every light column, sorted ascending.
fn fit_levels(lights: &Matrix<usize>) -> Vec<Vec<usize>> {
    (0..lights.n_cols())
        .map(|col| {
            let mut levels = lights.column(col);
            levels.sort_unstable();
            levels.dedup();
            levels
        })
        .collect()
}

/// Replaces every raw level with its position in that column's level list.
fn encode_levels(levels: &[Vec<usize>], lights: &Matrix<usize>) -> Result<Matrix<usize>> {
    let columns = levels
        .iter()
        .enumerate()
        .map(|(col, known)| {
            lights
                .column(col)
                .into_iter()
                .map(|level| {
                    known.binary_search(&level).map_err(|_| HomeError::UnknownLabel {
                        column: LIGHT_COLUMNS[col].to_string(),
                        label: level.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    let slices: Vec<&[usize]> = columns.iter().map(Vec::as_slice).collect();
    Matrix::from_columns(&slices).map_err(HomeError::from)
}

fn decode_level(levels: &[Vec<usize>], col: usize, code: usize) -> Result<usize> {
    levels
        .get(col)
        .and_then(|known| known.get(code))
        .copied()
        .ok_or_else(|| HomeError::UnknownLabel {
            column: LIGHT_COLUMNS.get(col).copied().unwrap_or("light").to_string(),
            label: format!("index {code}"),
        })
}
