//! Observation rows and the CSV dataset.
//!
//! One row per recorded scenario: the five context columns followed by the
//! six device flags, four room light levels and the music genre.

use crate::error::{HomeError, Result};
use crate::primitives::Matrix;
use crate::vocab::{DEVICE_COLUMNS, LIGHT_COLUMNS};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// A single recorded (context → action) observation.
///
/// Field order matches the dataset's CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub mood: String,
    pub person_condition: String,
    pub time_of_day: String,
    pub at_home: u8,
    pub is_holiday: u8,
    pub watch_tv: u8,
    pub play_music: u8,
    pub smart_locks: u8,
    pub security_cameras: u8,
    pub security_system: u8,
    pub water_heater_status: u8,
    pub bedroom_light: u32,
    pub living_room_light: u32,
    pub bathroom_light: u32,
    pub kitchen_light: u32,
    pub music_type: String,
}

impl Observation {
    /// Device flags in [`DEVICE_COLUMNS`] order.
    #[must_use]
    pub fn device_flags(&self) -> [u8; 6] {
        [
            self.watch_tv,
            self.play_music,
            self.smart_locks,
            self.security_cameras,
            self.security_system,
            self.water_heater_status,
        ]
    }

    /// Light levels in [`LIGHT_COLUMNS`] order.
    #[must_use]
    pub fn light_levels(&self) -> [u32; 4] {
        [
            self.bedroom_light,
            self.living_room_light,
            self.bathroom_light,
            self.kitchen_light,
        ]
    }

    fn check_flags(&self, line: usize) -> Result<()> {
        let flags = [("at_home", self.at_home), ("is_holiday", self.is_holiday)]
            .into_iter()
            .chain(DEVICE_COLUMNS.into_iter().zip(self.device_flags()));
        for (column, value) in flags {
            if value > 1 {
                return Err(HomeError::InvalidInput(format!(
                    "row {line}: column '{column}' must be 0 or 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// The full table of observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Observation>,
}

impl Dataset {
    /// Wraps already-parsed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any binary column holds something other than 0/1.
    pub fn new(rows: Vec<Observation>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            row.check_flags(i + 1)?;
        }
        Ok(Self { rows })
    }

    /// Loads a dataset from a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or a row doesn't parse.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Parses CSV from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error if a row doesn't parse or a flag isn't 0/1.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<Observation>, _>>()?;
        Self::new(rows)
    }

    /// Writes the dataset as CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be created or written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)
    }

    /// Writes CSV to any writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All observations, in file order.
    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Device flag table (`n_rows x 6`).
    pub fn device_targets(&self) -> Result<Matrix<usize>> {
        let data = self
            .rows
            .iter()
            .flat_map(|r| r.device_flags().map(usize::from))
            .collect();
        Matrix::from_vec(self.rows.len(), DEVICE_COLUMNS.len(), data).map_err(Into::into)
    }

    /// Light level table (`n_rows x 4`).
    pub fn light_targets(&self) -> Result<Matrix<usize>> {
        let data = self
            .rows
            .iter()
            .flat_map(|r| r.light_levels().map(|l| l as usize))
            .collect();
        Matrix::from_vec(self.rows.len(), LIGHT_COLUMNS.len(), data).map_err(Into::into)
    }

    /// Music genre column.
    #[must_use]
    pub fn music_targets(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.music_type.as_str()).collect()
    }
}

impl FromIterator<Observation> for Dataset {
    /// Collects rows without flag validation; use [`Dataset::new`] for
    /// untrusted input.
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
mood,person_condition,time_of_day,at_home,is_holiday,watch_tv,play_music,smart_locks,security_cameras,security_system,water_heater_status,bedroom_light,living_room_light,bathroom_light,kitchen_light,music_type
happy,at_home,evening,1,0,1,1,1,0,0,1,40,80,30,60,pop
tired,sleeping,night,1,0,0,0,1,1,1,0,0,0,10,0,none
";

    #[test]
    fn test_from_reader_parses_rows() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).expect("valid csv");
        assert_eq!(ds.len(), 2);
        let first = &ds.rows()[0];
        assert_eq!(first.mood, "happy");
        assert_eq!(first.device_flags(), [1, 1, 1, 0, 0, 1]);
        assert_eq!(first.light_levels(), [40, 80, 30, 60]);
        assert_eq!(ds.music_targets(), vec!["pop", "none"]);
    }

    #[test]
    fn test_target_tables() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).expect("valid csv");
        let devices = ds.device_targets().unwrap();
        assert_eq!(devices.shape(), (2, 6));
        assert_eq!(devices.row(1), &[0, 0, 1, 1, 1, 0]);
        let lights = ds.light_targets().unwrap();
        assert_eq!(lights.shape(), (2, 4));
        assert_eq!(lights.get(0, 1), 80);
    }

    #[test]
    fn test_rejects_non_binary_flag() {
        let bad = SAMPLE.replace("happy,at_home,evening,1,0,1", "happy,at_home,evening,1,0,2");
        let err = Dataset::from_reader(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("watch_tv"));
    }

    #[test]
    fn test_rejects_missing_column() {
        let bad = "mood,person_condition\nhappy,out\n";
        assert!(matches!(
            Dataset::from_reader(bad.as_bytes()),
            Err(HomeError::Csv(_))
        ));
    }

    #[test]
    fn test_csv_file_round_trip() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).expect("valid csv");
        let file = tempfile::NamedTempFile::new().expect("temp file");
        ds.write_csv(file.path()).expect("write");
        let back = Dataset::from_path(file.path()).expect("read");
        assert_eq!(ds, back);
    }
}
