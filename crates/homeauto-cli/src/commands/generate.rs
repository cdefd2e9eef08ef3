//! Generate command: write a synthetic dataset.

use crate::error::{CliError, Result};
use crate::output;
use std::path::Path;

pub(crate) fn run(rows: usize, seed: u64, path: &Path, json: bool) -> Result<()> {
    if rows == 0 {
        return Err(CliError::InvalidInput(
            "Invalid input: --rows must be at least 1".to_string(),
        ));
    }

    let dataset = homeauto::synthetic::generate(rows, seed);
    dataset.write_csv(path)?;

    if json {
        let summary = serde_json::json!({
            "rows": dataset.len(),
            "seed": seed,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::section("Synthetic Dataset");
        output::kv("Rows", dataset.len());
        output::kv("Seed", seed);
        output::kv("Path", path.display());
        output::success("dataset written");
    }
    Ok(())
}
