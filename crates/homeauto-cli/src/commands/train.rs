//! Train command: fit the three classifiers on a whole dataset and save them.

use super::require_file;
use crate::error::Result;
use crate::output;
use homeauto::data::Dataset;
use homeauto::recommend::ModelBundle;
use homeauto::tree::ForestConfig;
use std::path::Path;

pub(crate) fn run(
    path: &Path,
    out: &Path,
    seed: u64,
    trees: usize,
    max_depth: Option<usize>,
    json: bool,
) -> Result<()> {
    require_file(path)?;
    let dataset = Dataset::from_path(path)?;

    let mut config = ForestConfig::default()
        .with_n_estimators(trees)
        .with_random_state(seed);
    if let Some(depth) = max_depth {
        config = config.with_max_depth(depth);
    }
    config.validate()?;

    let bundle = ModelBundle::train(&dataset, &config)?;
    bundle.save(out)?;

    if json {
        let summary = serde_json::json!({
            "rows": dataset.len(),
            "trees": trees,
            "seed": seed,
            "music_genres": bundle.music_genres(),
            "path": out.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::section("Model Bundle");
        output::kv("Rows", dataset.len());
        output::kv("Trees per forest", trees);
        output::kv("Seed", seed);
        output::kv("Music genres", bundle.music_genres().join(", "));
        output::kv("Saved to", out.display());
        output::success("models trained");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeauto::recommend::Recommender;

    #[test]
    fn test_train_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        let model = dir.path().join("models.bin");
        homeauto::synthetic::generate(150, 4).write_csv(&data).unwrap();

        run(&data, &model, 7, 5, Some(6), true).unwrap();

        let recommender = Recommender::load(&model).unwrap();
        assert!(!recommender.bundle().music_genres().is_empty());
    }
}
