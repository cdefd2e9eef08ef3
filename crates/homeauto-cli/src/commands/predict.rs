//! Predict command: one recommendation from the command line.

use super::require_file;
use crate::error::{CliError, Result};
use crate::output;
use homeauto::form::{normalize, FormConfig, FormInput, Toggle};
use homeauto::recommend::Recommender;
use std::path::Path;

/// Context flags for `homeauto predict`.
#[derive(Debug, Clone)]
pub(crate) struct PredictArgs {
    pub mood: String,
    pub condition: String,
    pub time: String,
    pub at_home: u8,
    pub holiday: u8,
    pub custom: bool,
}

fn toggle(flag: u8) -> Toggle {
    match flag {
        1 => Toggle::Yes,
        0 => Toggle::No,
        other => Toggle::Custom(other.to_string()),
    }
}

pub(crate) fn run(model: &Path, args: &PredictArgs, json: bool) -> Result<()> {
    require_file(model)?;
    let recommender =
        Recommender::load(model).map_err(|e| CliError::ModelLoadFailed(e.to_string()))?;
    let (actions, notes) = recommend(&recommender, args)?;

    if json {
        let body = serde_json::json!({ "actions": actions, "substituted": notes });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for (column, text) in &notes {
            output::warning(&format!("{column}: {text:?} is not a known value, using fallback"));
        }
        output::section("Recommended Actions");
        output::numbered(&actions);
    }
    Ok(())
}

/// Standard mode passes values straight through; custom mode maps them
/// onto the vocabulary first.
fn recommend(
    recommender: &Recommender,
    args: &PredictArgs,
) -> Result<(Vec<String>, Vec<(String, String)>)> {
    if !args.custom {
        let actions = recommender.predict_home_automation(
            &args.mood,
            &args.condition,
            &args.time,
            args.at_home,
            args.holiday,
        )?;
        return Ok((actions, Vec::new()));
    }

    let input = FormInput::custom(
        &args.mood,
        &args.condition,
        &args.time,
        toggle(args.at_home),
        toggle(args.holiday),
    );
    let n = normalize(&input, &FormConfig::default())?;
    let actions = recommender.predict_home_automation(
        &n.mood,
        &n.person_condition,
        &n.time_of_day,
        n.at_home,
        n.is_holiday,
    )?;
    Ok((actions, n.substitutions))
}
