//! The interactive recommendation flow behind the web form.
//!
//! One configurable flow covers both form variants: a standard mode where
//! every value comes from a closed list, and a custom mode where free text
//! outside the vocabulary is replaced by a fallback before prediction.
//!
//! ```text
//!  Collecting ──submit──► Displaying(actions)
//!      ▲        │
//!      │        └───────► Failed(message)
//!      └────── next submit ──────┘
//! ```

use crate::error::{HomeError, Result};
use crate::recommend::Recommender;
use crate::vocab::{Condition, Mood, TimeOfDay};
use serde::{Deserialize, Serialize};

/// Which tab of the form produced the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Standard,
    Custom,
}

/// A yes/no radio button, with a free-text escape in custom mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Yes,
    No,
    Custom(String),
}

impl Toggle {
    /// Builds a toggle from the radio choice and the optional text box.
    ///
    /// Anything other than "Yes" or "No" is treated as custom text.
    #[must_use]
    pub fn from_form(choice: &str, custom_text: Option<&str>) -> Self {
        match choice.trim() {
            "Yes" => Self::Yes,
            "No" => Self::No,
            "Custom" => Self::Custom(custom_text.unwrap_or_default().trim().to_string()),
            other => Self::Custom(other.to_string()),
        }
    }

    fn resolve(&self, default: u8) -> u8 {
        match self {
            Self::Yes => 1,
            Self::No => 0,
            Self::Custom(_) => default,
        }
    }
}

/// Raw form fields, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub mode: FormMode,
    pub mood: String,
    pub person_condition: String,
    pub time_of_day: String,
    pub at_home: Toggle,
    pub is_holiday: Toggle,
}

impl FormInput {
    /// A standard-mode submission.
    #[must_use]
    pub fn standard(
        mood: &str,
        person_condition: &str,
        time_of_day: &str,
        at_home: bool,
        is_holiday: bool,
    ) -> Self {
        let toggle = |on: bool| if on { Toggle::Yes } else { Toggle::No };
        Self {
            mode: FormMode::Standard,
            mood: mood.to_string(),
            person_condition: person_condition.to_string(),
            time_of_day: time_of_day.to_string(),
            at_home: toggle(at_home),
            is_holiday: toggle(is_holiday),
        }
    }

    /// A custom-mode submission with free-text fields.
    #[must_use]
    pub fn custom(
        mood: &str,
        person_condition: &str,
        time_of_day: &str,
        at_home: Toggle,
        is_holiday: Toggle,
    ) -> Self {
        Self {
            mode: FormMode::Custom,
            mood: mood.to_string(),
            person_condition: person_condition.to_string(),
            time_of_day: time_of_day.to_string(),
            at_home,
            is_holiday,
        }
    }
}

/// Flow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Offer the custom testing tab
    pub custom_mode: bool,
    /// Show the current date and time above the form
    pub show_clock: bool,
    /// Run `Recommender::validate_input` before predicting
    pub validate_before_predict: bool,
    /// Presence flag used for custom at-home text
    pub custom_at_home_default: u8,
    /// Holiday flag used for custom holiday text
    pub custom_holiday_default: u8,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            custom_mode: true,
            show_clock: false,
            validate_before_predict: false,
            custom_at_home_default: 1,
            custom_holiday_default: 0,
        }
    }
}

impl FormConfig {
    /// Enables or disables the custom testing form.
    #[must_use]
    pub fn with_custom_mode(mut self, enabled: bool) -> Self {
        self.custom_mode = enabled;
        self
    }

    /// Shows the current date and time above the form.
    #[must_use]
    pub fn with_clock(mut self, enabled: bool) -> Self {
        self.show_clock = enabled;
        self
    }

    /// Runs input validation before every prediction.
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_before_predict = enabled;
        self
    }

    /// Flags substituted for custom at-home and holiday text. Values are
    /// clamped to 0/1.
    #[must_use]
    pub fn with_custom_defaults(mut self, at_home: u8, is_holiday: u8) -> Self {
        self.custom_at_home_default = at_home.min(1);
        self.custom_holiday_default = is_holiday.min(1);
        self
    }
}

/// Inputs ready for the prediction entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub mood: String,
    pub person_condition: String,
    pub time_of_day: String,
    pub at_home: u8,
    pub is_holiday: u8,
    /// `(column, submitted text)` for every value that was replaced
    pub substitutions: Vec<(String, String)>,
}

fn map_or_fallback<T>(
    column: &str,
    text: &str,
    parse: fn(&str) -> T,
    as_str: fn(T) -> &'static str,
    substitutions: &mut Vec<(String, String)>,
) -> String {
    let mapped = as_str(parse(text));
    if mapped != text {
        tracing::debug!(column, submitted = text, mapped, "substituted fallback value");
        substitutions.push((column.to_string(), text.to_string()));
    }
    mapped.to_string()
}

/// Maps raw form input onto values the recommender accepts.
///
/// Standard mode is strict: anything outside the vocabulary is rejected.
/// Custom mode substitutes fallbacks (mood `happy`, condition `at_home`,
/// time `afternoon`) and the configured defaults for custom toggle text.
///
/// # Errors
///
/// Returns an error for out-of-vocabulary input in standard mode, or for a
/// custom submission when custom mode is disabled.
pub fn normalize(input: &FormInput, config: &FormConfig) -> Result<Normalized> {
    match input.mode {
        FormMode::Standard => {
            let mood: Mood = input.mood.parse()?;
            let condition: Condition = input.person_condition.parse()?;
            let time: TimeOfDay = input.time_of_day.parse()?;
            let flag = |name: &str, toggle: &Toggle| match toggle {
                Toggle::Yes => Ok(1),
                Toggle::No => Ok(0),
                Toggle::Custom(text) => Err(HomeError::InvalidInput(format!(
                    "{name} must be Yes or No, got {text:?}"
                ))),
            };
            Ok(Normalized {
                mood: mood.as_str().to_string(),
                person_condition: condition.as_str().to_string(),
                time_of_day: time.as_str().to_string(),
                at_home: flag("at_home", &input.at_home)?,
                is_holiday: flag("is_holiday", &input.is_holiday)?,
                substitutions: Vec::new(),
            })
        }
        FormMode::Custom => {
            if !config.custom_mode {
                return Err(HomeError::InvalidInput(
                    "custom mode is disabled".to_string(),
                ));
            }
            let mut substitutions = Vec::new();
            let mood = map_or_fallback(
                Mood::COLUMN,
                &input.mood,
                Mood::parse_or_fallback,
                Mood::as_str,
                &mut substitutions,
            );
            let person_condition = map_or_fallback(
                Condition::COLUMN,
                &input.person_condition,
                Condition::parse_or_fallback,
                Condition::as_str,
                &mut substitutions,
            );
            let time_of_day = map_or_fallback(
                TimeOfDay::COLUMN,
                &input.time_of_day,
                TimeOfDay::parse_or_fallback,
                TimeOfDay::as_str,
                &mut substitutions,
            );
            for (column, toggle) in [("at_home", &input.at_home), ("is_holiday", &input.is_holiday)] {
                if let Toggle::Custom(text) = toggle {
                    substitutions.push((column.to_string(), text.clone()));
                }
            }
            Ok(Normalized {
                mood,
                person_condition,
                time_of_day,
                at_home: input.at_home.resolve(config.custom_at_home_default),
                is_holiday: input.is_holiday.resolve(config.custom_holiday_default),
                substitutions,
            })
        }
    }
}

/// Where the flow currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum FlowState {
    Collecting,
    Displaying(Vec<String>),
    Failed(String),
}

/// Drives one form session: normalize, optionally validate, predict.
#[derive(Debug)]
pub struct RecommendationFlow<'a> {
    recommender: &'a Recommender,
    config: &'a FormConfig,
    state: FlowState,
}

impl<'a> RecommendationFlow<'a> {
    /// Starts a session in [`FlowState::Collecting`].
    #[must_use]
    pub fn new(recommender: &'a Recommender, config: &'a FormConfig) -> Self {
        Self {
            recommender,
            config,
            state: FlowState::Collecting,
        }
    }

    /// Current state of the session.
    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Handles one submission. There are no retries: a failure is shown
    /// once and the next submission starts from [`FlowState::Collecting`].
    pub fn submit(&mut self, input: &FormInput) -> &FlowState {
        let prefix = match input.mode {
            FormMode::Standard => "An error occurred",
            FormMode::Custom => "An error occurred with custom inputs",
        };

        self.state = match self.run(input) {
            Ok(actions) if actions.is_empty() => {
                FlowState::Failed("Failed to generate recommendations. Please try again.".to_string())
            }
            Ok(actions) => FlowState::Displaying(actions),
            Err(e @ (HomeError::UnknownLabel { .. } | HomeError::InvalidInput(_))) => {
                tracing::warn!(error = %e, "rejected form input");
                FlowState::Failed(format!("Invalid input: {e}"))
            }
            Err(e) => {
                tracing::error!(error = %e, "prediction failed");
                FlowState::Failed(format!("{prefix}: {e}"))
            }
        };
        &self.state
    }

    fn run(&self, input: &FormInput) -> Result<Vec<String>> {
        let n = normalize(input, self.config)?;
        if self.config.validate_before_predict
            && !self.recommender.validate_input(
                &n.mood,
                &n.person_condition,
                &n.time_of_day,
                n.at_home,
                n.is_holiday,
            )
        {
            return Err(HomeError::InvalidInput(
                "inputs are not known to the trained model".to_string(),
            ));
        }
        self.recommender.predict_home_automation(
            &n.mood,
            &n.person_condition,
            &n.time_of_day,
            n.at_home,
            n.is_holiday,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::ModelBundle;
    use crate::synthetic;
    use crate::tree::ForestConfig;

    fn recommender() -> Recommender {
        let ds = synthetic::generate(300, 5);
        Recommender::from_bundle(
            ModelBundle::train(&ds, &ForestConfig::default().with_n_estimators(5)).expect("train"),
        )
    }

    #[test]
    fn test_toggle_from_form() {
        assert_eq!(Toggle::from_form("Yes", None), Toggle::Yes);
        assert_eq!(Toggle::from_form("No", Some("ignored")), Toggle::No);
        assert_eq!(
            Toggle::from_form("Custom", Some(" maybe ")),
            Toggle::Custom("maybe".to_string())
        );
    }

    #[test]
    fn test_custom_mood_falls_back_to_happy() {
        let input = FormInput::custom("zzz-unknown", "at_home", "evening", Toggle::Yes, Toggle::No);
        let n = normalize(&input, &FormConfig::default()).expect("custom mode");
        assert_eq!(n.mood, "happy");
        assert_eq!(n.person_condition, "at_home");
        assert_eq!(n.substitutions, vec![("mood".to_string(), "zzz-unknown".to_string())]);
    }

    #[test]
    fn test_custom_fallbacks_for_every_field() {
        let input = FormInput::custom(
            "excited",
            "exercising",
            "dusk",
            Toggle::Custom("sort of".to_string()),
            Toggle::Custom("who knows".to_string()),
        );
        let n = normalize(&input, &FormConfig::default()).expect("custom mode");
        assert_eq!(n.person_condition, "at_home");
        assert_eq!(n.time_of_day, "afternoon");
        assert_eq!((n.at_home, n.is_holiday), (1, 0));
        assert_eq!(n.substitutions.len(), 5);

        let flipped = FormConfig::default().with_custom_defaults(0, 1);
        let n = normalize(&input, &flipped).expect("custom mode");
        assert_eq!((n.at_home, n.is_holiday), (0, 1));
    }

    #[test]
    fn test_standard_mode_is_strict() {
        let input = FormInput::standard("excited", "at_home", "evening", true, false);
        assert!(matches!(
            normalize(&input, &FormConfig::default()),
            Err(HomeError::UnknownLabel { .. })
        ));

        let mut input = FormInput::standard("happy", "at_home", "evening", true, false);
        input.at_home = Toggle::Custom("sometimes".to_string());
        assert!(normalize(&input, &FormConfig::default()).is_err());
    }

    #[test]
    fn test_custom_rejected_when_disabled() {
        let input = FormInput::custom("happy", "at_home", "evening", Toggle::Yes, Toggle::No);
        let config = FormConfig::default().with_custom_mode(false);
        assert!(normalize(&input, &config).is_err());
    }

    #[test]
    fn test_flow_displays_actions() {
        let recommender = recommender();
        let config = FormConfig::default().with_validation(true);
        let mut flow = RecommendationFlow::new(&recommender, &config);
        assert_eq!(flow.state(), &FlowState::Collecting);

        let input = FormInput::standard("happy", "at_home", "evening", true, false);
        match flow.submit(&input) {
            FlowState::Displaying(actions) => assert!(!actions.is_empty()),
            other => panic!("expected actions, got {other:?}"),
        }
    }

    #[test]
    fn test_flow_failure_then_recovery() {
        let recommender = recommender();
        let config = FormConfig::default();
        let mut flow = RecommendationFlow::new(&recommender, &config);

        let bad = FormInput::standard("grumpy", "at_home", "evening", true, false);
        match flow.submit(&bad) {
            FlowState::Failed(message) => assert!(message.starts_with("Invalid input")),
            other => panic!("expected failure, got {other:?}"),
        }

        let custom = FormInput::custom("grumpy", "at_home", "evening", Toggle::Yes, Toggle::No);
        assert!(matches!(flow.submit(&custom), FlowState::Displaying(_)));
    }
}
