//! Closed vocabularies for the categorical context columns, plus the
//! dataset column layout.
//!
//! Categorical inputs only have a canonical encoding when they are drawn
//! from these fixed sets. Each vocabulary also names the fallback value the
//! custom form mode substitutes for unknown text.

use crate::error::HomeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! closed_vocab {
    (
        $(#[$meta:meta])*
        $name:ident, column = $column:literal, fallback = $fallback:ident,
        { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in form display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Dataset column holding this vocabulary.
            pub const COLUMN: &'static str = $column;

            /// Value substituted for unknown free text in custom mode.
            pub const FALLBACK: $name = $name::$fallback;

            /// Canonical text form, as stored in the dataset.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Parses `text`, or returns the fallback value when it is not in
            /// the vocabulary.
            #[must_use]
            pub fn parse_or_fallback(text: &str) -> Self {
                text.parse().unwrap_or(Self::FALLBACK)
            }
        }

        impl FromStr for $name {
            type Err = HomeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(HomeError::UnknownLabel {
                        column: $column.to_string(),
                        label: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_vocab! {
    /// How the person feels.
    Mood, column = "mood", fallback = Happy,
    {
        Peaceful => "peaceful",
        Focused => "focused",
        Tired => "tired",
        Stressed => "stressed",
        Happy => "happy",
        Calm => "calm",
        Energetic => "energetic",
    }
}

closed_vocab! {
    /// What the person is currently doing.
    Condition, column = "person_condition", fallback = AtHome,
    {
        Sleeping => "sleeping",
        AtWork => "at_work",
        AtHome => "at_home",
        Out => "out",
        GettingReady => "getting_ready",
        Awake => "awake",
    }
}

closed_vocab! {
    /// Coarse time of day.
    TimeOfDay, column = "time_of_day", fallback = Afternoon,
    {
        Morning => "morning",
        Afternoon => "afternoon",
        Evening => "evening",
        Night => "night",
    }
}

/// Categorical feature columns, label-encoded before training.
pub const CATEGORICAL_COLUMNS: [&str; 3] = [Mood::COLUMN, Condition::COLUMN, TimeOfDay::COLUMN];

/// Binary feature columns, used as-is.
pub const FLAG_COLUMNS: [&str; 2] = ["at_home", "is_holiday"];

/// Feature matrix column order.
pub const FEATURE_COLUMNS: [&str; 5] = [
    Mood::COLUMN,
    Condition::COLUMN,
    TimeOfDay::COLUMN,
    "at_home",
    "is_holiday",
];

/// Binary device targets.
pub const DEVICE_COLUMNS: [&str; 6] = [
    "watch_tv",
    "play_music",
    "smart_locks",
    "security_cameras",
    "security_system",
    "water_heater_status",
];

/// Per-room light level targets.
pub const LIGHT_COLUMNS: [&str; 4] = [
    "bedroom_light",
    "living_room_light",
    "bathroom_light",
    "kitchen_light",
];

/// Music genre target.
pub const MUSIC_COLUMN: &str = "music_type";

/// `snake_case` column name to a title, e.g. `watch_tv` → `Watch Tv`.
#[must_use]
pub fn title_case(column: &str) -> String {
    column
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
