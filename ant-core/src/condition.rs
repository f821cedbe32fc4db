use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates `as_str`, `Display`, `FromStr` and the `ALL` table for a label enum.
macro_rules! label_enum {
    ($name:ident, $variable:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigurationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(ConfigurationError::UnknownValue {
                        variable: $variable,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Warning cue shown before the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueType {
    None,
    Central,
    Double,
    Spatial,
}

label_enum!(CueType, "cue_type", {
    None => "none",
    Central => "central",
    Double => "double",
    Spatial => "spatial",
});

/// Row above or below fixation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Above,
    Below,
}

label_enum!(Location, "location", {
    Above => "above",
    Below => "below",
});

impl Location {
    pub fn opposite(self) -> Self {
        match self {
            Location::Above => Location::Below,
            Location::Below => Location::Above,
        }
    }
}

/// Direction the target arrow points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    Left,
    Right,
}

label_enum!(ArrowDirection, "target_direction", {
    Left => "left",
    Right => "right",
});

impl ArrowDirection {
    pub fn opposite(self) -> Self {
        match self {
            ArrowDirection::Left => ArrowDirection::Right,
            ArrowDirection::Right => ArrowDirection::Left,
        }
    }
}

/// Relation between the flankers and the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlankerType {
    Congruent,
    Neutral,
    Incongruent,
}

label_enum!(FlankerType, "flanker_type", {
    Congruent => "congruent",
    Neutral => "neutral",
    Incongruent => "incongruent",
});

/// Independent-variable values for one trial.
///
/// Both location slots are always filled. Which one was actually sampled
/// depends on the run's `LocationSource`; the other holds `Location::Above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialCondition {
    pub cue_type: CueType,
    pub cue_location: Location,
    pub target_location: Location,
    pub target_direction: ArrowDirection,
    pub flanker_type: FlankerType,
}

impl TrialCondition {
    /// Builds a condition from the labels handed over by a variable sampler.
    pub fn from_labels(
        cue_type: &str,
        cue_location: &str,
        target_location: &str,
        target_direction: &str,
        flanker_type: &str,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            cue_type: cue_type.parse()?,
            cue_location: parse_location("cue_location", cue_location)?,
            target_location: parse_location("target_location", target_location)?,
            target_direction: target_direction.parse()?,
            flanker_type: flanker_type.parse()?,
        })
    }
}

fn parse_location(variable: &'static str, value: &str) -> Result<Location, ConfigurationError> {
    value.parse::<Location>().map_err(|_| ConfigurationError::UnknownValue {
        variable,
        value: value.to_string(),
    })
}
