use crate::trial::EventLabel;
use thiserror::Error;

/// A value outside its declared domain reached the trial logic.
///
/// Always fatal for the run: it means the variable definitions and the
/// driver disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown value {value:?} for variable `{variable}`")]
    UnknownValue {
        variable: &'static str,
        value: String,
    },

    #[error("event `{0}` is not registered on this trial's timeline")]
    UnregisteredEvent(EventLabel),

    #[error("event `{0}` is registered twice")]
    DuplicateEvent(EventLabel),

    #[error(
        "timeline offsets must strictly increase: `{earlier}` at {earlier_ms}ms, `{later}` at {later_ms}ms"
    )]
    NonIncreasingTimeline {
        earlier: EventLabel,
        earlier_ms: u64,
        later: EventLabel,
        later_ms: u64,
    },

    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: String,
    },
}

impl ConfigurationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
