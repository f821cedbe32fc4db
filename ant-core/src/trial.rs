use crate::condition::{ArrowDirection, CueType, FlankerType, Location, TrialCondition};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trial state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    PreCue,
    CueVisible,
    PostCueWait,
    TargetVisible,
    PostResponseHold,
    Feedback,
    Done,
}

impl TrialState {
    /// Fixation is drawn in every state but the terminal one.
    pub fn shows_fixation(&self) -> bool {
        !matches!(self, TrialState::Done)
    }

    pub fn shows_cue(&self) -> bool {
        matches!(self, TrialState::CueVisible)
    }

    pub fn shows_target(&self) -> bool {
        matches!(self, TrialState::TargetVisible)
    }
}

/// Named points on a trial's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLabel {
    CueOn,
    CueOff,
    TargetOn,
    TrialEnd,
}

impl EventLabel {
    pub const SCHEDULE: [EventLabel; 4] = [
        EventLabel::CueOn,
        EventLabel::CueOff,
        EventLabel::TargetOn,
        EventLabel::TrialEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLabel::CueOn => "cue_on",
            EventLabel::CueOff => "cue_off",
            EventLabel::TargetOn => "target_on",
            EventLabel::TrialEnd => "trial_end",
        }
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventLabel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventLabel::SCHEDULE
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownValue {
                variable: "event",
                value: s.to_string(),
            })
    }
}

/// Data label of a collected response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLabel {
    Left,
    Right,
    #[serde(rename = "NA")]
    NA,
}

impl From<ArrowDirection> for ResponseLabel {
    fn from(direction: ArrowDirection) -> Self {
        match direction {
            ArrowDirection::Left => ResponseLabel::Left,
            ArrowDirection::Right => ResponseLabel::Right,
        }
    }
}

impl ResponseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLabel::Left => "left",
            ResponseLabel::Right => "right",
            ResponseLabel::NA => "NA",
        }
    }
}

/// Reaction time in milliseconds, or the timeout sentinel.
///
/// Serialized as a plain number; a timeout is written as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum ReactionTime {
    Ms(f64),
    Timeout,
}

impl ReactionTime {
    pub const TIMEOUT_SENTINEL: f64 = -1.0;

    pub fn is_timeout(&self) -> bool {
        matches!(self, ReactionTime::Timeout)
    }

    pub fn ms(&self) -> Option<f64> {
        match self {
            ReactionTime::Ms(ms) => Some(*ms),
            ReactionTime::Timeout => None,
        }
    }
}

impl From<f64> for ReactionTime {
    fn from(value: f64) -> Self {
        if value < 0.0 {
            ReactionTime::Timeout
        } else {
            ReactionTime::Ms(value)
        }
    }
}

impl From<ReactionTime> for f64 {
    fn from(rt: ReactionTime) -> Self {
        rt.ms().unwrap_or(ReactionTime::TIMEOUT_SENTINEL)
    }
}

/// What the response collector returned for one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseOutcome {
    label: ResponseLabel,
    rt: ReactionTime,
}

impl ResponseOutcome {
    /// A timed-out outcome always carries the `NA` label.
    pub fn new(label: ResponseLabel, rt: ReactionTime) -> Self {
        let label = if rt.is_timeout() { ResponseLabel::NA } else { label };
        Self { label, rt }
    }

    pub fn response(label: ResponseLabel, rt_ms: f64) -> Self {
        Self::new(label, ReactionTime::Ms(rt_ms))
    }

    pub fn timeout() -> Self {
        Self::new(ResponseLabel::NA, ReactionTime::Timeout)
    }

    pub fn label(&self) -> ResponseLabel {
        self.label
    }

    pub fn rt(&self) -> ReactionTime {
        self.rt
    }

    pub fn is_timeout(&self) -> bool {
        self.rt.is_timeout()
    }
}

/// Block and trial counters, both starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialIndex {
    pub block_num: usize,
    pub trial_num: usize,
    pub practice: bool,
}

/// Flat per-trial record handed to the data sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub block_num: usize,
    pub trial_num: usize,
    pub practice: bool,
    pub cue_type: CueType,
    pub cue_location: Location,
    pub target_location: Location,
    pub target_direction: ArrowDirection,
    pub flanker_type: FlankerType,
    pub cue_onset_ms: u64,
    pub response: ResponseLabel,
    pub rt: ReactionTime,
    pub correct: bool,
}

impl TrialRecord {
    pub fn new(
        index: TrialIndex,
        condition: &TrialCondition,
        cue_onset_ms: u64,
        outcome: &ResponseOutcome,
        correct: bool,
    ) -> Self {
        Self {
            block_num: index.block_num,
            trial_num: index.trial_num,
            practice: index.practice,
            cue_type: condition.cue_type,
            cue_location: condition.cue_location,
            target_location: condition.target_location,
            target_direction: condition.target_direction,
            flanker_type: condition.flanker_type,
            cue_onset_ms,
            response: outcome.label(),
            rt: outcome.rt(),
            correct,
        }
    }

    pub fn index(&self) -> TrialIndex {
        TrialIndex {
            block_num: self.block_num,
            trial_num: self.trial_num,
            practice: self.practice,
        }
    }

    pub fn condition(&self) -> TrialCondition {
        TrialCondition {
            cue_type: self.cue_type,
            cue_location: self.cue_location,
            target_location: self.target_location,
            target_direction: self.target_direction,
            flanker_type: self.flanker_type,
        }
    }

    pub fn outcome(&self) -> ResponseOutcome {
        ResponseOutcome::new(self.response, self.rt)
    }

    pub fn timed_out(&self) -> bool {
        self.rt.is_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition() -> TrialCondition {
        TrialCondition {
            cue_type: CueType::Spatial,
            cue_location: Location::Above,
            target_location: Location::Above,
            target_direction: ArrowDirection::Right,
            flanker_type: FlankerType::Incongruent,
        }
    }

    #[test]
    fn timeout_forces_na_label() {
        let outcome = ResponseOutcome::new(ResponseLabel::Left, ReactionTime::Timeout);
        assert_eq!(outcome.label(), ResponseLabel::NA);
        assert!(outcome.is_timeout());
    }

    #[test]
    fn record_gives_back_condition_and_outcome() {
        let index = TrialIndex {
            block_num: 2,
            trial_num: 17,
            practice: false,
        };
        let outcome = ResponseOutcome::response(ResponseLabel::Left, 620.0);
        let record = TrialRecord::new(index, &condition(), 1350, &outcome, false);

        assert_eq!(record.condition(), condition());
        assert_eq!(record.outcome(), outcome);
        assert_eq!(record.index(), index);
        assert_eq!(record.cue_onset_ms, 1350);
    }

    #[test]
    fn record_serializes_flat_with_timeout_sentinel() {
        let index = TrialIndex {
            block_num: 1,
            trial_num: 1,
            practice: true,
        };
        let record = TrialRecord::new(index, &condition(), 1000, &ResponseOutcome::timeout(), false);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["response"], "NA");
        assert_eq!(json["rt"], -1.0);
        assert_eq!(json["target_direction"], "right");
        assert!(json.as_object().unwrap().values().all(|v| !v.is_object()));

        let back: TrialRecord = serde_json::from_value(json).unwrap();
        assert!(back.timed_out());
        assert_eq!(back, record);
    }

    #[test]
    fn event_labels_parse() {
        assert_eq!("target_on".parse::<EventLabel>().unwrap(), EventLabel::TargetOn);
        assert!("target_off".parse::<EventLabel>().is_err());
    }

    #[test]
    fn render_flags_per_state() {
        assert!(TrialState::PostCueWait.shows_fixation());
        assert!(!TrialState::PostCueWait.shows_cue());
        assert!(TrialState::TargetVisible.shows_target());
        assert!(TrialState::Feedback.shows_fixation());
        assert!(!TrialState::Feedback.shows_target());
        assert!(!TrialState::Done.shows_fixation());
    }
}
