use crate::config::TrialConfig;
use ant_core::{ConfigurationError, EventLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimelineEvent {
    label: EventLabel,
    offset_ms: u64,
}

/// Named offsets from trial start, queried with the elapsed trial time.
///
/// An offset counts as reached once `now >= offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-event ANT schedule for a trial whose cue starts at `cue_on_ms`.
    pub fn for_trial(cue_on_ms: u64, config: &TrialConfig) -> Result<Self, ConfigurationError> {
        let overflow = || ConfigurationError::invalid("timeline", "event offsets overflow");
        let cue_off = cue_on_ms
            .checked_add(config.cue_duration_ms)
            .ok_or_else(overflow)?;
        let target_on = cue_off
            .checked_add(config.cue_target_interval_ms)
            .ok_or_else(overflow)?;

        let mut timeline = Self::new();
        timeline.register(EventLabel::CueOn, cue_on_ms)?;
        timeline.register(EventLabel::CueOff, cue_off)?;
        timeline.register(EventLabel::TargetOn, target_on)?;
        timeline.register(EventLabel::TrialEnd, config.trial_end_ms)?;
        timeline.ensure_increasing(&EventLabel::SCHEDULE)?;
        Ok(timeline)
    }

    pub fn register(&mut self, label: EventLabel, offset_ms: u64) -> Result<(), ConfigurationError> {
        if self.events.iter().any(|e| e.label == label) {
            return Err(ConfigurationError::DuplicateEvent(label));
        }
        self.events.push(TimelineEvent { label, offset_ms });
        Ok(())
    }

    pub fn offset(&self, label: EventLabel) -> Result<u64, ConfigurationError> {
        self.events
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.offset_ms)
            .ok_or(ConfigurationError::UnregisteredEvent(label))
    }

    pub fn before(&self, label: EventLabel, now_ms: u64) -> Result<bool, ConfigurationError> {
        Ok(now_ms < self.offset(label)?)
    }

    /// True from the first event (inclusive) up to the second (exclusive).
    pub fn between(
        &self,
        from: EventLabel,
        until: EventLabel,
        now_ms: u64,
    ) -> Result<bool, ConfigurationError> {
        Ok(self.offset(from)? <= now_ms && now_ms < self.offset(until)?)
    }

    /// Checks `0 < first < second < ...` for the given labels in order.
    pub fn ensure_increasing(&self, order: &[EventLabel]) -> Result<(), ConfigurationError> {
        let mut previous: Option<(EventLabel, u64)> = None;
        for &label in order {
            let offset = self.offset(label)?;
            match previous {
                None if offset == 0 => {
                    return Err(ConfigurationError::invalid(
                        "timeline",
                        format!("`{label}` must come after trial start"),
                    ));
                }
                Some((earlier, earlier_ms)) if offset <= earlier_ms => {
                    return Err(ConfigurationError::NonIncreasingTimeline {
                        earlier,
                        earlier_ms,
                        later: label,
                        later_ms: offset,
                    });
                }
                _ => {}
            }
            previous = Some((label, offset));
        }
        Ok(())
    }
}
