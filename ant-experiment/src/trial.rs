use crate::config::TrialConfig;
use crate::select::{StimulusSet, resolve_cue_location, select_stimuli};
use crate::timeline::Timeline;
use ant_core::{ConfigurationError, Layout, TrialCondition, TrialIndex};
use rand::Rng;

/// Everything decided before a trial starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialPlan {
    pub index: TrialIndex,
    pub condition: TrialCondition,
    pub cue_onset_ms: u64,
    pub timeline: Timeline,
    pub stimuli: StimulusSet,
}

impl TrialPlan {
    /// Samples the cue onset and resolves shapes and positions for `condition`.
    pub fn prepare<R: Rng>(
        index: TrialIndex,
        condition: TrialCondition,
        config: &TrialConfig,
        layout: &Layout,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        let cue_onset_ms = config.cue_onset.sample(rng);
        Self::with_cue_onset(index, condition, cue_onset_ms, config, layout)
    }

    pub fn with_cue_onset(
        index: TrialIndex,
        condition: TrialCondition,
        cue_onset_ms: u64,
        config: &TrialConfig,
        layout: &Layout,
    ) -> Result<Self, ConfigurationError> {
        // Records report the row the cue was actually drawn in.
        let condition = TrialCondition {
            cue_location: resolve_cue_location(&condition, config.location_source),
            ..condition
        };
        Ok(Self {
            index,
            condition,
            cue_onset_ms,
            timeline: Timeline::for_trial(cue_onset_ms, config)?,
            stimuli: select_stimuli(&condition, config.location_source, layout),
        })
    }

    /// Feedback applies to practice trials when the run enables it.
    pub fn feedback_enabled(&self, config: &TrialConfig) -> bool {
        self.index.practice && config.feedback.enabled
    }
}
