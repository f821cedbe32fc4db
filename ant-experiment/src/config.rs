use crate::error::ConfigLoadError;
use crate::keymap::KeyMap;
use ant_core::ConfigurationError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Which sampled variable decides where a spatial cue goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// `cue_location` is sampled on its own; targets stay in the upper row.
    CueLocation,
    /// `target_location` is sampled and spatial cues always point at it.
    TargetLocation,
}

/// When the cue appears, measured from trial start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CueOnset {
    Fixed { ms: u64 },
    Random { min_ms: u64, max_ms: u64, step_ms: u64 },
}

impl CueOnset {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        match *self {
            CueOnset::Fixed { ms } => ms,
            CueOnset::Random {
                min_ms,
                max_ms,
                step_ms,
            } => {
                let steps = max_ms.saturating_sub(min_ms) / step_ms.max(1);
                min_ms + rng.random_range(0..=steps) * step_ms
            }
        }
    }

    /// Earliest and latest possible onset.
    pub fn bounds(&self) -> (u64, u64) {
        match *self {
            CueOnset::Fixed { ms } => (ms, ms),
            CueOnset::Random { min_ms, max_ms, .. } => (min_ms, max_ms),
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let (min, max) = self.bounds();
        if min == 0 {
            return Err(ConfigurationError::invalid(
                "cue_onset",
                "cue must start after trial onset",
            ));
        }
        if let CueOnset::Random { step_ms, .. } = *self {
            if min > max {
                return Err(ConfigurationError::invalid("cue_onset", "min_ms > max_ms"));
            }
            if step_ms == 0 || (max - min) % step_ms != 0 {
                return Err(ConfigurationError::invalid(
                    "cue_onset",
                    "step_ms must be non-zero and divide the range",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Only practice blocks show feedback, and only when this is set.
    pub enabled: bool,
    pub incorrect_message: String,
    pub timeout_message: String,
    pub continue_prompt: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            incorrect_message: "Incorrect response!".into(),
            timeout_message: "Too slow! Please respond faster.".into(),
            continue_prompt: "Press any key to continue.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub cue_onset: CueOnset,
    pub cue_duration_ms: u64,
    pub cue_target_interval_ms: u64,
    pub trial_end_ms: u64,
    pub response_window_ms: u64,
    pub location_source: LocationSource,
    pub feedback: FeedbackConfig,
}

impl TrialConfig {
    /// Fixed 1000ms cue onset, independently sampled cue location, no feedback.
    pub fn minimal() -> Self {
        Self {
            cue_onset: CueOnset::Fixed { ms: 1000 },
            location_source: LocationSource::CueLocation,
            feedback: FeedbackConfig {
                enabled: false,
                ..FeedbackConfig::default()
            },
            ..Self::enhanced()
        }
    }

    /// Jittered 400-1600ms cue onset, cue follows the target, practice feedback.
    pub fn enhanced() -> Self {
        Self {
            cue_onset: CueOnset::Random {
                min_ms: 400,
                max_ms: 1600,
                step_ms: 50,
            },
            cue_duration_ms: 100,
            cue_target_interval_ms: 400,
            trial_end_ms: 4000,
            response_window_ms: 1700,
            location_source: LocationSource::TargetLocation,
            feedback: FeedbackConfig::default(),
        }
    }

    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.response_window_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.cue_onset.validate()?;
        if self.cue_duration_ms == 0 {
            return Err(ConfigurationError::invalid("cue_duration_ms", "must be > 0"));
        }
        if self.cue_target_interval_ms == 0 {
            return Err(ConfigurationError::invalid(
                "cue_target_interval_ms",
                "must be > 0",
            ));
        }
        if self.response_window_ms == 0 {
            return Err(ConfigurationError::invalid("response_window_ms", "must be > 0"));
        }
        let latest_target = self
            .cue_onset
            .bounds()
            .1
            .checked_add(self.cue_duration_ms)
            .and_then(|ms| ms.checked_add(self.cue_target_interval_ms))
            .ok_or_else(|| {
                ConfigurationError::invalid("cue_onset", "cue and target offsets overflow")
            })?;
        if latest_target >= self.trial_end_ms {
            return Err(ConfigurationError::invalid(
                "trial_end_ms",
                format!("must come after the latest target onset ({latest_target}ms)"),
            ));
        }
        Ok(())
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self::enhanced()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub px_per_degree: f32,
    pub background: [u8; 4],
    pub foreground: [u8; 4],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            px_per_degree: 40.0,
            background: [255, 255, 255, 255],
            foreground: [0, 0, 0, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub instructions: String,
    /// `{block}` and `{blocks}` are substituted.
    pub block_break: String,
    pub debrief: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            instructions: "Indicate which way the middle arrow points. \
                           Press any key to begin."
                .into(),
            block_break: "Block {block} of {blocks} complete. Press any key to continue.".into(),
            debrief: "You're all done, thank you! Press any key to exit.".into(),
        }
    }
}

impl MessageConfig {
    pub fn block_break_text(&self, block: usize, blocks: usize) -> String {
        self.block_break
            .replace("{blocks}", &blocks.to_string())
            .replace("{block}", &block.to_string())
    }
}

/// Experiment configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub trial: TrialConfig,
    pub display: DisplayConfig,
    pub keymap: KeyMap,
    pub practice_trials: usize,
    pub blocks: usize,
    pub trials_per_block: usize,
    pub messages: MessageConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trial: TrialConfig::default(),
            display: DisplayConfig::default(),
            keymap: KeyMap::default(),
            practice_trials: 24,
            blocks: 3,
            trials_per_block: 96,
            messages: MessageConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.trial.validate()?;
        self.keymap.validate()?;
        if self.blocks == 0 {
            return Err(ConfigurationError::invalid("blocks", "need at least one block"));
        }
        if self.trials_per_block == 0 {
            return Err(ConfigurationError::invalid("trials_per_block", "must be > 0"));
        }
        if !(self.display.px_per_degree > 0.0) {
            return Err(ConfigurationError::invalid("px_per_degree", "must be > 0"));
        }
        Ok(())
    }
}
