pub mod analysis;
pub mod config;
pub mod driver;
pub mod error;
pub mod evaluate;
pub mod host;
pub mod keymap;
pub mod sampler;
pub mod select;
pub mod session;
pub mod simulate;
pub mod sink;
pub mod timeline;
pub mod trial;

pub use analysis::NetworkScores;
pub use config::{
    CueOnset, DisplayConfig, ExperimentConfig, FeedbackConfig, LocationSource, MessageConfig,
    TrialConfig,
};
pub use driver::{StateChange, TrialDriver};
pub use error::{ConfigLoadError, HostError, TrialError};
pub use evaluate::{Classification, Evaluation, evaluate};
pub use host::{ResponseCollector, Surface};
pub use keymap::{KeyBinding, KeyMap};
pub use sampler::TrialFactory;
pub use select::{StimulusSet, select_stimuli};
pub use session::{ExperimentSession, SessionSummary};
pub use simulate::{Participant, SimulatedHost};
pub use sink::{DataSink, JsonLinesSink, MemorySink};
pub use timeline::Timeline;
pub use trial::TrialPlan;
