pub mod condition;
pub mod error;
pub mod layout;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use condition::{ArrowDirection, CueType, FlankerType, Location, TrialCondition};
pub use error::ConfigurationError;
pub use layout::{Geometry, Layout, deg_to_px};
pub use phase::{Phase, StandardPhase};
pub use stimulus::{Point, Registration, Shape};
pub use trial::{
    EventLabel, ReactionTime, ResponseLabel, ResponseOutcome, TrialIndex, TrialRecord, TrialState,
};
