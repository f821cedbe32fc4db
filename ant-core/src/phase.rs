/// Defines session phases and how they behave
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn runs_trials(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_practice(&self) -> bool {
        false
    }

    fn is_welcome(&self) -> bool {
        false
    }

    fn is_debrief(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum StandardPhase {
    #[default]
    Welcome,
    Practice,
    Experiment,
    Debrief,
}

impl Phase for StandardPhase {
    fn runs_trials(&self) -> bool {
        matches!(self, Self::Practice | Self::Experiment)
    }

    fn next(&self) -> Option<Self> {
        use StandardPhase::*;
        Some(match self {
            Welcome => Practice,
            Practice => Experiment,
            Experiment => Debrief,
            Debrief => return None,
        })
    }

    fn is_practice(&self) -> bool {
        matches!(self, StandardPhase::Practice)
    }

    fn is_welcome(&self) -> bool {
        matches!(self, StandardPhase::Welcome)
    }

    fn is_debrief(&self) -> bool {
        matches!(self, StandardPhase::Debrief)
    }
}
