use ant_core::{CueType, FlankerType, TrialRecord};

/// Summary of a run's main-block trials.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkScores {
    pub trials: usize,
    pub timeouts: usize,
    /// Share of trials answered correctly, 0..=1.
    pub accuracy: f64,
    /// Mean RT of correct trials.
    pub mean_rt_ms: Option<f64>,
    /// No-cue minus double-cue RT.
    pub alerting_ms: Option<f64>,
    /// Central-cue minus valid spatial-cue RT.
    pub orienting_ms: Option<f64>,
    /// Incongruent minus congruent RT.
    pub executive_ms: Option<f64>,
}

impl NetworkScores {
    /// Practice trials are ignored; RT means only use correct responses.
    pub fn from_records(records: &[TrialRecord]) -> Self {
        let main: Vec<&TrialRecord> = records.iter().filter(|r| !r.practice).collect();
        if main.is_empty() {
            return Self::default();
        }

        let correct: Vec<&TrialRecord> = main.iter().copied().filter(|r| r.correct).collect();
        let mean_where = |pred: &dyn Fn(&TrialRecord) -> bool| -> Option<f64> {
            let rts: Vec<f64> = correct
                .iter()
                .filter(|r| pred(r))
                .filter_map(|r| r.rt.ms())
                .collect();
            (!rts.is_empty()).then(|| rts.iter().sum::<f64>() / rts.len() as f64)
        };
        let diff = |a: Option<f64>, b: Option<f64>| a.zip(b).map(|(a, b)| a - b);

        let no_cue = mean_where(&|r| r.cue_type == CueType::None);
        let double = mean_where(&|r| r.cue_type == CueType::Double);
        let central = mean_where(&|r| r.cue_type == CueType::Central);
        let valid_spatial =
            mean_where(&|r| r.cue_type == CueType::Spatial && r.cue_location == r.target_location);
        let incongruent = mean_where(&|r| r.flanker_type == FlankerType::Incongruent);
        let congruent = mean_where(&|r| r.flanker_type == FlankerType::Congruent);

        Self {
            trials: main.len(),
            timeouts: main.iter().filter(|r| r.timed_out()).count(),
            accuracy: correct.len() as f64 / main.len() as f64,
            mean_rt_ms: mean_where(&|_| true),
            alerting_ms: diff(no_cue, double),
            orienting_ms: diff(central, valid_spatial),
            executive_ms: diff(incongruent, congruent),
        }
    }
}
