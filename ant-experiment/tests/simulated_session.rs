use ant_core::{
    CueType, Location, Point, Registration, ResponseLabel, ResponseOutcome, Shape, StandardPhase,
    TrialRecord,
};
use ant_experiment::{
    DataSink, ExperimentConfig, ExperimentSession, HostError, JsonLinesSink, KeyMap, MemorySink,
    Participant, ResponseCollector, SimulatedHost, Surface, TrialConfig, TrialError,
};
use ant_timing::ManualTimer;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

const SCREEN: (u32, u32) = (1280, 720);

fn setup(
    config: ExperimentConfig,
    participant: Participant,
    seed: u64,
) -> (ExperimentSession<StandardPhase, ManualTimer, StdRng>, SimulatedHost<StdRng>) {
    let timer = ManualTimer::new();
    let session =
        ExperimentSession::new(config, SCREEN, timer.clone(), StdRng::seed_from_u64(seed)).unwrap();
    let host = SimulatedHost::new(
        timer,
        *session.layout(),
        participant,
        StdRng::seed_from_u64(seed + 1),
    );
    (session, host)
}

#[test]
fn full_session_shows_all_three_network_effects() {
    let (mut session, mut host) = setup(ExperimentConfig::default(), Participant::default(), 11);
    let mut sink = MemorySink::default();
    let summary = session.run(&mut host, &mut sink).unwrap();

    assert_eq!(summary.records.len(), 24 + 3 * 96);
    assert_eq!(summary.scores.trials, 3 * 96);

    let executive = summary.scores.executive_ms.unwrap();
    let alerting = summary.scores.alerting_ms.unwrap();
    let orienting = summary.scores.orienting_ms.unwrap();
    assert!((70.0..110.0).contains(&executive), "executive {executive}");
    assert!((25.0..55.0).contains(&alerting), "alerting {alerting}");
    assert!((35.0..65.0).contains(&orienting), "orienting {orienting}");
    assert!(summary.scores.accuracy > 0.9);

    assert!(summary.frame_stats.effective_fps > 59.0);
    assert!(summary.frame_stats.effective_fps < 61.0);
}

#[test]
fn enhanced_cues_always_point_at_the_target() {
    let (mut session, mut host) = setup(ExperimentConfig::default(), Participant::default(), 3);
    let summary = session.run(&mut host, &mut MemorySink::default()).unwrap();

    let targets_below = summary
        .records
        .iter()
        .filter(|r| r.target_location == Location::Below)
        .count();
    assert!(targets_below > 0);
    assert!(summary
        .records
        .iter()
        .any(|r| r.cue_type == CueType::Spatial && r.cue_location == Location::Below));
    for record in &summary.records {
        assert_eq!(record.cue_location, record.target_location);
        assert!((400..=1600).contains(&record.cue_onset_ms));
        assert_eq!(record.cue_onset_ms % 50, 0);
    }
}

#[test]
fn minimal_variant_keeps_targets_in_the_upper_row() {
    let config = ExperimentConfig {
        trial: TrialConfig::minimal(),
        practice_trials: 4,
        blocks: 1,
        trials_per_block: 48,
        ..ExperimentConfig::default()
    };
    let (mut session, mut host) = setup(config, Participant::default(), 21);
    let summary = session.run(&mut host, &mut MemorySink::default()).unwrap();

    assert!(summary
        .records
        .iter()
        .all(|r| r.target_location == Location::Above && r.cue_onset_ms == 1000));
    assert!(summary
        .records
        .iter()
        .any(|r| r.cue_type == CueType::Spatial && r.cue_location == Location::Below));
    // No feedback screens, so only instructions and debrief wait for a key.
    assert_eq!(host.keys_waited(), 2);
}

#[test]
fn timeouts_are_written_as_na_with_negative_rt() {
    let config = ExperimentConfig {
        practice_trials: 2,
        blocks: 1,
        trials_per_block: 3,
        ..ExperimentConfig::default()
    };
    let feedback = config.trial.feedback.timeout_message.clone();
    let slow = Participant {
        base_rt_ms: 3000.0,
        ..Participant::default()
    };
    let (mut session, mut host) = setup(config, slow, 8);
    let mut sink = JsonLinesSink::new(Vec::new());
    session.run(&mut host, &mut sink).unwrap();
    assert_eq!(sink.written(), 5);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    for line in text.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["response"], "NA");
        assert_eq!(value["rt"], -1.0);
        assert_eq!(value["correct"], false);
        let record: TrialRecord = serde_json::from_str(line).unwrap();
        assert!(record.timed_out());
    }
    let shown = host.texts().iter().filter(|t| **t == feedback).count();
    assert_eq!(shown, 2);
}

/// Passes everything through until the participant quits mid-block.
struct QuittingHost {
    inner: SimulatedHost<StdRng>,
    responses_left: usize,
}

impl Surface for QuittingHost {
    fn fill(&mut self) {
        self.inner.fill();
    }
    fn draw_at(&mut self, shape: Shape, registration: Registration, position: Point) {
        self.inner.draw_at(shape, registration, position);
    }
    fn draw_text(&mut self, text: &str, registration: Registration, position: Point) {
        self.inner.draw_text(text, registration, position);
    }
    fn present(&mut self) -> Result<(), HostError> {
        self.inner.present()
    }
}

impl ResponseCollector for QuittingHost {
    fn collect(&mut self, window: Duration, keymap: &KeyMap) -> Result<ResponseOutcome, HostError> {
        if self.responses_left == 0 {
            return Err(HostError::Aborted);
        }
        self.responses_left -= 1;
        self.inner.collect(window, keymap)
    }
    fn wait_for_any_key(&mut self) -> Result<(), HostError> {
        self.inner.wait_for_any_key()
    }
}

#[test]
fn abort_stops_the_session_and_keeps_finished_trials() {
    let (mut session, host) = setup(ExperimentConfig::default(), Participant::default(), 4);
    let mut host = QuittingHost {
        inner: host,
        responses_left: 30,
    };
    let mut sink = MemorySink::default();
    let err = session.run(&mut host, &mut sink).unwrap_err();

    assert!(err.is_abort());
    assert!(matches!(err, TrialError::Host(HostError::Aborted)));
    assert_eq!(sink.records.len(), 30);
    assert_eq!(session.records().len(), 30);
    assert_eq!(session.phase, StandardPhase::Experiment);
    let last = sink.records.last().unwrap();
    assert_eq!((last.block_num, last.trial_num), (2, 6));
}

#[test]
fn records_reach_the_sink_before_the_next_trial() {
    struct CountingSink {
        inner: MemorySink,
        max_seen: usize,
    }
    impl DataSink for CountingSink {
        fn write(&mut self, record: &TrialRecord) -> Result<(), HostError> {
            let earlier = self
                .inner
                .records
                .iter()
                .filter(|r| r.block_num == record.block_num)
                .count();
            assert_eq!(record.trial_num, earlier + 1);
            self.max_seen = self.max_seen.max(record.trial_num);
            self.inner.write(record)
        }
    }

    let config = ExperimentConfig {
        practice_trials: 0,
        blocks: 2,
        trials_per_block: 6,
        ..ExperimentConfig::default()
    };
    let (mut session, mut host) = setup(config, Participant::default(), 9);
    let mut sink = CountingSink {
        inner: MemorySink::default(),
        max_seen: 0,
    };
    session.run(&mut host, &mut sink).unwrap();
    assert_eq!(sink.max_seen, 6);
    assert_eq!(sink.inner.records.len(), 12);
    let labels: Vec<ResponseLabel> = sink.inner.records.iter().map(|r| r.response).collect();
    assert!(labels.iter().all(|l| *l != ResponseLabel::NA));
}
