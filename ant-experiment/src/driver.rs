use crate::config::TrialConfig;
use crate::error::{HostError, TrialError};
use crate::evaluate::evaluate;
use crate::host::{ResponseCollector, Surface};
use crate::keymap::KeyMap;
use crate::sink::DataSink;
use crate::trial::TrialPlan;
use ant_core::{EventLabel, Layout, Registration, Shape, TrialRecord, TrialState};
use ant_timing::Timer;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub state: TrialState,
    /// Elapsed trial time when the state was entered.
    pub at_ms: u64,
}

/// Runs single trials against a host.
///
/// Every transition except the end of the response window is decided by
/// polling the trial's timeline once per presented frame.
pub struct TrialDriver<T: Timer> {
    config: TrialConfig,
    keymap: KeyMap,
    layout: Layout,
    timer: T,
    state: TrialState,
    history: Vec<StateChange>,
    last_present: Option<u64>,
}

impl<T: Timer> TrialDriver<T> {
    pub fn new(config: TrialConfig, keymap: KeyMap, layout: Layout, timer: T) -> Self {
        Self {
            config,
            keymap,
            layout,
            timer,
            state: TrialState::Done,
            history: Vec::new(),
            last_present: None,
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    /// States visited by the most recent trial, in order.
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Frame intervals are recorded on this timer while a trial polls.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Runs `plan` to completion and hands its record to `sink`.
    pub fn run<H, D>(
        &mut self,
        plan: &TrialPlan,
        host: &mut H,
        sink: &mut D,
    ) -> Result<TrialRecord, TrialError>
    where
        H: Surface + ResponseCollector,
        D: DataSink + ?Sized,
    {
        let timeline = &plan.timeline;
        let start = self.timer.now();
        self.history.clear();
        self.last_present = None;
        self.enter(TrialState::PreCue, 0);

        loop {
            let now = self.elapsed_ms(start);
            if !timeline.before(EventLabel::TargetOn, now)? {
                break;
            }
            let state = if timeline.before(EventLabel::CueOn, now)? {
                TrialState::PreCue
            } else if timeline.between(EventLabel::CueOn, EventLabel::CueOff, now)? {
                TrialState::CueVisible
            } else {
                TrialState::PostCueWait
            };
            self.enter(state, now);
            self.draw_frame(state, plan, host)?;
        }

        self.enter(TrialState::TargetVisible, self.elapsed_ms(start));
        self.draw_frame(TrialState::TargetVisible, plan, host)?;
        let outcome = host.collect(self.config.response_window(), &self.keymap)?;
        self.last_present = None;

        let feedback = plan
            .feedback_enabled(&self.config)
            .then_some(&self.config.feedback);
        let evaluation = evaluate(&outcome, &plan.condition, feedback);

        match &evaluation.feedback {
            Some(message) => {
                self.enter(TrialState::Feedback, self.elapsed_ms(start));
                self.draw_feedback(message, host)?;
                host.wait_for_any_key()?;
            }
            None => {
                self.enter(TrialState::PostResponseHold, self.elapsed_ms(start));
                self.draw_frame(TrialState::PostResponseHold, plan, host)?;
                while timeline.before(EventLabel::TrialEnd, self.elapsed_ms(start))? {
                    self.draw_frame(TrialState::PostResponseHold, plan, host)?;
                }
            }
        }

        self.enter(TrialState::Done, self.elapsed_ms(start));
        let record = TrialRecord::new(
            plan.index,
            &plan.condition,
            plan.cue_onset_ms,
            &outcome,
            evaluation.correct,
        );
        sink.write(&record)?;

        debug!(
            block = record.block_num,
            trial = record.trial_num,
            cue = %record.cue_type,
            flanker = %record.flanker_type,
            response = record.response.as_str(),
            rt = f64::from(record.rt),
            correct = record.correct,
            "trial complete"
        );
        Ok(record)
    }

    fn elapsed_ms(&self, start: u64) -> u64 {
        self.timer.now().saturating_sub(start) / 1_000_000
    }

    fn enter(&mut self, state: TrialState, at_ms: u64) {
        if self.history.last().is_some_and(|c| c.state == state) {
            return;
        }
        trace!(from = ?self.state, to = ?state, at_ms, "trial state");
        self.state = state;
        self.history.push(StateChange { state, at_ms });
    }

    fn draw_frame<S: Surface>(
        &mut self,
        state: TrialState,
        plan: &TrialPlan,
        surface: &mut S,
    ) -> Result<(), HostError> {
        surface.fill();
        if state.shows_fixation() {
            surface.draw_at(Shape::Fixation, Registration::Center, self.layout.center);
        }
        if state.shows_cue() {
            for &pos in &plan.stimuli.cue_positions {
                surface.draw_at(Shape::Cue, Registration::Center, pos);
            }
        }
        if state.shows_target() {
            let stimuli = &plan.stimuli;
            surface.draw_at(stimuli.target, Registration::Center, stimuli.target_position);
            for &pos in &stimuli.flanker_positions {
                surface.draw_at(stimuli.flanker, Registration::Center, pos);
            }
        }
        surface.present()?;

        let now = self.timer.now();
        if let Some(prev) = self.last_present.replace(now) {
            self.timer
                .record_frame(Duration::from_nanos(now.saturating_sub(prev)));
        }
        Ok(())
    }

    /// Message in the upper row and prompt below, with the fixation cross kept.
    fn draw_feedback<S: Surface>(&self, message: &str, surface: &mut S) -> Result<(), HostError> {
        let (cx, cy) = self.layout.center;
        let prompt_y = cy + 2.0 * (self.layout.below.1 - cy);
        surface.fill();
        surface.draw_at(Shape::Fixation, Registration::Center, self.layout.center);
        surface.draw_text(message, Registration::Center, self.layout.above);
        surface.draw_text(
            &self.config.feedback.continue_prompt,
            Registration::Center,
            (cx, prompt_y),
        );
        surface.present()
    }
}
