use crate::analysis::NetworkScores;
use crate::config::ExperimentConfig;
use crate::driver::TrialDriver;
use crate::error::{HostError, TrialError};
use crate::host::{ResponseCollector, Surface};
use crate::sampler::TrialFactory;
use crate::sink::DataSink;
use crate::trial::TrialPlan;
use ant_core::{Layout, Phase, Registration, TrialIndex, TrialRecord};
use ant_timing::{CalibrationStats, Timer};
use rand::Rng;
use tracing::info;

/// What a finished session hands back.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub records: Vec<TrialRecord>,
    pub scores: NetworkScores,
    pub frame_stats: CalibrationStats,
}

/// Walks the phases from `P::default()` and runs every block of trials.
///
/// Block numbers count up across practice and main blocks; trial numbers
/// restart at 1 in each block.
pub struct ExperimentSession<P: Phase, T: Timer, R: Rng> {
    pub phase: P,
    pub rng: R,
    config: ExperimentConfig,
    layout: Layout,
    factory: TrialFactory,
    driver: TrialDriver<T>,
    block_num: usize,
    records: Vec<TrialRecord>,
}

impl<P, T, R> ExperimentSession<P, T, R>
where
    P: Phase,
    T: Timer,
    R: Rng,
{
    pub fn new(
        config: ExperimentConfig,
        screen: (u32, u32),
        timer: T,
        rng: R,
    ) -> Result<Self, TrialError> {
        config.validate()?;
        let layout = Layout::new(screen, config.display.px_per_degree);
        let factory = TrialFactory::new(config.trial.location_source);
        let driver = TrialDriver::new(config.trial.clone(), config.keymap.clone(), layout, timer);
        Ok(Self {
            phase: P::default(),
            rng,
            config,
            layout,
            factory,
            driver,
            block_num: 0,
            records: Vec::new(),
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn advance_phase(&mut self) -> bool {
        match self.phase.next() {
            Some(next) => {
                info!(from = ?self.phase, to = ?next, "phase change");
                self.phase = next;
                true
            }
            None => false,
        }
    }

    /// Runs every phase to the end. A host abort propagates as an error;
    /// records written before it stay in the sink.
    pub fn run<H, D>(&mut self, host: &mut H, sink: &mut D) -> Result<SessionSummary, TrialError>
    where
        H: Surface + ResponseCollector,
        D: DataSink + ?Sized,
    {
        loop {
            let phase = self.phase;
            if phase.is_welcome() {
                let text = self.config.messages.instructions.clone();
                self.show_message(&text, host)?;
            } else if phase.is_practice() {
                if self.config.practice_trials > 0 {
                    self.run_block(self.config.practice_trials, true, host, sink)?;
                }
            } else if phase.runs_trials() {
                let blocks = self.config.blocks;
                for block in 1..=blocks {
                    self.run_block(self.config.trials_per_block, false, host, sink)?;
                    if block < blocks {
                        let text = self.config.messages.block_break_text(block, blocks);
                        self.show_message(&text, host)?;
                    }
                }
            } else if phase.is_debrief() {
                let summary = self.summary();
                log_summary(&summary);
                let text = self.config.messages.debrief.clone();
                self.show_message(&text, host)?;
            }

            if !self.advance_phase() {
                break;
            }
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            records: self.records.clone(),
            scores: NetworkScores::from_records(&self.records),
            frame_stats: self.driver.timer().calibration_stats(),
        }
    }

    fn run_block<H, D>(
        &mut self,
        len: usize,
        practice: bool,
        host: &mut H,
        sink: &mut D,
    ) -> Result<(), TrialError>
    where
        H: Surface + ResponseCollector,
        D: DataSink + ?Sized,
    {
        self.block_num += 1;
        info!(block = self.block_num, trials = len, practice, "block start");

        let conditions = self.factory.block(len, &mut self.rng);
        for (i, condition) in conditions.into_iter().enumerate() {
            let index = TrialIndex {
                block_num: self.block_num,
                trial_num: i + 1,
                practice,
            };
            let plan = TrialPlan::prepare(
                index,
                condition,
                &self.config.trial,
                &self.layout,
                &mut self.rng,
            )?;
            let record = self.driver.run(&plan, host, sink)?;
            self.records.push(record);
        }
        Ok(())
    }

    fn show_message<H>(&self, text: &str, host: &mut H) -> Result<(), HostError>
    where
        H: Surface + ResponseCollector,
    {
        host.fill();
        host.draw_text(text, Registration::Center, self.layout.center);
        host.present()?;
        host.wait_for_any_key()
    }
}

fn log_summary(summary: &SessionSummary) {
    let scores = &summary.scores;
    info!(
        trials = scores.trials,
        timeouts = scores.timeouts,
        accuracy = scores.accuracy,
        mean_rt_ms = ?scores.mean_rt_ms,
        alerting_ms = ?scores.alerting_ms,
        orienting_ms = ?scores.orienting_ms,
        executive_ms = ?scores.executive_ms,
        "network scores"
    );
    let stats = &summary.frame_stats;
    info!(
        "frame timing: {:.3} ms/frame, {:.1} Hz, jitter {:.3} ms",
        stats.average_frame_time_ns / 1_000_000.0,
        stats.effective_fps,
        stats.jitter_ns / 1_000_000.0,
    );
}
