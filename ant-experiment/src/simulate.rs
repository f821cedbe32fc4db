use crate::error::HostError;
use crate::host::{ResponseCollector, Surface};
use crate::keymap::KeyMap;
use ant_core::{
    ArrowDirection, CueType, FlankerType, Layout, Point, Registration, ResponseLabel,
    ResponseOutcome, Shape,
};
use ant_timing::{ManualTimer, Timer};
use rand::Rng;
use std::time::Duration;

/// Reaction-time model of a simulated participant.
///
/// Any cue speeds responses by `alerting_ms`; a spatial cue in the target's
/// row adds `orienting_ms` on top. Incongruent flankers cost `conflict_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub base_rt_ms: f64,
    pub alerting_ms: f64,
    pub orienting_ms: f64,
    pub conflict_ms: f64,
    /// Uniform noise of +/- this many ms.
    pub jitter_ms: f64,
    pub error_rate: f64,
}

impl Default for Participant {
    fn default() -> Self {
        Self {
            base_rt_ms: 560.0,
            alerting_ms: 40.0,
            orienting_ms: 50.0,
            conflict_ms: 90.0,
            jitter_ms: 30.0,
            error_rate: 0.03,
        }
    }
}

impl Participant {
    pub fn reaction_time<R: Rng>(
        &self,
        cue: CueType,
        cue_valid: bool,
        flanker: FlankerType,
        rng: &mut R,
    ) -> f64 {
        let mut rt = self.base_rt_ms;
        if cue != CueType::None {
            rt -= self.alerting_ms;
        }
        if cue == CueType::Spatial && cue_valid {
            rt -= self.orienting_ms;
        }
        if flanker == FlankerType::Incongruent {
            rt += self.conflict_ms;
        }
        if self.jitter_ms > 0.0 {
            rt += rng.random_range(-self.jitter_ms..=self.jitter_ms);
        }
        rt.max(100.0)
    }
}

/// Headless host driven by a shared `ManualTimer`.
///
/// It reads the trial back from what gets drawn: the shape on the
/// vertical midline of a row is the target, the others are flankers, and
/// asterisks presented before it are the cues.
pub struct SimulatedHost<R: Rng> {
    timer: ManualTimer,
    layout: Layout,
    participant: Participant,
    rng: R,
    frame: Duration,
    pending: Vec<(Shape, Point)>,
    cues: Vec<Point>,
    target: Option<(Shape, Point)>,
    flanker: Option<Shape>,
    frames: usize,
    texts: Vec<String>,
    keys_pressed: Vec<String>,
    keys_waited: usize,
}

impl<R: Rng> SimulatedHost<R> {
    pub fn new(timer: ManualTimer, layout: Layout, participant: Participant, rng: R) -> Self {
        Self {
            timer,
            layout,
            participant,
            rng,
            frame: Duration::from_nanos(16_666_667),
            pending: Vec::new(),
            cues: Vec::new(),
            target: None,
            flanker: None,
            frames: 0,
            texts: Vec::new(),
            keys_pressed: Vec::new(),
            keys_waited: 0,
        }
    }

    pub fn with_frame_interval(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    pub fn timer(&self) -> &ManualTimer {
        &self.timer
    }

    pub fn frames_presented(&self) -> usize {
        self.frames
    }

    /// Every text drawn so far, in order.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn keys_pressed(&self) -> &[String] {
        &self.keys_pressed
    }

    pub fn keys_waited(&self) -> usize {
        self.keys_waited
    }

    fn perceived_cue(&self, target_row: f32) -> (CueType, bool) {
        let (cx, cy) = self.layout.center;
        match self.cues.as_slice() {
            [] => (CueType::None, false),
            [(_, y)] if *y == cy => (CueType::Central, false),
            [(x, y)] if *x == cx => (CueType::Spatial, *y == target_row),
            _ => (CueType::Double, false),
        }
    }

    fn perceived_flanker(&self, target: Shape) -> FlankerType {
        match self.flanker {
            Some(Shape::NeutralLine) | None => FlankerType::Neutral,
            Some(shape) if shape == target => FlankerType::Congruent,
            Some(_) => FlankerType::Incongruent,
        }
    }
}

impl<R: Rng> Surface for SimulatedHost<R> {
    fn fill(&mut self) {
        self.pending.clear();
    }

    fn draw_at(&mut self, shape: Shape, _registration: Registration, position: Point) {
        self.pending.push((shape, position));
    }

    fn draw_text(&mut self, text: &str, _registration: Registration, _position: Point) {
        self.texts.push(text.to_string());
    }

    fn present(&mut self) -> Result<(), HostError> {
        let cx = self.layout.center.0;
        let cues: Vec<Point> = self
            .pending
            .iter()
            .filter(|(shape, _)| *shape == Shape::Cue)
            .map(|(_, pos)| *pos)
            .collect();
        if !cues.is_empty() {
            self.cues = cues;
        }
        for &(shape, pos) in &self.pending {
            if !shape.is_flanker_shape() {
                continue;
            }
            if pos.0 == cx {
                self.target = Some((shape, pos));
            } else {
                self.flanker = Some(shape);
            }
        }
        self.pending.clear();
        self.frames += 1;
        self.timer.advance(self.frame);
        Ok(())
    }
}

impl<R: Rng> ResponseCollector for SimulatedHost<R> {
    fn collect(
        &mut self,
        window: Duration,
        keymap: &KeyMap,
    ) -> Result<ResponseOutcome, HostError> {
        let (target, (_, row)) = self
            .target
            .take()
            .ok_or_else(|| HostError::Input("no target on screen".into()))?;
        let direction = match target {
            Shape::LeftArrow => ArrowDirection::Left,
            Shape::RightArrow => ArrowDirection::Right,
            other => return Err(HostError::Input(format!("{other:?} is not a target"))),
        };
        let (cue, cue_valid) = self.perceived_cue(row);
        let flanker = self.perceived_flanker(target);
        self.cues.clear();
        self.flanker = None;

        let rt = self
            .participant
            .reaction_time(cue, cue_valid, flanker, &mut self.rng);
        if rt >= window.as_secs_f64() * 1000.0 {
            self.timer.advance(window);
            return Ok(ResponseOutcome::timeout());
        }

        let error_rate = self.participant.error_rate.clamp(0.0, 1.0);
        let pressed = if self.rng.random_bool(error_rate) {
            direction.opposite()
        } else {
            direction
        };
        let key = keymap
            .key_for(ResponseLabel::from(pressed))
            .ok_or_else(|| HostError::Input(format!("no key bound to {pressed}")))?
            .to_string();
        let label = keymap
            .label_for(&key)
            .ok_or_else(|| HostError::Input(format!("key {key:?} is not mapped")))?;

        self.timer.advance(Duration::from_secs_f64(rt / 1000.0));
        self.keys_pressed.push(key);
        Ok(ResponseOutcome::response(label, rt))
    }

    fn wait_for_any_key(&mut self) -> Result<(), HostError> {
        self.keys_waited += 1;
        self.timer.advance(Duration::from_millis(500));
        Ok(())
    }
}
