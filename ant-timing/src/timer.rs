use std::time::{Duration, Instant};

/// Monotonic clock used to time trials and frames
pub trait Timer: Clone + Send + Sync {
    /// Nanoseconds since the timer was created.
    fn now(&self) -> u64;
    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }
    fn sleep(&self, d: Duration);
    fn record_frame(&mut self, d: Duration);
    fn frame_count(&self) -> usize;
    fn calibration_stats(&self) -> CalibrationStats;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

impl CalibrationStats {
    pub fn from_frames(frames: &[Duration]) -> Self {
        if frames.is_empty() {
            return Self::default();
        }
        let times: Vec<f64> = frames.iter().map(|d| d.as_nanos() as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

/// Keeps the most recent frame durations in a bounded window.
pub(crate) fn push_frame(frames: &mut Vec<Duration>, max_samples: usize, d: Duration) {
    if frames.len() >= max_samples {
        frames.remove(0);
    }
    frames.push(d);
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub frame_times: Vec<Duration>,
    pub max_samples: usize,
    frames_seen: usize,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn record_frame(&mut self, d: Duration) {
        push_frame(&mut self.frame_times, self.max_samples, d);
        self.frames_seen += 1;
    }
    fn frame_count(&self) -> usize {
        self.frames_seen
    }
    fn calibration_stats(&self) -> CalibrationStats {
        CalibrationStats::from_frames(&self.frame_times)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frame_times: Vec::with_capacity(1000),
            max_samples: 1000,
            frames_seen: 0,
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut()) };
        if rc != 0 {
            tracing::warn!(rc, "clock_nanosleep interrupted, falling back to thread::sleep");
            std::thread::sleep(duration);
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_no_frames_are_zero() {
        assert_eq!(CalibrationStats::from_frames(&[]), CalibrationStats::default());
    }

    #[test]
    fn stats_of_steady_frames() {
        let frames = vec![Duration::from_millis(10); 30];
        let stats = CalibrationStats::from_frames(&frames);
        assert_eq!(stats.average_frame_time_ns, 10_000_000.0);
        assert_eq!(stats.jitter_ns, 0.0);
        assert!((stats.effective_fps - 100.0).abs() < 1e-9);
    }

    #[test]
    fn frame_window_is_bounded() {
        let mut timer = HighPrecisionTimer::new();
        timer.max_samples = 3;
        for ms in 1..=5 {
            timer.record_frame(Duration::from_millis(ms));
        }
        assert_eq!(timer.frame_times.len(), 3);
        assert_eq!(timer.frame_times[0], Duration::from_millis(3));
        assert_eq!(timer.frame_count(), 5);
    }

    #[test]
    fn sleep_advances_the_clock() {
        let timer = HighPrecisionTimer::new();
        let t0 = timer.now();
        timer.sleep(Duration::from_millis(2));
        assert!(timer.elapsed(t0) >= Duration::from_millis(2));
    }
}
