use crate::error::HostError;
use crate::keymap::KeyMap;
use ant_core::{Point, Registration, ResponseOutcome, Shape};
use std::time::Duration;

/// Draw target the trial driver renders into.
///
/// Nothing is visible until `present`.
pub trait Surface {
    /// Clears the back buffer to the background colour.
    fn fill(&mut self);
    fn draw_at(&mut self, shape: Shape, registration: Registration, position: Point);
    fn draw_text(&mut self, text: &str, registration: Registration, position: Point);
    fn present(&mut self) -> Result<(), HostError>;
}

/// Blocking keyboard input.
pub trait ResponseCollector {
    /// Waits up to `window` for a key in `keymap`.
    ///
    /// Returns the label and the latency from the moment of the call, or the
    /// timeout outcome. Keys outside the map are ignored.
    fn collect(&mut self, window: Duration, keymap: &KeyMap)
    -> Result<ResponseOutcome, HostError>;

    fn wait_for_any_key(&mut self) -> Result<(), HostError>;
}
