use ant_core::{Layout, Point, Registration, ResponseOutcome, Shape};
use ant_experiment::{HostError, KeyMap, ResponseCollector, Surface};
use ant_render::{FontArc, Palette, SkiaRenderer};
use ant_timing::{HighPrecisionTimer, Timer};
use anyhow::{Result, anyhow, bail};
use pixels::{Pixels, SurfaceTexture};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowId},
};

const OPEN_TIMEOUT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(1);
const KEY_WAIT_POLL: Duration = Duration::from_millis(10);

pub struct WindowOptions {
    pub title: String,
    pub fullscreen: bool,
    pub px_per_degree: f32,
    pub palette: Palette,
    pub font: Option<FontArc>,
}

#[derive(Debug, Clone)]
struct KeyPress {
    key: String,
    at_ns: u64,
}

/// Window, GPU surface and renderer, driven by winit callbacks.
struct HostState {
    options: WindowOptions,
    timer: HighPrecisionTimer,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    size: Option<PhysicalSize<u32>>,
    keys: VecDeque<KeyPress>,
    abort_requested: bool,
    error: Option<String>,
}

impl HostState {
    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;
        let refresh_rate = monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let mut attributes = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_resizable(false);
        attributes = if self.options.fullscreen {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
        } else {
            attributes.with_inner_size(PhysicalSize::new(1280u32, 720u32))
        };

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = ?refresh_rate,
            "display configured"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);

        let layout = Layout::new((size.width, size.height), self.options.px_per_degree);
        self.renderer = Some(SkiaRenderer::new(
            size.width,
            size.height,
            &layout.geometry,
            self.options.palette,
            self.options.font.clone(),
        )?);

        window.set_cursor_visible(false);
        self.size = Some(size);
        self.window = Some(window);
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = self.pixels.as_mut() {
            pixels.resize_surface(size.width, size.height)?;
            pixels.resize_buffer(size.width, size.height)?;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            if (renderer.width(), renderer.height()) != (size.width, size.height) {
                renderer.resize(size.width, size.height)?;
            }
        }
        self.size = Some(size);
        debug!(width = size.width, height = size.height, "display resized");
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if !event.state.is_pressed() || event.repeat {
            return;
        }
        let key = match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                self.abort_requested = true;
                return;
            }
            Key::Named(NamedKey::Space) => " ".to_string(),
            Key::Character(c) => c.to_string(),
            Key::Named(named) => format!("{named:?}").to_lowercase(),
            _ => return,
        };
        self.keys.push_back(KeyPress {
            key,
            at_ns: self.timer.now(),
        });
    }

    fn fail(&mut self, context: &str, err: impl std::fmt::Display) {
        warn!("{context}: {err}");
        self.error = Some(format!("{context}: {err}"));
    }
}

impl ApplicationHandler for HostState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail("failed to create window and surface", e);
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.abort_requested = true,
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::Resized(size) => {
                if let Err(e) = self.handle_resize(size) {
                    self.fail("failed to resize", e);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    if let Err(e) = self.handle_resize(size) {
                        self.fail("failed to resize", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Blocking host over a winit window.
///
/// OS events are pumped from inside `present`, `collect` and
/// `wait_for_any_key`, so the experiment runs on the main thread without
/// handing control to the event loop.
pub struct WindowHost {
    event_loop: EventLoop<()>,
    state: HostState,
}

impl WindowHost {
    pub fn open(options: WindowOptions, timer: HighPrecisionTimer) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "opening window"
        );
        let mut host = Self {
            event_loop,
            state: HostState {
                options,
                timer,
                window: None,
                pixels: None,
                renderer: None,
                size: None,
                keys: VecDeque::new(),
                abort_requested: false,
                error: None,
            },
        };

        let start = host.state.timer.now();
        while host.state.renderer.is_none() {
            host.pump(Some(Duration::from_millis(10)))?;
            if host.state.timer.elapsed(start) > OPEN_TIMEOUT {
                bail!("window did not open within {OPEN_TIMEOUT:?}");
            }
        }
        Ok(host)
    }

    /// Physical size of the drawable area.
    pub fn screen(&self) -> (u32, u32) {
        self.state
            .size
            .map(|s| (s.width, s.height))
            .unwrap_or((0, 0))
    }

    fn pump(&mut self, timeout: Option<Duration>) -> Result<(), HostError> {
        let status = self.event_loop.pump_app_events(timeout, &mut self.state);
        if let PumpStatus::Exit(code) = status {
            debug!(code, "event loop exited");
            return Err(HostError::Aborted);
        }
        if let Some(err) = self.state.error.take() {
            return Err(HostError::Display(err));
        }
        if self.state.abort_requested {
            return Err(HostError::Aborted);
        }
        Ok(())
    }

    fn renderer(&mut self) -> Option<&mut SkiaRenderer> {
        self.state.renderer.as_mut()
    }
}

impl Surface for WindowHost {
    fn fill(&mut self) {
        if let Some(r) = self.renderer() {
            r.fill();
        }
    }

    fn draw_at(&mut self, shape: Shape, registration: Registration, position: Point) {
        if let Some(r) = self.renderer() {
            r.draw_shape(shape, registration, position);
        }
    }

    fn draw_text(&mut self, text: &str, registration: Registration, position: Point) {
        if let Some(r) = self.renderer() {
            if let Err(e) = r.draw_text(text, registration, position) {
                warn!("failed to draw text: {e:#}");
            }
        }
    }

    fn present(&mut self) -> Result<(), HostError> {
        self.pump(Some(Duration::ZERO))?;
        let state = &mut self.state;
        let (Some(pixels), Some(renderer)) = (state.pixels.as_mut(), state.renderer.as_mut())
        else {
            return Err(HostError::Display("no surface to present to".into()));
        };
        renderer
            .copy_to(pixels.frame_mut())
            .map_err(|e| HostError::Display(format!("{e:#}")))?;
        pixels
            .render()
            .map_err(|e| HostError::Display(e.to_string()))?;
        if let Some(window) = &state.window {
            window.request_redraw();
        }
        Ok(())
    }
}

impl ResponseCollector for WindowHost {
    fn collect(
        &mut self,
        window: Duration,
        keymap: &KeyMap,
    ) -> Result<ResponseOutcome, HostError> {
        let start = self.state.timer.now();
        self.state.keys.clear();
        loop {
            self.pump(Some(POLL))?;
            while let Some(press) = self.state.keys.pop_front() {
                let Some(label) = keymap.label_for(&press.key) else {
                    continue;
                };
                let latency = Duration::from_nanos(press.at_ns.saturating_sub(start));
                if latency < window {
                    return Ok(ResponseOutcome::response(
                        label,
                        latency.as_secs_f64() * 1000.0,
                    ));
                }
            }
            if self.state.timer.elapsed(start) >= window {
                return Ok(ResponseOutcome::timeout());
            }
        }
    }

    /// Key latency is not measured here, so events are drained between sleeps.
    fn wait_for_any_key(&mut self) -> Result<(), HostError> {
        self.state.keys.clear();
        loop {
            self.pump(Some(Duration::ZERO))?;
            self.state.timer.sleep(KEY_WAIT_POLL);
            if self.state.keys.pop_front().is_some() {
                self.state.keys.clear();
                return Ok(());
            }
        }
    }
}

impl Drop for WindowHost {
    fn drop(&mut self) {
        if let Some(window) = &self.state.window {
            window.set_cursor_visible(true);
        }
        debug!("window host closed");
    }
}
