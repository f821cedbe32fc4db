use crate::shapes;
use crate::text::{TextCache, over};
use ab_glyph::FontArc;
use ant_core::{Geometry, Point, Registration, Shape};
use anyhow::{Context, Result, ensure};
use tiny_skia::{Color, Pixmap};
use tracing::{debug, warn};

pub const DEFAULT_TEXT_PX: f32 = 28.0;

/// Background and stimulus colours as straight RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 4],
    pub foreground: [u8; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            foreground: [0, 0, 0, 255],
        }
    }
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

/// Software renderer onto an offscreen premultiplied canvas.
///
/// Only regions touched since the last copy are cleared and copied out,
/// except after creation or a resize when the whole frame goes.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    background: Color,
    shapes: Vec<Pixmap>,
    text_cache: Option<TextCache>,
    canvas: Pixmap,
    dirty: Vec<Region>,
    erased: Vec<Region>,
    full_redraw: bool,
    warned_no_font: bool,
}

impl SkiaRenderer {
    pub fn new(
        width: u32,
        height: u32,
        geometry: &Geometry,
        palette: Palette,
        font: Option<FontArc>,
    ) -> Result<Self> {
        let background = color(palette.background);
        let foreground = color(palette.foreground);
        let mut canvas =
            Pixmap::new(width, height).with_context(|| format!("allocating {width}x{height} canvas"))?;
        canvas.fill(background);

        let shapes = shapes::render_all(geometry, foreground)?;
        debug!(width, height, shapes = shapes.len(), "renderer ready");

        Ok(Self {
            width,
            height,
            background,
            shapes,
            text_cache: font.map(|f| TextCache::new(f, DEFAULT_TEXT_PX, foreground)),
            canvas,
            dirty: Vec::with_capacity(16),
            erased: Vec::with_capacity(16),
            full_redraw: true,
            warned_no_font: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let mut canvas =
            Pixmap::new(width, height).with_context(|| format!("resizing canvas to {width}x{height}"))?;
        canvas.fill(self.background);
        self.canvas = canvas;
        self.width = width;
        self.height = height;
        self.dirty.clear();
        self.erased.clear();
        self.full_redraw = true;
        Ok(())
    }

    /// Clears everything drawn since the previous `fill`.
    pub fn fill(&mut self) {
        if self.full_redraw {
            self.canvas.fill(self.background);
            self.dirty.clear();
            return;
        }
        let bg = self.background.premultiply().to_color_u8();
        let stride = self.width as usize;
        let pixels = self.canvas.pixels_mut();
        for r in &self.dirty {
            for row in r.y..r.y + r.h {
                let off = row * stride + r.x;
                pixels[off..off + r.w].fill(bg);
            }
        }
        self.erased.append(&mut self.dirty);
    }

    pub fn draw_shape(&mut self, shape: Shape, registration: Registration, position: Point) {
        let pm = &self.shapes[shape.cache_index()];
        let origin = registration.origin(position, (pm.width() as f32, pm.height() as f32));
        if let Some(region) = blit(&mut self.canvas, pm, origin) {
            self.dirty.push(region);
        }
    }

    /// Draws `text` in the foreground colour. Without a font this is a no-op.
    pub fn draw_text(&mut self, text: &str, registration: Registration, position: Point) -> Result<()> {
        let Some(cache) = self.text_cache.as_mut() else {
            if !self.warned_no_font {
                warn!("no font loaded, skipping text");
                self.warned_no_font = true;
            }
            return Ok(());
        };
        let pm = cache.get_or_render(text)?;
        let origin = registration.origin(position, (pm.width() as f32, pm.height() as f32));
        if let Some(region) = blit(&mut self.canvas, &pm, origin) {
            self.dirty.push(region);
        }
        Ok(())
    }

    /// Copies changed pixels into an RGBA frame of the same size.
    ///
    /// Returns the number of regions copied.
    pub fn copy_to(&mut self, frame: &mut [u8]) -> Result<usize> {
        let data = self.canvas.data();
        ensure!(
            frame.len() == data.len(),
            "frame is {} bytes, canvas is {}",
            frame.len(),
            data.len()
        );
        if self.full_redraw {
            frame.copy_from_slice(data);
            self.full_redraw = false;
            self.erased.clear();
            return Ok(1);
        }

        let row_bytes = self.width as usize * 4;
        let mut copied = 0;
        for r in self.erased.iter().chain(self.dirty.iter()) {
            for row in r.y..r.y + r.h {
                let off = row * row_bytes + r.x * 4;
                frame[off..off + r.w * 4].copy_from_slice(&data[off..off + r.w * 4]);
            }
            copied += 1;
        }
        self.erased.clear();
        Ok(copied)
    }

    pub fn data(&self) -> &[u8] {
        self.canvas.data()
    }

    /// Straight RGBA at `(x, y)`. The canvas is opaque, so this matches the
    /// premultiplied bytes.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p = self.canvas.pixel(x, y)?.demultiply();
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    pub fn cached_texts(&self) -> usize {
        self.text_cache.as_ref().map_or(0, TextCache::len)
    }
}

/// Composites `src` onto `canvas` with its top-left at `origin`, clipped.
fn blit(canvas: &mut Pixmap, src: &Pixmap, origin: Point) -> Option<Region> {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let (sw, sh) = (src.width() as i64, src.height() as i64);
    let x0 = origin.0.round() as i64;
    let y0 = origin.1.round() as i64;

    let dx0 = x0.max(0);
    let dy0 = y0.max(0);
    let dx1 = (x0 + sw).min(cw);
    let dy1 = (y0 + sh).min(ch);
    if dx1 <= dx0 || dy1 <= dy0 {
        return None;
    }
    let (w, h) = ((dx1 - dx0) as usize, (dy1 - dy0) as usize);
    let (sx, sy) = ((dx0 - x0) as usize, (dy0 - y0) as usize);
    let (dx, dy) = (dx0 as usize, dy0 as usize);

    let src_stride = sw as usize;
    let dst_stride = cw as usize;
    let src_px = src.pixels();
    let dst_px = canvas.pixels_mut();
    for row in 0..h {
        let s = (sy + row) * src_stride + sx;
        let d = (dy + row) * dst_stride + dx;
        for i in 0..w {
            let p = src_px[s + i];
            match p.alpha() {
                0 => {}
                255 => dst_px[d + i] = p,
                _ => dst_px[d + i] = over([p.red(), p.green(), p.blue(), p.alpha()], dst_px[d + i]),
            }
        }
    }
    Some(Region { x: dx, y: dy, w, h })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ant_core::Layout;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn renderer() -> (SkiaRenderer, Layout) {
        let layout = Layout::new((320, 240), 40.0);
        let r = SkiaRenderer::new(320, 240, &layout.geometry, Palette::default(), None).unwrap();
        (r, layout)
    }

    #[test]
    fn starts_with_the_background() {
        let (r, _) = renderer();
        assert_eq!(r.pixel(0, 0), Some(WHITE));
        assert_eq!(r.pixel(319, 239), Some(WHITE));
    }

    #[test]
    fn fixation_covers_the_centre_pixel() {
        let (mut r, layout) = renderer();
        r.fill();
        r.draw_shape(Shape::Fixation, Registration::Center, layout.center);
        let (cx, cy) = (layout.center.0 as u32, layout.center.1 as u32);
        assert_eq!(r.pixel(cx, cy), Some(BLACK));
        assert_eq!(r.pixel(cx + 30, cy + 30), Some(WHITE));
    }

    #[test]
    fn fill_erases_the_previous_frame() {
        let (mut r, layout) = renderer();
        let mut frame = vec![0u8; 320 * 240 * 4];
        r.fill();
        r.draw_shape(Shape::Cue, Registration::Center, layout.above);
        assert_eq!(r.copy_to(&mut frame).unwrap(), 1);

        r.fill();
        r.draw_shape(Shape::Fixation, Registration::Center, layout.center);
        let (ax, ay) = (layout.above.0 as u32, layout.above.1 as u32);
        assert_eq!(r.pixel(ax, ay), Some(WHITE));
        assert_eq!(r.copy_to(&mut frame).unwrap(), 2);
        assert_eq!(frame, r.data());
    }

    #[test]
    fn clipped_shapes_do_not_panic() {
        let (mut r, _) = renderer();
        r.fill();
        r.draw_shape(Shape::RightArrow, Registration::Center, (0.0, 0.0));
        r.draw_shape(Shape::LeftArrow, Registration::TopLeft, (1000.0, 1000.0));
        // Lands in the tail of the right arrow.
        assert_eq!(r.pixel(0, 0), Some(BLACK));
        assert_eq!(r.pixel(319, 239), Some(WHITE));
    }

    #[test]
    fn text_without_a_font_is_skipped() {
        let (mut r, layout) = renderer();
        r.draw_text("Press any key", Registration::Center, layout.center).unwrap();
        assert_eq!(r.cached_texts(), 0);
    }

    #[test]
    fn copy_rejects_a_wrong_sized_frame() {
        let (mut r, _) = renderer();
        assert!(r.copy_to(&mut [0u8; 16]).is_err());
    }

    #[test]
    fn resize_forces_a_full_copy() {
        let (mut r, _) = renderer();
        let mut frame = vec![0u8; 320 * 240 * 4];
        r.copy_to(&mut frame).unwrap();
        r.resize(160, 120).unwrap();
        let mut small = vec![0u8; 160 * 120 * 4];
        assert_eq!(r.copy_to(&mut small).unwrap(), 1);
        assert!(small.chunks(4).all(|p| p == WHITE));
    }
}
