use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use string_cache::DefaultAtom as Atom;
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Rendered message pixmaps keyed by their interned text.
pub struct TextCache {
    font: FontArc,
    size_px: f32,
    color: Color,
    map: HashMap<Atom, Arc<Pixmap>>,
}

impl TextCache {
    pub fn new(font: FontArc, size_px: f32, color: Color) -> Self {
        Self {
            font,
            size_px,
            color,
            map: HashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get_or_render(&mut self, text: &str) -> Result<Arc<Pixmap>> {
        let atom = Atom::from(text);
        if let Some(p) = self.map.get(&atom) {
            return Ok(Arc::clone(p));
        }
        let pm = Arc::new(render_text_pixmap(
            &atom,
            self.size_px,
            &self.font,
            self.color,
        )?);
        self.map.insert(atom, Arc::clone(&pm));
        Ok(pm)
    }
}

/// Rasterizes `text` into a tight, transparent pixmap.
///
/// Lines split on `\n` are centred horizontally on the widest one.
pub fn render_text_pixmap(
    text: &str,
    font_size: f32,
    font: &FontArc,
    color: Color,
) -> Result<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);
    let line_height = sf.ascent() - sf.descent() + sf.line_gap();

    // Lay out each line from x = 0, then shift to centre.
    let mut lines: Vec<(Vec<Glyph>, f32)> = Vec::new();
    for (row, line) in text.lines().enumerate() {
        let baseline = sf.ascent() + row as f32 * line_height;
        let mut pen_x = 0.0f32;
        let mut glyphs = Vec::<Glyph>::new();
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = glyphs.last() {
                pen_x += sf.kern(prev.id, id);
            }
            glyphs.push(Glyph {
                id,
                scale,
                position: point(pen_x, baseline),
            });
            pen_x += sf.h_advance(id);
        }
        lines.push((glyphs, pen_x));
    }
    let widest = lines.iter().map(|(_, w)| *w).fold(0.0f32, f32::max);
    let glyphs: Vec<Glyph> = lines
        .into_iter()
        .flat_map(|(glyphs, width)| {
            let shift = (widest - width) * 0.5;
            glyphs.into_iter().map(move |mut g| {
                g.position.x += shift;
                g
            })
        })
        .collect();

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    if outlines.is_empty() {
        return Pixmap::new(1, 1).context("allocating empty text pixmap");
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h).with_context(|| format!("allocating {w}x{h} text pixmap"))?;

    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();
    let cu = color.to_color_u8();

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i64;
            let iy = (y as f32 + b.min.y - min_y).floor() as i64;
            if ix < 0 || iy < 0 || ix >= w as i64 || iy >= h as i64 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // Premultiply by coverage, then composite over what is there.
            let a = (cov * cu.alpha() as f32 / 255.0).clamp(0.0, 1.0);
            let sa = (a * 255.0) as u8;
            let src = [
                (cu.red() as f32 * a) as u8,
                (cu.green() as f32 * a) as u8,
                (cu.blue() as f32 * a) as u8,
                sa,
            ];
            dst[i] = over(src, dst[i]);
        });
    }

    Ok(pm)
}

/// Porter-Duff over for premultiplied pixels.
pub(crate) fn over(src: [u8; 4], dst: PremultipliedColorU8) -> PremultipliedColorU8 {
    let inv = 255 - src[3] as u32;
    let mix = |s: u8, d: u8| (s as u32 + (d as u32 * inv + 127) / 255).min(255) as u8;
    let r = mix(src[0], dst.red());
    let g = mix(src[1], dst.green());
    let b = mix(src[2], dst.blue());
    let a = mix(src[3], dst.alpha());
    PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a).unwrap_or(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opaque_replaces() {
        let bg = PremultipliedColorU8::from_rgba(255, 255, 255, 255).unwrap();
        let out = over([0, 0, 0, 255], bg);
        assert_eq!((out.red(), out.alpha()), (0, 255));
    }

    #[test]
    fn over_transparent_keeps_destination() {
        let bg = PremultipliedColorU8::from_rgba(10, 20, 30, 255).unwrap();
        assert_eq!(over([0, 0, 0, 0], bg), bg);
    }

    #[test]
    fn half_coverage_blends() {
        let bg = PremultipliedColorU8::from_rgba(255, 255, 255, 255).unwrap();
        let out = over([0, 0, 0, 128], bg);
        assert_eq!(out.alpha(), 255);
        assert!((120..=135).contains(&out.red()));
    }
}
