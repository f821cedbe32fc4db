use ant_core::{ArrowDirection, Geometry, Shape};
use anyhow::{Context, Result};
use std::f32::consts::FRAC_PI_4;
use tiny_skia::{Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Pre-rendered pixmaps for every `Shape`, indexed by `Shape::cache_index`.
pub fn render_all(geometry: &Geometry, color: Color) -> Result<Vec<Pixmap>> {
    let mut cache: Vec<Option<Pixmap>> = vec![None; Shape::ALL.len()];
    for shape in Shape::ALL {
        cache[shape.cache_index()] = Some(render_shape(shape, geometry, color)?);
    }
    cache
        .into_iter()
        .enumerate()
        .map(|(i, pm)| pm.with_context(|| format!("no shape for cache slot {i}")))
        .collect()
}

pub fn render_shape(shape: Shape, geometry: &Geometry, color: Color) -> Result<Pixmap> {
    let g = geometry;
    match shape {
        Shape::Fixation => cross(g.fixation_size, g.fixation_thickness, color),
        Shape::Cue => asterisk(g.cue_size, g.cue_thickness, color),
        Shape::LeftArrow => arrow(ArrowDirection::Left, g, color),
        Shape::RightArrow => arrow(ArrowDirection::Right, g, color),
        Shape::NeutralLine => {
            let mut pm = pixmap(g.arrow_len(), g.arrow_tail_width)?;
            fill_rect(&mut pm, 0.0, 0.0, g.arrow_len() as f32, g.arrow_tail_width as f32, color)?;
            Ok(pm)
        }
    }
}

fn pixmap(w: u32, h: u32) -> Result<Pixmap> {
    Pixmap::new(w, h).with_context(|| format!("allocating {w}x{h} shape pixmap"))
}

fn paint(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = anti_alias;
    paint.set_color(color);
    paint
}

fn fill_rect(pm: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<()> {
    let rect = Rect::from_xywh(x, y, w, h).with_context(|| format!("bad rect {w}x{h}"))?;
    pm.fill_rect(rect, &paint(color, false), Transform::identity(), None);
    Ok(())
}

fn cross(size: u32, thickness: u32, color: Color) -> Result<Pixmap> {
    let mut pm = pixmap(size, size)?;
    let (s, t) = (size as f32, thickness as f32);
    let mid = ((s - t) * 0.5).floor();
    fill_rect(&mut pm, 0.0, mid, s, t, color)?;
    fill_rect(&mut pm, mid, 0.0, t, s, color)?;
    Ok(pm)
}

/// Eight spokes from the centre.
fn asterisk(size: u32, thickness: u32, color: Color) -> Result<Pixmap> {
    let mut pm = pixmap(size, size)?;
    let c = size as f32 * 0.5;
    let r = c - thickness as f32 * 0.5;

    let mut pb = PathBuilder::new();
    for k in 0..4 {
        let (sin, cos) = (k as f32 * FRAC_PI_4).sin_cos();
        pb.move_to(c - r * cos, c - r * sin);
        pb.line_to(c + r * cos, c + r * sin);
    }
    let path = pb.finish().context("building cue path")?;
    let stroke = Stroke {
        width: thickness as f32,
        line_cap: LineCap::Butt,
        ..Stroke::default()
    };
    pm.stroke_path(&path, &paint(color, true), &stroke, Transform::identity(), None);
    Ok(pm)
}

/// Rectangular tail with a triangular head, vertically centred.
fn arrow(direction: ArrowDirection, g: &Geometry, color: Color) -> Result<Pixmap> {
    let len = g.arrow_len() as f32;
    let tail = g.arrow_tail_len as f32;
    let head = g.arrow_head_len as f32;
    let height = g.arrow_head_width.max(g.arrow_tail_width);
    let h = height as f32;
    let tw = g.arrow_tail_width as f32;
    let mut pm = pixmap(g.arrow_len(), height)?;

    let mut pb = PathBuilder::new();
    match direction {
        ArrowDirection::Right => {
            fill_rect(&mut pm, 0.0, (h - tw) * 0.5, tail, tw, color)?;
            pb.move_to(tail, 0.0);
            pb.line_to(len, h * 0.5);
            pb.line_to(tail, h);
        }
        ArrowDirection::Left => {
            fill_rect(&mut pm, head, (h - tw) * 0.5, tail, tw, color)?;
            pb.move_to(head, 0.0);
            pb.line_to(0.0, h * 0.5);
            pb.line_to(head, h);
        }
    }
    pb.close();
    let path = pb.finish().context("building arrow head")?;
    pm.fill_path(&path, &paint(color, true), FillRule::Winding, Transform::identity(), None);
    Ok(pm)
}
