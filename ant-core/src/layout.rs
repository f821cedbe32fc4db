use crate::condition::Location;
use crate::stimulus::Point;
use serde::{Deserialize, Serialize};

/// Converts visual degrees to whole pixels, never less than one.
///
/// With `even` the result is bumped to the next even number so the shape
/// has an exact centre row.
pub fn deg_to_px(degrees: f32, px_per_degree: f32, even: bool) -> u32 {
    let px = (degrees * px_per_degree).round().max(1.0) as u32;
    if even && px % 2 == 1 { px + 1 } else { px }
}

/// Pixel sizes of every shape, derived from their size in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub fixation_size: u32,
    pub fixation_thickness: u32,
    pub cue_size: u32,
    pub cue_thickness: u32,
    pub arrow_tail_len: u32,
    pub arrow_tail_width: u32,
    pub arrow_head_len: u32,
    pub arrow_head_width: u32,
}

impl Geometry {
    pub fn from_px_per_degree(ppd: f32) -> Self {
        Self {
            fixation_size: deg_to_px(0.5, ppd, false),
            fixation_thickness: deg_to_px(0.05, ppd, false),
            cue_size: deg_to_px(0.5, ppd, false),
            cue_thickness: deg_to_px(0.05, ppd, false),
            arrow_tail_len: deg_to_px(0.35, ppd, false),
            arrow_tail_width: deg_to_px(0.1, ppd, false),
            arrow_head_len: deg_to_px(0.2, ppd, false),
            arrow_head_width: deg_to_px(0.3, ppd, true),
        }
    }

    /// Full length of an arrow, and of the neutral line.
    pub fn arrow_len(&self) -> u32 {
        self.arrow_tail_len + self.arrow_head_len
    }
}

/// Where things go on a screen of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub screen: (u32, u32),
    pub px_per_degree: f32,
    pub geometry: Geometry,
    pub center: Point,
    pub above: Point,
    pub below: Point,
    pub flanker_spacing: f32,
}

impl Layout {
    pub fn new(screen: (u32, u32), px_per_degree: f32) -> Self {
        let geometry = Geometry::from_px_per_degree(px_per_degree);
        let center = (screen.0 as f32 / 2.0, screen.1 as f32 / 2.0);
        let height_offset = deg_to_px(1.06, px_per_degree, false) as f32;
        let flanker_spacing =
            (geometry.arrow_len() + deg_to_px(0.06, px_per_degree, false)) as f32;

        Self {
            screen,
            px_per_degree,
            geometry,
            center,
            above: (center.0, center.1 - height_offset),
            below: (center.0, center.1 + height_offset),
            flanker_spacing,
        }
    }

    pub fn row(&self, location: Location) -> Point {
        match location {
            Location::Above => self.above,
            Location::Below => self.below,
        }
    }

    /// Flanker slots either side of the target, left to right.
    pub fn flanker_positions(&self, location: Location) -> [Point; 4] {
        let (x, y) = self.row(location);
        [-2.0f32, -1.0, 1.0, 2.0].map(|offset| (x + offset * self.flanker_spacing, y))
    }
}
