use crate::condition::ArrowDirection;
use serde::{Deserialize, Serialize};

/// Screen coordinates in pixels, origin top-left.
pub type Point = (f32, f32);

/// Everything the task ever draws, besides text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Fixation,
    Cue,
    LeftArrow,
    RightArrow,
    NeutralLine,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Fixation,
        Shape::Cue,
        Shape::LeftArrow,
        Shape::RightArrow,
        Shape::NeutralLine,
    ];

    /// Stable slot for renderers that pre-render every shape.
    pub fn cache_index(&self) -> usize {
        match self {
            Shape::Fixation => 0,
            Shape::Cue => 1,
            Shape::LeftArrow => 2,
            Shape::RightArrow => 3,
            Shape::NeutralLine => 4,
        }
    }

    pub fn arrow(direction: ArrowDirection) -> Self {
        match direction {
            ArrowDirection::Left => Shape::LeftArrow,
            ArrowDirection::Right => Shape::RightArrow,
        }
    }

    /// Shapes that may appear in the target row.
    pub fn is_flanker_shape(&self) -> bool {
        matches!(
            self,
            Shape::LeftArrow | Shape::RightArrow | Shape::NeutralLine
        )
    }
}

/// Anchor point of a drawn item, laid out like a numeric keypad.
///
/// `7 8 9` is the top edge, `5` the centre, `1 2 3` the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Registration {
    BottomLeft = 1,
    Bottom = 2,
    BottomRight = 3,
    Left = 4,
    #[default]
    Center = 5,
    Right = 6,
    TopLeft = 7,
    Top = 8,
    TopRight = 9,
}

impl Registration {
    /// Top-left corner for an item of `size` anchored at `position`.
    pub fn origin(&self, position: Point, size: (f32, f32)) -> Point {
        let (w, h) = size;
        let fx = match self {
            Registration::BottomLeft | Registration::Left | Registration::TopLeft => 0.0,
            Registration::Bottom | Registration::Center | Registration::Top => 0.5,
            Registration::BottomRight | Registration::Right | Registration::TopRight => 1.0,
        };
        let fy = match self {
            Registration::TopLeft | Registration::Top | Registration::TopRight => 0.0,
            Registration::Left | Registration::Center | Registration::Right => 0.5,
            Registration::BottomLeft | Registration::Bottom | Registration::BottomRight => 1.0,
        };
        (position.0 - w * fx, position.1 - h * fy)
    }
}
