pub mod render;
pub mod shapes;
pub mod text;

pub use render::{Palette, SkiaRenderer};
pub use text::{TextCache, render_text_pixmap};

pub use ab_glyph::FontArc;
