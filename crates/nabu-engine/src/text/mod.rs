//! Text rasterization: shelf-packed coverage atlas plus a memoizing glyph
//! cache backed by `fontdue`.
//!
//! The atlas is a single-channel bitmap a GPU backend can upload as an
//! `R8`-style texture; the software path composites coverage directly into a
//! pixmap. Glyphs are rasterized on first use and never evicted (bounded
//! alphabet assumption).

mod atlas;
mod glyph_cache;

pub use atlas::{Atlas, AtlasSlot};
pub use glyph_cache::{GlyphCache, GlyphMetrics};
