use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context as _, Result, anyhow};

use crate::coords::Color;
use crate::pixmap::Pixmap;

use super::Atlas;

const ATLAS_WIDTH: u32 = 512;
const ATLAS_HEIGHT: u32 = 256;

/// Cached placement and metrics for one rasterized character.
///
/// `x0..y1` is the bitmap box relative to the pen position and baseline
/// (+Y down, so `y0` is negative for glyphs rising above the baseline).
/// `u0..v1` is the glyph's normalized rect in the atlas; ink-less glyphs
/// carry a zero-area UV rect.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphMetrics {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    /// Horizontal advance in pixels.
    pub advance: i32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl GlyphMetrics {
    #[inline]
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// Memoizing glyph rasterizer over a shelf-packed coverage atlas.
///
/// Until a font is loaded every lookup returns `None`; callers treat a
/// missing glyph as skip-this-character, never as fatal. Entries are cached
/// for the life of the cache and never evicted.
pub struct GlyphCache {
    font: Option<fontdue::Font>,
    px_size: f32,
    ascent: i32,
    descent: i32,
    line_gap: i32,
    line_height: i32,
    atlas: Atlas,
    glyphs: HashMap<char, GlyphMetrics>,
}

impl GlyphCache {
    /// Creates an empty cache. Lookups miss until [`load`](Self::load)
    /// succeeds.
    pub fn new() -> Self {
        Self {
            font: None,
            px_size: 0.0,
            ascent: 0,
            descent: 0,
            line_gap: 0,
            line_height: 0,
            atlas: Atlas::new(ATLAS_WIDTH, ATLAS_HEIGHT),
            glyphs: HashMap::new(),
        }
    }

    /// Loads a font file and derives pixel metrics for `px_size`.
    ///
    /// On failure the cache stays empty and usable (all lookups miss).
    pub fn load(&mut self, path: impl AsRef<Path>, px_size: f32) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        self.load_bytes(&bytes, px_size)
    }

    /// Parses a TrueType/OpenType font from raw bytes.
    pub fn load_bytes(&mut self, bytes: &[u8], px_size: f32) -> Result<()> {
        let font = fontdue::Font::from_bytes(
            bytes,
            fontdue::FontSettings {
                scale: px_size,
                ..fontdue::FontSettings::default()
            },
        )
        .map_err(|e| anyhow!("failed to parse font: {e}"))?;

        // Fall back to em-box estimates when the font omits horizontal line
        // metrics.
        let (ascent, descent, line_gap) = match font.horizontal_line_metrics(px_size) {
            Some(m) => (m.ascent, m.descent, m.line_gap),
            None => (px_size * 0.8, px_size * -0.2, 0.0),
        };

        self.ascent = ascent.round() as i32;
        self.descent = descent.round() as i32; // negative below the baseline
        self.line_gap = line_gap.round() as i32;
        self.line_height = self.ascent - self.descent + self.line_gap;
        self.px_size = px_size;
        self.font = Some(font);
        self.atlas = Atlas::new(ATLAS_WIDTH, ATLAS_HEIGHT);
        self.glyphs.clear();
        Ok(())
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.font.is_some()
    }

    #[inline]
    pub fn ascent(&self) -> i32 {
        self.ascent
    }

    /// Negative: distance from baseline to the bottom of the line box.
    #[inline]
    pub fn descent(&self) -> i32 {
        self.descent
    }

    #[inline]
    pub fn line_gap(&self) -> i32 {
        self.line_gap
    }

    #[inline]
    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    #[inline]
    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    #[inline]
    pub fn atlas_dirty(&self) -> bool {
        self.atlas.dirty()
    }

    #[inline]
    pub fn mark_clean(&mut self) {
        self.atlas.mark_clean();
    }

    /// Returns cached metrics for `ch`, rasterizing into the atlas on the
    /// first request. `None` when no font is loaded or the glyph cannot be
    /// placed.
    pub fn glyph(&mut self, ch: char) -> Option<GlyphMetrics> {
        if let Some(m) = self.glyphs.get(&ch) {
            return Some(*m);
        }
        let m = self.rasterize(ch)?;
        self.glyphs.insert(ch, m);
        Some(m)
    }

    fn rasterize(&mut self, ch: char) -> Option<GlyphMetrics> {
        let (metrics, coverage) = {
            let font = self.font.as_ref()?;
            font.rasterize(ch, self.px_size)
        };

        let w = metrics.width as u32;
        let h = metrics.height as u32;

        // fontdue reports the bitmap box y-up from the baseline; flip into
        // the engine's y-down convention.
        let x0 = metrics.xmin;
        let x1 = metrics.xmin + metrics.width as i32;
        let y1 = -metrics.ymin;
        let y0 = y1 - metrics.height as i32;
        let advance = metrics.advance_width.round() as i32;

        if w == 0 || h == 0 {
            // Ink-less glyph (space and friends): metrics only, zero-area UVs.
            return Some(GlyphMetrics {
                x0,
                y0,
                x1,
                y1,
                advance,
                ..GlyphMetrics::default()
            });
        }

        let slot = self.atlas.place(w, h)?;
        if slot.doublings > 0 {
            self.rescale_issued_v(slot.doublings);
        }
        self.atlas.copy_bitmap(slot.x, slot.y, w, h, &coverage);

        let aw = self.atlas.width() as f32;
        let ah = self.atlas.height() as f32;
        Some(GlyphMetrics {
            x0,
            y0,
            x1,
            y1,
            advance,
            u0: slot.x as f32 / aw,
            v0: slot.y as f32 / ah,
            u1: (slot.x + w) as f32 / aw,
            v1: (slot.y + h) as f32 / ah,
        })
    }

    /// Atlas height doubled: every issued `v` shrinks by half per doubling.
    /// `u` and the pixel-space metrics are unaffected.
    fn rescale_issued_v(&mut self, doublings: u32) {
        let factor = 0.5f32.powi(doublings as i32);
        for m in self.glyphs.values_mut() {
            m.v0 *= factor;
            m.v1 *= factor;
        }
    }

    /// Sum of advances for `text`, rasterizing missing glyphs on the way.
    pub fn measure_text(&mut self, text: &str) -> i32 {
        text.chars().filter_map(|ch| self.glyph(ch)).map(|g| g.advance).sum()
    }

    /// Software text path: composites glyph coverage into `pixmap` with
    /// source-over blending, coverage acting as alpha. `(x, y)` is the
    /// top-left of the line box; the baseline sits `ascent` below it.
    pub fn draw_text(&mut self, pixmap: &mut Pixmap, x: i32, y: i32, text: &str, color: Color) {
        if !pixmap.valid() {
            return;
        }

        let baseline = y + self.ascent;
        let mut pen = x;

        for ch in text.chars() {
            let Some(g) = self.glyph(ch) else { continue };
            if g.width() > 0 && g.height() > 0 {
                self.blit_glyph(pixmap, pen + g.x0, baseline + g.y0, g, color);
            }
            pen += g.advance;
        }
    }

    fn blit_glyph(&self, pixmap: &mut Pixmap, dst_x: i32, dst_y: i32, g: GlyphMetrics, color: Color) {
        // Resolve the glyph's atlas region back to pixel coordinates.
        let src_x = (g.u0 * self.atlas.width() as f32) as u32;
        let src_y = (g.v0 * self.atlas.height() as f32) as u32;
        let format = pixmap.format();

        for row in 0..g.height() {
            let py = dst_y + row;
            if py < 0 || py >= pixmap.height() {
                continue;
            }
            for col in 0..g.width() {
                let px = dst_x + col;
                if px < 0 || px >= pixmap.width() {
                    continue;
                }

                let a = self.atlas.coverage_at(src_x + col as u32, src_y + row as u32) as u32;
                if a == 0 {
                    continue;
                }

                let dst = format.unpack(pixmap.get(px, py));
                let blended = Color::new(
                    ((color.r as u32 * a + dst.r as u32 * (255 - a)) / 255) as u8,
                    ((color.g as u32 * a + dst.g as u32 * (255 - a)) / 255) as u8,
                    ((color.b as u32 * a + dst.b as u32 * (255 - a)) / 255) as u8,
                    255,
                );
                pixmap.put(px, py, format.pack(blended));
            }
        }
    }
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new()
    }
}
