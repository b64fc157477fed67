use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::{Color, Point, Rect};
use crate::pixmap::Pixmap;
use crate::text::GlyphCache;

use super::Device;

/// Immediate software rasterizer drawing straight into a shared pixmap.
///
/// Geometry is snapped to integer pixels; strokes and lines are 1px
/// hairlines regardless of the requested width. Blending is integer
/// source-over with an opaque fast path.
pub struct RasterDevice {
    target: Rc<RefCell<Pixmap>>,
    glyph_cache: Option<Rc<RefCell<GlyphCache>>>,
    clip: Option<Rect>,
}

impl RasterDevice {
    pub fn new(target: Rc<RefCell<Pixmap>>) -> Self {
        Self {
            target,
            glyph_cache: None,
            clip: None,
        }
    }

    /// Active clip in device space: the explicit clip rect or the whole
    /// buffer.
    fn device_clip(&self, pm: &Pixmap) -> Rect {
        self.clip
            .unwrap_or_else(|| Rect::new(0.0, 0.0, pm.width() as f32, pm.height() as f32))
    }

    /// Writes one pixel with source-over blending, honoring clip and bounds.
    fn blend_pixel(pm: &mut Pixmap, clip: Rect, x: i32, y: i32, c: Color) {
        if !pm.contains(x, y) {
            return;
        }
        if (x as f32) < clip.x
            || (x as f32) >= clip.right()
            || (y as f32) < clip.y
            || (y as f32) >= clip.bottom()
        {
            return;
        }

        let format = pm.format();
        if c.a == 255 {
            pm.put(x, y, format.pack(c));
            return;
        }
        if c.a == 0 {
            return;
        }

        let dst = format.unpack(pm.get(x, y));
        let a = c.a as u32;
        let blended = Color::new(
            ((c.r as u32 * a + dst.r as u32 * (255 - a)) / 255) as u8,
            ((c.g as u32 * a + dst.g as u32 * (255 - a)) / 255) as u8,
            ((c.b as u32 * a + dst.b as u32 * (255 - a)) / 255) as u8,
            255,
        );
        pm.put(x, y, format.pack(blended));
    }

    /// Horizontal span `[x1, x2]` at `y`, clipped.
    fn hline(pm: &mut Pixmap, clip: Rect, x1: i32, x2: i32, y: i32, c: Color) {
        if y < 0 || y >= pm.height() {
            return;
        }
        if (y as f32) < clip.y || (y as f32) >= clip.bottom() {
            return;
        }

        let mut x1 = x1.max(clip.x as i32).max(0);
        let x2 = x2.min(clip.right() as i32 - 1).min(pm.width() - 1);
        if x1 > x2 {
            return;
        }

        if c.a == 255 {
            let px = pm.format().pack(c);
            let row = pm.row_mut(y);
            row[x1 as usize..=x2 as usize].fill(px);
        } else {
            while x1 <= x2 {
                Self::blend_pixel(pm, clip, x1, y, c);
                x1 += 1;
            }
        }
    }

    /// Bresenham line between integer endpoints.
    fn line(pm: &mut Pixmap, clip: Rect, mut x1: i32, mut y1: i32, x2: i32, y2: i32, c: Color) {
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            Self::blend_pixel(pm, clip, x1, y1, c);
            if x1 == x2 && y1 == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x1 += sx;
            }
            if e2 < dx {
                err += dx;
                y1 += sy;
            }
        }
    }
}

impl Device for RasterDevice {
    fn resize(&mut self, width: i32, height: i32) {
        self.target.borrow_mut().reallocate(width, height);
    }

    fn begin_frame(&mut self) {
        let mut pm = self.target.borrow_mut();
        if pm.valid() {
            pm.clear(Color::black());
        }
    }

    fn end_frame(&mut self) {}

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut pm = self.target.borrow_mut();
        if !pm.valid() {
            return;
        }
        let clip = self.device_clip(&pm);

        let x1 = (rect.x.max(clip.x) as i32).max(0);
        let y1 = (rect.y.max(clip.y) as i32).max(0);
        let x2 = (rect.right().min(clip.right()) as i32).min(pm.width());
        let y2 = (rect.bottom().min(clip.bottom()) as i32).min(pm.height());
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        for y in y1..y2 {
            Self::hline(&mut pm, clip, x1, x2 - 1, y, color);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, _width: f32) {
        let mut pm = self.target.borrow_mut();
        if !pm.valid() {
            return;
        }
        let clip = self.device_clip(&pm);

        let x1 = rect.x as i32;
        let y1 = rect.y as i32;
        let x2 = rect.right() as i32;
        let y2 = rect.bottom() as i32;

        Self::hline(&mut pm, clip, x1, x2, y1, color);
        Self::hline(&mut pm, clip, x1, x2, y2, color);
        for y in y1..=y2 {
            Self::blend_pixel(&mut pm, clip, x1, y, color);
            Self::blend_pixel(&mut pm, clip, x2, y, color);
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, _width: f32) {
        let mut pm = self.target.borrow_mut();
        if !pm.valid() {
            return;
        }
        let clip = self.device_clip(&pm);
        Self::line(
            &mut pm,
            clip,
            from.x as i32,
            from.y as i32,
            to.x as i32,
            to.y as i32,
            color,
        );
    }

    fn draw_polyline(&mut self, points: &[Point], color: Color, _width: f32) {
        let mut pm = self.target.borrow_mut();
        if !pm.valid() {
            return;
        }
        let clip = self.device_clip(&pm);
        for pair in points.windows(2) {
            Self::line(
                &mut pm,
                clip,
                pair[0].x as i32,
                pair[0].y as i32,
                pair[1].x as i32,
                pair[1].y as i32,
                color,
            );
        }
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        // Text bypasses the device clip; callers clip at the canvas level.
        let Some(cache) = &self.glyph_cache else { return };
        let mut pm = self.target.borrow_mut();
        if !pm.valid() {
            return;
        }
        cache
            .borrow_mut()
            .draw_text(&mut pm, origin.x as i32, origin.y as i32, text, color);
    }

    fn set_clip(&mut self, rect: Rect) {
        self.clip = Some(rect);
    }

    fn clear_clip(&mut self) {
        self.clip = None;
    }

    fn set_glyph_cache(&mut self, cache: Rc<RefCell<GlyphCache>>) {
        self.glyph_cache = Some(cache);
    }
}
