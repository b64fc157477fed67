//! The public drawing surface.

use crate::coords::{Color, Point, Rect};
use crate::device::Device;

/// Drawing API handed out by [`Surface::canvas`](crate::surface::Surface::canvas).
///
/// Borrows its device for the duration of a paint pass and must not outlive
/// it. Maintains the clip stack; devices only ever see the resolved clip
/// rect.
pub struct Canvas<'a> {
    device: &'a mut dyn Device,
    stack: Vec<ClipState>,
    state: ClipState,
}

#[derive(Debug, Copy, Clone, Default)]
struct ClipState {
    clip: Option<Rect>,
}

impl<'a> Canvas<'a> {
    pub fn new(device: &'a mut dyn Device) -> Self {
        Self {
            device,
            stack: Vec::new(),
            state: ClipState::default(),
        }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.device.fill_rect(rect, color);
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.device.stroke_rect(rect, color, width);
    }

    pub fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.device.draw_line(from, to, color, width);
    }

    pub fn draw_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        self.device.draw_polyline(points, color, width);
    }

    pub fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        self.device.draw_text(origin, text, color);
    }

    // ── clipping ──────────────────────────────────────────────────────────

    /// Pushes the current clip state. Must be balanced with [`restore`].
    ///
    /// [`restore`]: Canvas::restore
    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pops the most recent [`save`](Canvas::save) and reapplies its clip to
    /// the device. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        let Some(state) = self.stack.pop() else { return };
        self.state = state;
        self.apply_clip();
    }

    /// Intersects `rect` with the current clip and applies the result.
    ///
    /// An empty intersection yields a valid zero-area clip that suppresses
    /// subsequent drawing; it is not an error.
    pub fn clip_rect(&mut self, rect: Rect) {
        self.state.clip = Some(match self.state.clip {
            Some(current) => current.intersect(rect).unwrap_or(Rect::zero()),
            None => rect,
        });
        self.apply_clip();
    }

    fn apply_clip(&mut self) {
        match self.state.clip {
            Some(rect) => self.device.set_clip(rect),
            None => self.device.clear_clip(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Device stub recording the clip calls it receives.
    #[derive(Default)]
    struct ProbeDevice {
        clips: Vec<Option<Rect>>,
        draws: usize,
    }

    impl Device for ProbeDevice {
        fn resize(&mut self, _: i32, _: i32) {}
        fn begin_frame(&mut self) {}
        fn end_frame(&mut self) {}
        fn fill_rect(&mut self, _: Rect, _: Color) {
            self.draws += 1;
        }
        fn stroke_rect(&mut self, _: Rect, _: Color, _: f32) {
            self.draws += 1;
        }
        fn draw_line(&mut self, _: Point, _: Point, _: Color, _: f32) {
            self.draws += 1;
        }
        fn draw_polyline(&mut self, _: &[Point], _: Color, _: f32) {
            self.draws += 1;
        }
        fn draw_text(&mut self, _: Point, _: &str, _: Color) {
            self.draws += 1;
        }
        fn set_clip(&mut self, rect: Rect) {
            self.clips.push(Some(rect));
        }
        fn clear_clip(&mut self) {
            self.clips.push(None);
        }
    }

    #[test]
    fn forwards_draw_calls() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        canvas.draw_line(Point::zero(), Point::new(1.0, 1.0), Color::white(), 1.0);
        drop(canvas);
        assert_eq!(dev.draws, 2);
    }

    #[test]
    fn clip_rect_pushes_to_device_immediately() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.clip_rect(Rect::new(1.0, 2.0, 3.0, 4.0));
        drop(canvas);
        assert_eq!(dev.clips, vec![Some(Rect::new(1.0, 2.0, 3.0, 4.0))]);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        canvas.clip_rect(Rect::new(5.0, 5.0, 10.0, 10.0));
        drop(canvas);
        assert_eq!(dev.clips[1], Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn disjoint_clips_yield_zero_area_not_error() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.clip_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
        canvas.clip_rect(Rect::new(10.0, 10.0, 4.0, 4.0));
        drop(canvas);
        assert_eq!(dev.clips[1], Some(Rect::zero()));
    }

    #[test]
    fn restore_reapplies_saved_clip() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        canvas.save();
        canvas.clip_rect(Rect::new(2.0, 2.0, 2.0, 2.0));
        canvas.restore();
        drop(canvas);
        assert_eq!(
            dev.clips,
            vec![
                Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
                Some(Rect::new(2.0, 2.0, 2.0, 2.0)),
                Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            ]
        );
    }

    #[test]
    fn restore_to_unclipped_state_clears_device_clip() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.save();
        canvas.clip_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
        canvas.restore();
        drop(canvas);
        assert_eq!(dev.clips, vec![Some(Rect::new(0.0, 0.0, 4.0, 4.0)), None]);
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut dev = ProbeDevice::default();
        let mut canvas = Canvas::new(&mut dev);
        canvas.restore();
        drop(canvas);
        assert!(dev.clips.is_empty());
    }
}
