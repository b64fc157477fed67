use crate::coords::{Color, Point, Rect};

use super::{Arena, DrawCmd, DrawOp};

/// Captures draw calls into a command stream plus payload arena.
///
/// The imperative surface mirrors [`Canvas`](crate::canvas::Canvas); deferred
/// devices forward every canvas call here. [`finish`](Recorder::finish)
/// freezes the captured frame into a [`Recording`] and leaves the recorder
/// empty and reusable. Each recording is backed by its own arena; arenas are
/// never shared or recycled across recordings.
#[derive(Debug, Default)]
pub struct Recorder {
    cmds: Vec<DrawCmd>,
    arena: Arena,
}

impl Recorder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards captured state without producing a recording.
    pub fn reset(&mut self) {
        self.cmds.clear();
        self.arena.reset();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawOp::FillRect { rect }, color, 1.0);
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.push(DrawOp::StrokeRect { rect }, color, width);
    }

    pub fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.push(DrawOp::Line { from, to }, color, width);
    }

    /// Records a connected line strip. Fewer than two points is a no-op.
    pub fn draw_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        if points.len() < 2 {
            return;
        }
        let offset = self.arena.store_points(points);
        self.push(
            DrawOp::Polyline {
                offset,
                count: points.len() as u32,
            },
            color,
            width,
        );
    }

    pub fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        let offset = self.arena.store_str(text);
        self.push(
            DrawOp::Text {
                origin,
                offset,
                len: text.len() as u32,
            },
            color,
            1.0,
        );
    }

    pub fn set_clip(&mut self, rect: Rect) {
        self.push(DrawOp::SetClip { rect }, Color::transparent(), 1.0);
    }

    pub fn clear_clip(&mut self) {
        self.push(DrawOp::ClearClip, Color::transparent(), 1.0);
    }

    /// Freezes the captured commands and arena into an immutable recording.
    ///
    /// The recorder is left empty with a fresh arena, ready for the next
    /// frame.
    pub fn finish(&mut self) -> Recording {
        Recording {
            cmds: std::mem::take(&mut self.cmds),
            arena: std::mem::take(&mut self.arena),
        }
    }

    #[inline]
    fn push(&mut self, op: DrawOp, color: Color, width: f32) {
        self.cmds.push(DrawCmd { op, color, width });
    }
}

/// An immutable captured frame: command stream plus its payload arena.
///
/// Replayable any number of times against any backend until dropped. Plain
/// owned data, so a recording may be handed to a consumer on another thread;
/// the arena is never mutated after [`Recorder::finish`].
#[derive(Debug, Default)]
pub struct Recording {
    cmds: Vec<DrawCmd>,
    arena: Arena,
}

impl Recording {
    #[inline]
    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::rgb(255, 0, 0)
    }

    // ── command capture ───────────────────────────────────────────────────

    #[test]
    fn records_one_command_per_call() {
        let mut rec = Recorder::new();
        rec.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), red());
        rec.stroke_rect(Rect::new(1.0, 1.0, 8.0, 8.0), red(), 2.0);
        rec.draw_line(Point::zero(), Point::new(5.0, 5.0), red(), 1.0);
        rec.draw_text(Point::zero(), "hi", red());
        rec.set_clip(Rect::new(0.0, 0.0, 4.0, 4.0));
        rec.clear_clip();

        let recording = rec.finish();
        assert_eq!(recording.commands().len(), 6);
    }

    #[test]
    fn degenerate_polylines_record_nothing() {
        let mut rec = Recorder::new();
        rec.draw_polyline(&[], red(), 1.0);
        rec.draw_polyline(&[Point::zero()], red(), 1.0);
        let recording = rec.finish();
        assert!(recording.is_empty());
    }

    #[test]
    fn polyline_payload_round_trips() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(6.0, 2.0)];
        let mut rec = Recorder::new();
        rec.draw_polyline(&pts, red(), 1.5);

        let recording = rec.finish();
        let [cmd] = recording.commands() else {
            panic!("expected exactly one command");
        };
        let DrawOp::Polyline { offset, count } = cmd.op else {
            panic!("expected a polyline command");
        };
        assert_eq!(count, 3);
        assert_eq!(recording.arena().get_points(offset, count), &pts);
        assert_eq!(cmd.width, 1.5);
    }

    #[test]
    fn text_payload_round_trips() {
        let mut rec = Recorder::new();
        rec.draw_text(Point::new(12.0, 7.0), "clk_en", Color::white());

        let recording = rec.finish();
        let [cmd] = recording.commands() else {
            panic!("expected exactly one command");
        };
        let DrawOp::Text { origin, offset, len } = cmd.op else {
            panic!("expected a text command");
        };
        assert_eq!(origin, Point::new(12.0, 7.0));
        assert_eq!(recording.arena().get_str(offset, len), "clk_en");
    }

    // ── finish / reset ────────────────────────────────────────────────────

    #[test]
    fn finish_leaves_recorder_reusable() {
        let mut rec = Recorder::new();
        rec.draw_text(Point::zero(), "first", red());
        let first = rec.finish();

        assert!(rec.is_empty());
        rec.draw_text(Point::zero(), "second", red());
        let second = rec.finish();

        // Each recording owns its own arena: offsets restart from zero and
        // the first recording's payloads are untouched.
        let DrawOp::Text { offset, len, .. } = second.commands()[0].op else {
            panic!("expected a text command");
        };
        assert_eq!(offset, 0);
        assert_eq!(second.arena().get_str(offset, len), "second");

        let DrawOp::Text { offset, len, .. } = first.commands()[0].op else {
            panic!("expected a text command");
        };
        assert_eq!(first.arena().get_str(offset, len), "first");
    }

    #[test]
    fn reset_discards_capture() {
        let mut rec = Recorder::new();
        rec.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), red());
        rec.reset();
        assert!(rec.finish().is_empty());
    }
}
