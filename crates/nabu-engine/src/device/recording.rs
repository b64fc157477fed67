use crate::coords::{Color, Point, Rect};
use crate::record::{Recorder, Recording};

use super::Device;

/// Deferred device: captures every draw call into a recorder.
///
/// `end_frame` freezes the captured frame; the surface drains it via
/// [`finish_recording`](Device::finish_recording) and hands it to a GPU
/// context (or to the caller, for recording-only surfaces).
#[derive(Debug, Default)]
pub struct RecordingDevice {
    recorder: Recorder,
    finished: Option<Recording>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for RecordingDevice {
    fn resize(&mut self, _width: i32, _height: i32) {}

    fn begin_frame(&mut self) {
        self.recorder.reset();
        self.finished = None;
    }

    fn end_frame(&mut self) {
        self.finished = Some(self.recorder.finish());
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.recorder.fill_rect(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.recorder.stroke_rect(rect, color, width);
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.recorder.draw_line(from, to, color, width);
    }

    fn draw_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        self.recorder.draw_polyline(points, color, width);
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        self.recorder.draw_text(origin, text, color);
    }

    fn set_clip(&mut self, rect: Rect) {
        self.recorder.set_clip(rect);
    }

    fn clear_clip(&mut self) {
        self.recorder.clear_clip();
    }

    fn finish_recording(&mut self) -> Option<Recording> {
        self.finished.take()
    }
}
