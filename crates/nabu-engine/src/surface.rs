//! Composition root gluing device, canvas, optional context and pixels.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, ensure};

use crate::canvas::Canvas;
use crate::context::Context;
use crate::device::{Device, RasterDevice, RecordingDevice};
use crate::pixmap::{PixelFormat, Pixmap};
use crate::record::{DrawOp, Recording};
use crate::text::GlyphCache;

/// A drawable target: one device, optionally a GPU context and/or a pixel
/// buffer.
///
/// The constructor picks the concrete device; nothing else switches on the
/// variant. Drawing happens through [`canvas`](Surface::canvas) between
/// [`begin_frame`](Surface::begin_frame) and [`end_frame`](Surface::end_frame).
pub struct Surface {
    device: Box<dyn Device>,
    context: Option<Box<dyn Context>>,
    pixmap: Option<Rc<RefCell<Pixmap>>>,
}

impl Surface {
    /// Software surface owning its pixel buffer.
    pub fn new_raster(width: i32, height: i32, format: PixelFormat) -> Result<Self> {
        ensure!(width > 0 && height > 0, "raster surface needs a positive size");
        let pixmap = Rc::new(RefCell::new(Pixmap::new(width, height, format)));
        Ok(Self {
            device: Box::new(RasterDevice::new(Rc::clone(&pixmap))),
            context: None,
            pixmap: Some(pixmap),
        })
    }

    /// Software surface over a host-provided pixel buffer (zero-copy: the
    /// host keeps its handle and reads pixels after [`flush`](Surface::flush)).
    pub fn new_raster_direct(pixmap: Rc<RefCell<Pixmap>>) -> Result<Self> {
        ensure!(pixmap.borrow().valid(), "host pixmap is empty");
        Ok(Self {
            device: Box::new(RasterDevice::new(Rc::clone(&pixmap))),
            context: None,
            pixmap: Some(pixmap),
        })
    }

    /// GPU surface over an already-initialized backend context.
    ///
    /// Fails when the context cannot finish its one-time setup; the caller
    /// aborts surface creation, there is no retry.
    pub fn new_gpu(mut context: Box<dyn Context>, width: i32, height: i32) -> Result<Self> {
        context.init(width, height)?;
        Ok(Self {
            device: Box::new(RecordingDevice::new()),
            context: Some(context),
            pixmap: None,
        })
    }

    /// Recording-only surface: no backing store, used to capture reusable
    /// command batches (cached intermediate layers).
    pub fn new_recording() -> Self {
        Self {
            device: Box::new(RecordingDevice::new()),
            context: None,
            pixmap: None,
        }
    }

    /// Hands out the drawing API for the current frame.
    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(self.device.as_mut())
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.device.resize(width, height);
        if let Some(context) = &mut self.context {
            context.resize(width, height);
        }
    }

    pub fn begin_frame(&mut self) {
        self.device.begin_frame();
        if let Some(context) = &mut self.context {
            context.begin_frame();
        }
    }

    pub fn end_frame(&mut self) {
        self.device.end_frame();
    }

    /// Replays a previously captured recording.
    ///
    /// With a context attached the recording goes there (batched on the way
    /// to the GPU); otherwise it is replayed command-by-command against the
    /// device in recorded order.
    pub fn submit(&mut self, recording: &Recording) {
        if let Some(context) = &mut self.context {
            context.submit(recording);
            return;
        }

        let arena = recording.arena();
        for cmd in recording.commands() {
            match cmd.op {
                DrawOp::FillRect { rect } => self.device.fill_rect(rect, cmd.color),
                DrawOp::StrokeRect { rect } => self.device.stroke_rect(rect, cmd.color, cmd.width),
                DrawOp::Line { from, to } => self.device.draw_line(from, to, cmd.color, cmd.width),
                DrawOp::Polyline { offset, count } => {
                    self.device
                        .draw_polyline(arena.get_points(offset, count), cmd.color, cmd.width);
                }
                DrawOp::Text { origin, offset, len } => {
                    self.device.draw_text(origin, arena.get_str(offset, len), cmd.color);
                }
                DrawOp::SetClip { rect } => self.device.set_clip(rect),
                DrawOp::ClearClip => self.device.clear_clip(),
            }
        }
    }

    /// Finalizes the frame: drains any device-captured recording into the
    /// context and flushes it. Raster surfaces have nothing to do; their
    /// pixels are already resident.
    pub fn flush(&mut self) {
        let Some(context) = &mut self.context else { return };
        if let Some(recording) = self.device.finish_recording() {
            context.submit(&recording);
        }
        context.flush();
    }

    /// Presents the finished frame (GPU surfaces only).
    pub fn present(&mut self) {
        if let Some(context) = &mut self.context {
            context.present();
        }
    }

    /// Takes the frame captured by a recording device, if any.
    pub fn take_recording(&mut self) -> Option<Recording> {
        self.device.finish_recording()
    }

    /// The surface's pixel buffer, when it has one.
    pub fn pixels(&self) -> Option<Rc<RefCell<Pixmap>>> {
        self.pixmap.as_ref().map(Rc::clone)
    }

    pub fn set_glyph_cache(&mut self, cache: Rc<RefCell<GlyphCache>>) {
        if let Some(context) = &mut self.context {
            context.set_glyph_cache(Rc::clone(&cache));
        }
        self.device.set_glyph_cache(cache);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Color, Point, Rect};

    // ── recording surfaces ────────────────────────────────────────────────

    #[test]
    fn recording_surface_captures_a_frame() {
        let mut surface = Surface::new_recording();
        surface.begin_frame();
        let mut canvas = surface.canvas();
        canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::rgb(255, 0, 0));
        canvas.draw_text(Point::zero(), "Hi", Color::white());
        surface.end_frame();

        let recording = surface.take_recording().unwrap();
        assert_eq!(recording.commands().len(), 2);
    }

    #[test]
    fn canvas_clips_reach_the_recording() {
        let mut surface = Surface::new_recording();
        surface.begin_frame();
        let mut canvas = surface.canvas();
        canvas.save();
        canvas.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::white());
        canvas.restore();
        surface.end_frame();

        let recording = surface.take_recording().unwrap();
        let ops: Vec<u8> = recording.commands().iter().map(|c| c.op.tag()).collect();
        // set-clip, fill, clear-clip (restore back to unclipped).
        assert_eq!(ops, vec![5, 0, 6]);
    }

    // ── raster replay ─────────────────────────────────────────────────────

    #[test]
    fn submit_replays_a_recording_onto_pixels() {
        // Capture on a recording surface...
        let mut rec_surface = Surface::new_recording();
        rec_surface.begin_frame();
        rec_surface
            .canvas()
            .fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::rgb(0, 255, 0));
        rec_surface.end_frame();
        let recording = rec_surface.take_recording().unwrap();

        // ...and replay it onto a raster surface.
        let mut raster = Surface::new_raster(4, 4, PixelFormat::Rgba8888).unwrap();
        raster.begin_frame();
        raster.submit(&recording);
        raster.end_frame();
        raster.flush();

        let pixmap = raster.pixels().unwrap();
        let pixmap = pixmap.borrow();
        let format = pixmap.format();
        assert_eq!(format.unpack(pixmap.get(1, 1)), Color::rgb(0, 255, 0));
        assert_eq!(format.unpack(pixmap.get(3, 3)), Color::black());
    }

    #[test]
    fn replay_honors_recorded_clips() {
        let mut rec_surface = Surface::new_recording();
        rec_surface.begin_frame();
        let mut canvas = rec_surface.canvas();
        canvas.clip_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::white());
        rec_surface.end_frame();
        let recording = rec_surface.take_recording().unwrap();

        let mut raster = Surface::new_raster(4, 4, PixelFormat::Bgra8888).unwrap();
        raster.begin_frame();
        raster.submit(&recording);

        let pixmap = raster.pixels().unwrap();
        let pixmap = pixmap.borrow();
        let format = pixmap.format();
        assert_eq!(format.unpack(pixmap.get(1, 1)), Color::white());
        assert_eq!(format.unpack(pixmap.get(2, 2)), Color::black());
    }

    #[test]
    fn raster_surface_rejects_empty_size() {
        assert!(Surface::new_raster(0, 4, PixelFormat::Rgba8888).is_err());
    }

    #[test]
    fn raster_direct_shares_the_host_buffer() {
        let host = Rc::new(RefCell::new(Pixmap::new(2, 2, PixelFormat::Rgba8888)));
        let mut surface = Surface::new_raster_direct(Rc::clone(&host)).unwrap();
        surface.begin_frame();
        surface
            .canvas()
            .fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::white());
        surface.end_frame();

        // The host's own handle sees the drawing without any copy.
        let pm = host.borrow();
        assert_eq!(pm.format().unpack(pm.get(0, 0)), Color::white());
    }

    #[test]
    fn resize_reallocates_raster_pixels() {
        let mut surface = Surface::new_raster(2, 2, PixelFormat::Rgba8888).unwrap();
        surface.resize(5, 6);
        let pixmap = surface.pixels().unwrap();
        assert_eq!(pixmap.borrow().width(), 5);
        assert_eq!(pixmap.borrow().height(), 6);
    }

    // ── gpu surfaces (stub context) ───────────────────────────────────────

    /// Context stub counting lifecycle calls.
    #[derive(Default)]
    struct StubContext {
        fail_init: bool,
        inits: Rc<RefCell<Vec<(i32, i32)>>>,
        submitted: Rc<RefCell<Vec<usize>>>,
        flushes: Rc<RefCell<usize>>,
        presents: Rc<RefCell<usize>>,
    }

    impl Context for StubContext {
        fn init(&mut self, width: i32, height: i32) -> Result<()> {
            ensure!(!self.fail_init, "stub context init failure");
            self.inits.borrow_mut().push((width, height));
            Ok(())
        }
        fn begin_frame(&mut self) {}
        fn resize(&mut self, _: i32, _: i32) {}
        fn submit(&mut self, recording: &Recording) {
            self.submitted.borrow_mut().push(recording.commands().len());
        }
        fn flush(&mut self) {
            *self.flushes.borrow_mut() += 1;
        }
        fn present(&mut self) {
            *self.presents.borrow_mut() += 1;
        }
        fn set_glyph_cache(&mut self, _: Rc<RefCell<GlyphCache>>) {}
    }

    #[test]
    fn gpu_surface_initializes_its_context() {
        let stub = StubContext::default();
        let inits = Rc::clone(&stub.inits);
        let _surface = Surface::new_gpu(Box::new(stub), 640, 480).unwrap();
        assert_eq!(&*inits.borrow(), &[(640, 480)]);
    }

    #[test]
    fn failed_context_init_aborts_surface_creation() {
        let stub = StubContext {
            fail_init: true,
            ..StubContext::default()
        };
        assert!(Surface::new_gpu(Box::new(stub), 640, 480).is_err());
    }

    #[test]
    fn flush_drains_the_captured_frame_into_the_context() {
        let stub = StubContext::default();
        let submitted = Rc::clone(&stub.submitted);
        let flushes = Rc::clone(&stub.flushes);

        let mut surface = Surface::new_gpu(Box::new(stub), 100, 100).unwrap();
        surface.begin_frame();
        let mut canvas = surface.canvas();
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        canvas.draw_line(Point::zero(), Point::new(1.0, 1.0), Color::white(), 1.0);
        surface.end_frame();
        surface.flush();
        surface.present();

        assert_eq!(&*submitted.borrow(), &[2]);
        assert_eq!(*flushes.borrow(), 1);
    }

    #[test]
    fn explicit_submit_bypasses_the_device_on_gpu_surfaces() {
        let stub = StubContext::default();
        let submitted = Rc::clone(&stub.submitted);

        let mut rec_surface = Surface::new_recording();
        rec_surface.begin_frame();
        rec_surface
            .canvas()
            .fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        rec_surface.end_frame();
        let recording = rec_surface.take_recording().unwrap();

        let mut surface = Surface::new_gpu(Box::new(stub), 100, 100).unwrap();
        surface.begin_frame();
        surface.submit(&recording);
        assert_eq!(&*submitted.borrow(), &[1]);
    }
}
