//! GPU backend contract.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::record::Recording;
use crate::text::GlyphCache;

/// Contract a GPU backend implements to consume recordings.
///
/// The host hands an already-initialized backend to
/// [`Surface::new_gpu`](crate::surface::Surface::new_gpu); platform bootstrap
/// (window, adapter, device acquisition) stays outside the engine.
///
/// Implementations are expected to apply the batching pass to submitted
/// recordings and to maintain their own render-state cache (last scissor,
/// bound pipeline, uniform contents), skipping redundant state-changing
/// calls: the batching pass's goal, carried down to the hardware-call level.
pub trait Context {
    /// One-time setup for a drawable of the given size. A failure here is
    /// final: the caller abandons surface creation, there is no retry.
    fn init(&mut self, width: i32, height: i32) -> Result<()>;

    fn begin_frame(&mut self);
    fn resize(&mut self, width: i32, height: i32);

    /// Replays a captured frame, batched, into the current frame.
    fn submit(&mut self, recording: &Recording);

    /// Finalizes pending GPU work for the current frame.
    fn flush(&mut self);

    /// Presents the finished frame to the drawable.
    fn present(&mut self);

    fn set_glyph_cache(&mut self, cache: Rc<RefCell<GlyphCache>>);
}
