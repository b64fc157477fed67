//! WGPU rendering backend for nabu.
//!
//! Implements the engine's [`Context`](nabu_engine::context::Context)
//! contract over host-provided wgpu objects. Platform bootstrap (window,
//! adapter, device and surface acquisition) stays with the host; this crate
//! owns pipelines, vertex streaming, the glyph-atlas texture, and a
//! render-state cache that skips redundant scissor/pipeline/uniform changes.
//!
//! Convention (matching the engine):
//! - CPU geometry is in logical pixels, top-left origin, +Y down
//! - the vertex shaders convert to NDC using a viewport uniform

mod batch;
mod context;
mod vertex;

pub use context::WgpuContext;
