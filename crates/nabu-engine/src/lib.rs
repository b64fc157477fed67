//! Nabu engine crate.
//!
//! Backend-agnostic 2D drawing core: draw calls are captured into compact
//! fixed-size commands backed by an arena, frozen into immutable recordings,
//! reordered by a sort-based batching pass into state-coherent groups, and
//! replayed against software or GPU backends.
//!
//! Graphics-API specifics live in backend crates (e.g. `nabu-wgpu`), which
//! implement the [`context::Context`] contract.

pub mod canvas;
pub mod context;
pub mod coords;
pub mod device;
pub mod logging;
pub mod pass;
pub mod pixmap;
pub mod record;
pub mod surface;
pub mod text;
