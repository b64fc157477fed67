//! Draw-call capture: compact commands, payload arena, recorder, recording.
//!
//! Responsibilities:
//! - keep the per-frame command array fixed-size and allocation-free per call
//! - store variable-length payloads (polyline points, text bytes) out of line
//!   in an arena addressed by stable integer offsets
//! - freeze captured frames into immutable, replayable [`Recording`]s

mod arena;
mod cmd;
mod recorder;

pub use arena::Arena;
pub use cmd::{DrawCmd, DrawOp};
pub use recorder::{Recorder, Recording};
