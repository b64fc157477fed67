use crate::coords::{Color, Point, Rect};

/// One captured draw call.
///
/// The record is fixed-size regardless of payload length: polyline points and
/// text bytes live in the recording's [`Arena`](super::Arena) and are
/// referenced by offset. This keeps the hot command array cache-friendly and
/// makes recording a draw call allocation-free.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCmd {
    pub op: DrawOp,
    pub color: Color,
    /// Stroke width in logical pixels. Fills and clip ops ignore it.
    pub width: f32,
}

/// Shape-specific payload of a [`DrawCmd`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
    },
    StrokeRect {
        rect: Rect,
    },
    Line {
        from: Point,
        to: Point,
    },
    /// `offset`/`count` index the arena's point lane.
    Polyline {
        offset: u32,
        count: u32,
    },
    /// `offset`/`len` index the arena's byte lane (UTF-8).
    Text {
        origin: Point,
        offset: u32,
        len: u32,
    },
    SetClip {
        rect: Rect,
    },
    ClearClip,
}

impl DrawOp {
    /// Type tag used by the batching key.
    #[inline]
    pub const fn tag(&self) -> u8 {
        match self {
            DrawOp::FillRect { .. } => 0,
            DrawOp::StrokeRect { .. } => 1,
            DrawOp::Line { .. } => 2,
            DrawOp::Polyline { .. } => 3,
            DrawOp::Text { .. } => 4,
            DrawOp::SetClip { .. } => 5,
            DrawOp::ClearClip => 6,
        }
    }
}
