//! CPU-side batch planning.
//!
//! Walks a recording in the engine's batched emission order and expands it
//! into per-pipeline vertex streams plus a batch list. Contiguous runs with
//! identical render state (pipeline + scissor) collapse into one batch, so
//! the GPU side issues one draw call per run and touches scissor state only
//! at batch boundaries.

use std::cell::RefCell;
use std::rc::Rc;

use nabu_engine::coords::{Color, Rect};
use nabu_engine::pass::DrawPass;
use nabu_engine::record::{DrawOp, Recording};
use nabu_engine::text::GlyphCache;

use crate::vertex::{SolidVertex, TextVertex};

/// Which pipeline a batch runs on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum BatchKind {
    Triangles,
    Lines,
    Text,
}

/// Contiguous vertex run drawn with one pipeline under one clip rect.
///
/// `start..end` indexes the vertex stream matching `kind`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Batch {
    pub kind: BatchKind,
    pub start: u32,
    pub end: u32,
    pub clip: Option<Rect>,
}

/// Everything one `submit` needs to upload and encode.
#[derive(Debug, Default)]
pub(crate) struct FramePlan {
    pub triangles: Vec<SolidVertex>,
    pub lines: Vec<SolidVertex>,
    pub text: Vec<TextVertex>,
    pub batches: Vec<Batch>,
}

impl FramePlan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Appends a batch, merging into the previous one when the render state
    /// is identical.
    fn note(&mut self, kind: BatchKind, start: usize, end: usize, clip: Option<Rect>) {
        if start == end {
            return;
        }
        if let Some(last) = self.batches.last_mut() {
            if last.kind == kind && last.clip == clip && last.end as usize == start {
                last.end = end as u32;
                return;
            }
        }
        self.batches.push(Batch {
            kind,
            start: start as u32,
            end: end as u32,
            clip,
        });
    }
}

/// Plans one recording: batching pass first, then vertex expansion.
///
/// Text commands are skipped entirely when no glyph cache is attached.
pub(crate) fn plan(
    recording: &Recording,
    glyph_cache: Option<&Rc<RefCell<GlyphCache>>>,
) -> FramePlan {
    let pass = DrawPass::build(recording);
    let cmds = recording.commands();
    let arena = recording.arena();

    // Warm the glyph cache for every text command up front. Rasterization can
    // grow the atlas, which rescales previously issued UVs; settling the
    // whole alphabet first keeps every quad emitted below consistent with the
    // final atlas.
    if let Some(cache) = glyph_cache {
        let mut cache = cache.borrow_mut();
        for cmd in cmds {
            if let DrawOp::Text { offset, len, .. } = cmd.op {
                for ch in arena.get_str(offset, len).chars() {
                    cache.glyph(ch);
                }
            }
        }
    }

    let mut out = FramePlan::default();
    let mut clip: Option<Rect> = None;

    for &index in pass.order() {
        let cmd = &cmds[index as usize];
        match cmd.op {
            DrawOp::SetClip { rect } => clip = Some(rect),
            DrawOp::ClearClip => clip = None,

            DrawOp::FillRect { rect } => {
                let start = out.triangles.len();
                push_quad(&mut out.triangles, rect, cmd.color);
                let end = out.triangles.len();
                out.note(BatchKind::Triangles, start, end, clip);
            }

            DrawOp::StrokeRect { rect } => {
                let start = out.lines.len();
                let r = rect.normalized();
                push_segment(&mut out.lines, r.x, r.y, r.right(), r.y, cmd.color);
                push_segment(&mut out.lines, r.right(), r.y, r.right(), r.bottom(), cmd.color);
                push_segment(&mut out.lines, r.right(), r.bottom(), r.x, r.bottom(), cmd.color);
                push_segment(&mut out.lines, r.x, r.bottom(), r.x, r.y, cmd.color);
                let end = out.lines.len();
                out.note(BatchKind::Lines, start, end, clip);
            }

            DrawOp::Line { from, to } => {
                let start = out.lines.len();
                push_segment(&mut out.lines, from.x, from.y, to.x, to.y, cmd.color);
                let end = out.lines.len();
                out.note(BatchKind::Lines, start, end, clip);
            }

            DrawOp::Polyline { offset, count } => {
                let start = out.lines.len();
                for pair in arena.get_points(offset, count).windows(2) {
                    push_segment(&mut out.lines, pair[0].x, pair[0].y, pair[1].x, pair[1].y, cmd.color);
                }
                let end = out.lines.len();
                out.note(BatchKind::Lines, start, end, clip);
            }

            DrawOp::Text { origin, offset, len } => {
                let Some(cache) = glyph_cache else { continue };
                let start = out.text.len();
                push_text(
                    &mut out.text,
                    &mut cache.borrow_mut(),
                    origin.x,
                    origin.y,
                    arena.get_str(offset, len),
                    cmd.color,
                );
                let end = out.text.len();
                out.note(BatchKind::Text, start, end, clip);
            }
        }
    }

    out
}

fn push_quad(verts: &mut Vec<SolidVertex>, rect: Rect, color: Color) {
    let r = rect.normalized();
    let v0 = SolidVertex::new(r.x, r.y, color);
    let v1 = SolidVertex::new(r.right(), r.y, color);
    let v2 = SolidVertex::new(r.right(), r.bottom(), color);
    let v3 = SolidVertex::new(r.x, r.bottom(), color);
    verts.extend_from_slice(&[v0, v1, v2, v0, v2, v3]);
}

fn push_segment(verts: &mut Vec<SolidVertex>, x1: f32, y1: f32, x2: f32, y2: f32, color: Color) {
    verts.push(SolidVertex::new(x1, y1, color));
    verts.push(SolidVertex::new(x2, y2, color));
}

fn push_text(
    verts: &mut Vec<TextVertex>,
    cache: &mut GlyphCache,
    x: f32,
    y: f32,
    text: &str,
    color: Color,
) {
    let baseline = y + cache.ascent() as f32;
    let mut pen = x;

    for ch in text.chars() {
        let Some(g) = cache.glyph(ch) else { continue };
        if g.width() > 0 && g.height() > 0 {
            let x0 = pen + g.x0 as f32;
            let y0 = baseline + g.y0 as f32;
            let x1 = x0 + g.width() as f32;
            let y1 = y0 + g.height() as f32;

            let tl = TextVertex::new(x0, y0, g.u0, g.v0, color);
            let tr = TextVertex::new(x1, y0, g.u1, g.v0, color);
            let br = TextVertex::new(x1, y1, g.u1, g.v1, color);
            let bl = TextVertex::new(x0, y1, g.u0, g.v1, color);
            verts.extend_from_slice(&[tl, tr, br, tl, br, bl]);
        }
        pen += g.advance as f32;
    }
}
