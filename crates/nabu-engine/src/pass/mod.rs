//! Batching pass: reorders a recording into a state-coherent emission order.
//!
//! Commands are binned first by clip group, then by (type, color), while the
//! per-group sequence number preserves recording order inside each bucket.
//! Backends walking the emission order can coalesce identical draw state into
//! few draw calls and confine scissor changes to group boundaries.
//!
//! Ordering guarantees:
//! - commands between a `SetClip` and its matching `ClearClip` never escape
//!   into a different group (group-open/close markers pin the boundaries, and
//!   the group id advances on *both* markers so trailing commands start a
//!   fresh group instead of merging with stragglers)
//! - relative order inside the same (group, type, color) bucket matches
//!   recording order
//!
//! This is an approximation of painter's-algorithm ordering, not a guarantee:
//! buckets with different type/color are reordered relative to each other,
//! which is visually inconsequential for the opaque and near-opaque
//! primitives this engine targets but would misrender order-dependent
//! translucent overlap.

mod key;

use key::SortKey;

use crate::record::{DrawOp, Recording};

/// Emission order for one recording.
#[derive(Debug, Default)]
pub struct DrawPass {
    order: Vec<u32>,
}

impl DrawPass {
    /// Computes the batched emission order for `recording`.
    pub fn build(recording: &Recording) -> Self {
        let cmds = recording.commands();
        if cmds.is_empty() {
            return Self::default();
        }

        let mut keys = Vec::with_capacity(cmds.len());
        let mut group: u16 = 0;
        let mut seq: u8 = 0;

        for (i, cmd) in cmds.iter().enumerate() {
            let index = i as u32;
            match cmd.op {
                DrawOp::SetClip { .. } => {
                    group = group.wrapping_add(1);
                    keys.push(SortKey::group_open(group, index));
                    seq = 1;
                }
                DrawOp::ClearClip => {
                    keys.push(SortKey::group_close(group, index));
                    group = group.wrapping_add(1);
                    seq = 0;
                }
                _ => {
                    keys.push(SortKey::pack(group, cmd.op.tag(), cmd.color, seq, index));
                    seq = seq.wrapping_add(1);
                    if seq >= SortKey::CLOSE_SEQ {
                        // 0x00 and 0xFE are reserved for the group markers.
                        seq = 1;
                    }
                }
            }
        }

        // Stable sort: equal keys keep recording order.
        keys.sort_by_key(|k| k.key);

        Self {
            order: keys.iter().map(|k| k.index).collect(),
        }
    }

    /// Indices into `recording.commands()` in emission order.
    #[inline]
    pub fn order(&self) -> &[u32] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Color, Point, Rect};
    use crate::record::Recorder;

    fn rect(i: f32) -> Rect {
        Rect::new(i, i, 10.0, 10.0)
    }

    fn red() -> Color {
        Color::rgb(255, 0, 0)
    }

    fn blue() -> Color {
        Color::rgb(0, 0, 255)
    }

    // ── basics ────────────────────────────────────────────────────────────

    #[test]
    fn empty_recording_yields_empty_order() {
        let recording = Recorder::new().finish();
        assert!(DrawPass::build(&recording).is_empty());
    }

    #[test]
    fn emits_every_command_exactly_once() {
        let mut rec = Recorder::new();
        rec.fill_rect(rect(0.0), red());
        rec.set_clip(rect(1.0));
        rec.draw_line(Point::zero(), Point::new(1.0, 1.0), blue(), 1.0);
        rec.clear_clip();
        rec.fill_rect(rect(2.0), blue());

        let pass = DrawPass::build(&rec.finish());
        let mut seen = pass.order().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    // ── ordering within buckets ───────────────────────────────────────────

    #[test]
    fn same_color_fills_keep_recording_order() {
        let mut rec = Recorder::new();
        rec.fill_rect(rect(0.0), red());
        rec.fill_rect(rect(1.0), red());
        rec.fill_rect(rect(2.0), red());

        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.order(), &[0, 1, 2]);
    }

    #[test]
    fn fills_group_by_color() {
        let mut rec = Recorder::new();
        rec.fill_rect(rect(0.0), red());
        rec.fill_rect(rect(1.0), blue());
        rec.fill_rect(rect(2.0), red());
        rec.fill_rect(rect(3.0), blue());

        // Blue packs below red (r occupies the top color byte), so blues are
        // emitted first; recording order survives inside each color bucket.
        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.order(), &[1, 3, 0, 2]);
    }

    #[test]
    fn distinct_types_emit_in_tag_order_within_a_group() {
        let mut rec = Recorder::new();
        rec.draw_text(Point::zero(), "Hi", Color::white());
        rec.fill_rect(rect(0.0), red());

        // Fill (tag 0) precedes text (tag 4) in the same group.
        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.order(), &[1, 0]);
    }

    #[test]
    fn fill_then_text_scenario_keeps_original_order() {
        let mut rec = Recorder::new();
        rec.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), red());
        rec.draw_text(Point::zero(), "Hi", Color::white());

        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.order(), &[0, 1]);
    }

    // ── clip groups ───────────────────────────────────────────────────────

    #[test]
    fn clipped_span_stays_between_its_markers() {
        let mut rec = Recorder::new();
        rec.fill_rect(rect(0.0), red()); // 0: group 0
        rec.set_clip(rect(1.0)); // 1: opens group 1
        rec.fill_rect(rect(2.0), red()); // 2: group 1
        rec.fill_rect(rect(3.0), blue()); // 3: group 1
        rec.clear_clip(); // 4: closes group 1
        rec.fill_rect(rect(5.0), blue()); // 5: group 2

        // Inside group 1 the blue fill sorts before the red one, but both
        // stay strictly between the group markers.
        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.order(), &[0, 1, 3, 2, 4, 5]);
    }

    #[test]
    fn commands_before_and_after_set_clip_never_interleave() {
        let mut rec = Recorder::new();
        for _ in 0..4 {
            rec.fill_rect(rect(0.0), red());
        }
        rec.set_clip(rect(1.0));
        for _ in 0..4 {
            rec.fill_rect(rect(2.0), red());
        }

        let pass = DrawPass::build(&rec.finish());
        let position = |i: u32| pass.order().iter().position(|&x| x == i).unwrap();
        let clip_pos = position(4);
        for i in 0..4 {
            assert!(position(i) < clip_pos, "pre-clip command {i} leaked past the boundary");
        }
        for i in 5..9 {
            assert!(position(i) > clip_pos, "clipped command {i} leaked before the boundary");
        }
    }

    #[test]
    fn trailing_commands_do_not_merge_into_the_closed_group() {
        let mut rec = Recorder::new();
        rec.set_clip(rect(0.0)); // 0
        rec.fill_rect(rect(1.0), red()); // 1: group 1
        rec.clear_clip(); // 2
        rec.fill_rect(rect(3.0), red()); // 3: group 2, same color as 1

        // Were the straggler merged into group 1 it would sort next to
        // command 1; the close marker plus group bump keeps it after.
        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.order(), &[0, 1, 2, 3]);
    }

    #[test]
    fn sequence_wrap_reserves_marker_sentinels() {
        // More same-state commands than the 8-bit sequence can number: the
        // counter wraps to 1 and never collides with the close marker, so
        // every command still lands inside its group.
        let mut rec = Recorder::new();
        rec.set_clip(rect(0.0));
        for _ in 0..300 {
            rec.fill_rect(rect(1.0), red());
        }
        rec.clear_clip();

        let pass = DrawPass::build(&rec.finish());
        assert_eq!(pass.len(), 302);
        assert_eq!(pass.order()[0], 0, "open marker first");
        assert_eq!(pass.order()[301], 301, "close marker last");
    }
}
