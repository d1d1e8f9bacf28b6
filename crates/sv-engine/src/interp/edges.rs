//! Edge-tap substitution at the range and loop boundaries.

use sv_ir::{SampleRange, WaveformSample};

/// Values that stand in for taps outside the playable range.
///
/// Before the voice first wraps, taps before `start` read the start value
/// itself. Once it has looped, taps before `loop_start` read the tail of the
/// loop. Taps after the last index read the loop head while looping and the
/// end value otherwise.
pub(crate) struct EdgeTaps<const LEAD: usize, const TRAIL: usize> {
    /// Index whose predecessors are substituted.
    pub(crate) first: u32,
    /// `leading[k]` stands in for the sample `k + 1` frames before `first`.
    pub(crate) leading: [f32; LEAD],
    /// `trailing[k]` stands in for the sample `k + 1` frames after the last index.
    pub(crate) trailing: [f32; TRAIL],
}

impl<const LEAD: usize, const TRAIL: usize> EdgeTaps<LEAD, TRAIL> {
    pub(crate) fn new(sample: &WaveformSample, range: &SampleRange, has_looped: bool, looping: bool) -> Self {
        let trailing = if looping {
            core::array::from_fn(|k| sample.value(range.loop_start + k as u32))
        } else {
            [sample.value(range.end); TRAIL]
        };
        let mut taps = Self {
            first: range.start,
            leading: [0.0; LEAD],
            trailing,
        };
        taps.set_leading(sample, range, has_looped);
        taps
    }

    /// Pick the leading substitutes; called again right after the first wrap.
    pub(crate) fn set_leading(&mut self, sample: &WaveformSample, range: &SampleRange, has_looped: bool) {
        if has_looped {
            self.first = range.loop_start;
            self.leading = core::array::from_fn(|k| sample.value(range.loop_end.saturating_sub(1 + k as u32)));
        } else {
            self.first = range.start;
            self.leading = [sample.value(range.start); LEAD];
        }
    }
}

/// Distance between the first and last index a kernel may be asked to
/// render from, given the loop state.
pub(crate) fn playable_span(range: &SampleRange, looping: bool, has_looped: bool) -> i64 {
    if looping {
        range.loop_len() as i64 - 1
    } else if has_looped {
        range.end as i64 - range.loop_start as i64
    } else {
        range.end as i64 - range.start as i64
    }
}

/// Index past which a pass stops (non-looping) or wraps (looping).
#[inline]
pub(crate) fn last_index(range: &SampleRange, looping: bool) -> i64 {
    if looping {
        range.loop_end as i64 - 1
    } else {
        range.end as i64
    }
}

/// Debug-build check of the range a kernel is about to render.
pub(crate) fn debug_check(sample: &WaveformSample, range: &SampleRange, looping: bool, has_looped: bool, min_span: i64) {
    debug_assert!(range.start <= range.end, "range start after end");
    debug_assert!((range.end as usize) < sample.len(), "range end outside sample data");
    if looping {
        debug_assert!(range.loop_start < range.loop_end, "empty loop");
    }
    if looping || has_looped {
        debug_assert!(range.loop_start <= range.end, "loop start past range end");
        debug_assert!(range.loop_end <= range.end + 1, "loop end past range end");
    }
    debug_assert!(
        playable_span(range, looping, has_looped) >= min_span,
        "range too short for the interpolation kernel"
    );
}
