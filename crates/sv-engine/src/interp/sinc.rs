//! Seven-point windowed-sinc rendering.
//!
//! The taps are centred on the nearest sample rather than the one below the
//! phase, so the pass runs half a sample ahead and the table rows are stored
//! to match (see [`crate::tables`]). Three edge taps are needed on each side,
//! giving three leading and three trailing sub-runs around the interior.

use sv_ir::{Phase, WaveformSample};

use super::edges::{debug_check, last_index};
use super::{EdgeTaps, InterpMethod, Pass};
use crate::filter::VoiceFilter;
use crate::tables::{tables, SincTable};
use crate::voice::VoiceDsp;
use crate::Block;

#[inline(always)]
fn dot(table: &SincTable, row: usize, taps: [f32; 7]) -> f32 {
    let c = &table[row];
    c[0] * taps[0] + c[1] * taps[1] + c[2] * taps[2] + c[3] * taps[3] + c[4] * taps[4] + c[5] * taps[5] + c[6] * taps[6]
}

/// Render with a Hann-windowed sinc through `sample[i - 3..=i + 3]`.
pub(crate) fn render<F: VoiceFilter>(
    voice: &mut VoiceDsp<F>,
    sample: &WaveformSample,
    out: &mut Block,
    looping: bool,
) -> usize {
    let coeffs = &tables().sinc7;
    let range = voice.range;
    debug_check(sample, &range, looping, voice.has_looped, InterpMethod::SeventhOrder.min_span());
    let last = last_index(&range, looping);
    let mut edges = EdgeTaps::<3, 3>::new(sample, &range, voice.has_looped, looping);
    let s = |i: u32| sample.value(i);
    let mut pass = Pass::with_offset(voice, out, Phase::HALF);

    loop {
        let first = edges.first as i64;
        let [b0, b1, b2] = edges.leading;
        let [a0, a1, a2] = edges.trailing;

        pass.run_while(
            |i| i == first,
            |i, row| dot(coeffs, row, [b2, b1, b0, s(i), s(i + 1), s(i + 2), s(i + 3)]),
        );
        pass.run_while(
            |i| i == first + 1,
            |i, row| dot(coeffs, row, [b1, b0, s(i - 1), s(i), s(i + 1), s(i + 2), s(i + 3)]),
        );
        pass.run_while(
            |i| i == first + 2,
            |i, row| dot(coeffs, row, [b0, s(i - 2), s(i - 1), s(i), s(i + 1), s(i + 2), s(i + 3)]),
        );

        pass.run_while(
            |i| i <= last - 3,
            |i, row| dot(coeffs, row, [s(i - 3), s(i - 2), s(i - 1), s(i), s(i + 1), s(i + 2), s(i + 3)]),
        );
        if pass.is_full() {
            break;
        }

        pass.run_while(
            |i| i <= last - 2,
            |i, row| dot(coeffs, row, [s(i - 3), s(i - 2), s(i - 1), s(i), s(i + 1), s(i + 2), a0]),
        );
        pass.run_while(
            |i| i <= last - 1,
            |i, row| dot(coeffs, row, [s(i - 3), s(i - 2), s(i - 1), s(i), s(i + 1), a0, a1]),
        );
        pass.run_while(
            |i| i <= last,
            |i, row| dot(coeffs, row, [s(i - 3), s(i - 2), s(i - 1), s(i), a0, a1, a2]),
        );
        if !looping {
            break;
        }
        if pass.index() > last && pass.wrap(range.loop_start, range.loop_end) {
            edges.set_leading(sample, &range, true);
        }
        if pass.is_full() {
            break;
        }
    }

    pass.finish(looping)
}
