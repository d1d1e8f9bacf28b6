//! Four-point cubic rendering.

use sv_ir::WaveformSample;

use super::edges::{debug_check, last_index};
use super::{EdgeTaps, InterpMethod, Pass};
use crate::filter::VoiceFilter;
use crate::tables::tables;
use crate::voice::VoiceDsp;
use crate::Block;

/// Render with a Catmull-Rom spline through `sample[i - 1..=i + 2]`.
pub(crate) fn render<F: VoiceFilter>(
    voice: &mut VoiceDsp<F>,
    sample: &WaveformSample,
    out: &mut Block,
    looping: bool,
) -> usize {
    let coeffs = &tables().cubic;
    let range = voice.range;
    debug_check(sample, &range, looping, voice.has_looped, InterpMethod::FourthOrder.min_span());
    let last = last_index(&range, looping);
    let mut edges = EdgeTaps::<1, 2>::new(sample, &range, voice.has_looped, looping);
    let s = |i: u32| sample.value(i);
    let mut pass = Pass::begin(voice, out);

    loop {
        let first = edges.first as i64;
        let [before] = edges.leading;
        let [after0, after1] = edges.trailing;

        pass.run_while(
            |i| i == first,
            |i, row| {
                let c = &coeffs[row];
                c[0] * before + c[1] * s(i) + c[2] * s(i + 1) + c[3] * s(i + 2)
            },
        );

        pass.run_while(
            |i| i <= last - 2,
            |i, row| {
                let c = &coeffs[row];
                c[0] * s(i - 1) + c[1] * s(i) + c[2] * s(i + 1) + c[3] * s(i + 2)
            },
        );
        if pass.is_full() {
            break;
        }

        pass.run_while(
            |i| i <= last - 1,
            |i, row| {
                let c = &coeffs[row];
                c[0] * s(i - 1) + c[1] * s(i) + c[2] * s(i + 1) + c[3] * after0
            },
        );
        pass.run_while(
            |i| i <= last,
            |i, row| {
                let c = &coeffs[row];
                c[0] * s(i - 1) + c[1] * s(i) + c[2] * after0 + c[3] * after1
            },
        );
        if !looping {
            break;
        }
        if pass.index() > last && pass.wrap(range.loop_start, range.loop_end) {
            edges.set_leading(sample, &range, pass.has_looped());
        }
        if pass.is_full() {
            break;
        }
    }

    pass.finish(looping)
}
