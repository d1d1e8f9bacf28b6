//! Two-point linear rendering.

use sv_ir::WaveformSample;

use super::edges::{debug_check, last_index};
use super::{EdgeTaps, InterpMethod, Pass};
use crate::filter::VoiceFilter;
use crate::tables::tables;
use crate::voice::VoiceDsp;
use crate::Block;

/// Render by straight-line interpolation between neighbouring samples.
pub(crate) fn render<F: VoiceFilter>(
    voice: &mut VoiceDsp<F>,
    sample: &WaveformSample,
    out: &mut Block,
    looping: bool,
) -> usize {
    let coeffs = &tables().linear;
    let range = voice.range;
    debug_check(sample, &range, looping, voice.has_looped, InterpMethod::Linear.min_span());
    let last = last_index(&range, looping);
    let edges = EdgeTaps::<0, 1>::new(sample, &range, voice.has_looped, looping);
    let s = |i: u32| sample.value(i);
    let mut pass = Pass::begin(voice, out);

    loop {
        pass.run_while(
            |i| i < last,
            |i, row| {
                let c = &coeffs[row];
                c[0] * s(i) + c[1] * s(i + 1)
            },
        );
        if pass.is_full() {
            break;
        }

        pass.run_while(
            |i| i <= last,
            |i, row| {
                let c = &coeffs[row];
                c[0] * s(i) + c[1] * edges.trailing[0]
            },
        );
        if !looping {
            break;
        }
        if pass.index() > last {
            pass.wrap(range.loop_start, range.loop_end);
        }
        if pass.is_full() {
            break;
        }
    }

    pass.finish(looping)
}
