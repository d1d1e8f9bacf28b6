//! Nearest-sample rendering.

use sv_ir::WaveformSample;

use super::edges::{debug_check, last_index};
use super::{EdgeTaps, InterpMethod, Pass};
use crate::filter::VoiceFilter;
use crate::voice::VoiceDsp;
use crate::Block;

/// Render by picking the sample nearest the phase.
pub(crate) fn render<F: VoiceFilter>(
    voice: &mut VoiceDsp<F>,
    sample: &WaveformSample,
    out: &mut Block,
    looping: bool,
) -> usize {
    let range = voice.range;
    debug_check(sample, &range, looping, voice.has_looped, InterpMethod::None.min_span());
    let last = last_index(&range, looping);
    let edges = EdgeTaps::<0, 1>::new(sample, &range, voice.has_looped, looping);
    let mut pass = Pass::begin(voice, out);

    loop {
        while !pass.is_full() && pass.rounded_index() <= last {
            let raw = sample.value(pass.rounded_index() as u32);
            pass.emit(raw);
        }
        if !looping {
            break;
        }
        // rounding up onto loop_end picks the loop start
        pass.run_while(|i| i <= last, |_, _| edges.trailing[0]);
        if pass.index() > last {
            pass.wrap(range.loop_start, range.loop_end);
        }
        if pass.is_full() {
            break;
        }
    }

    pass.finish(looping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BLOCK_SIZE;
    use sv_ir::{Phase, SampleData};

    fn voice_for(sample: &WaveformSample) -> VoiceDsp {
        let mut voice = VoiceDsp::new(Default::default(), sample.range());
        voice.amp = 1.0;
        voice
    }

    #[test]
    fn unit_ratio_copies_samples() {
        let s = WaveformSample::new("n", SampleData::from_i16(vec![0, 100, 200, 300]));
        let mut voice = voice_for(&s);
        let mut out = [0.0; BLOCK_SIZE];
        let n = render(&mut voice, &s, &mut out, false);
        assert_eq!(n, 4);
        assert_eq!(&out[..4], &[0.0, 100.0, 200.0, 300.0]);
        assert_eq!(voice.phase, Phase::from_index(4));
    }

    #[test]
    fn rounds_to_nearest_index() {
        let s = WaveformSample::new("n", SampleData::from_i16(vec![0, 100, 200, 300, 400]));
        let mut voice = voice_for(&s);
        voice.pitch_ratio = 0.75;
        let mut out = [0.0; BLOCK_SIZE];
        let n = render(&mut voice, &s, &mut out, false);
        // phases 0, .75, 1.5, 2.25, 3.0, 3.75, then 4.5 rounds past the end
        assert_eq!(n, 6);
        assert_eq!(&out[..6], &[0.0, 100.0, 200.0, 200.0, 300.0, 400.0]);
    }

    #[test]
    fn looping_fills_block() {
        let s = WaveformSample::new("n", SampleData::from_i16(vec![1, 2, 3, 4]));
        let mut voice = voice_for(&s);
        let mut out = [0.0; BLOCK_SIZE];
        let n = render(&mut voice, &s, &mut out, true);
        assert_eq!(n, BLOCK_SIZE);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(*v, (i % 4 + 1) as f32, "sample {}", i);
        }
        assert!(voice.has_looped);
    }

    #[test]
    fn rounding_onto_loop_end_reads_loop_start() {
        let s = WaveformSample::new("n", SampleData::from_i16(vec![0, 100, 200, 300, 400]))
            .with_loop(0, 4)
            .unwrap();
        let mut voice = voice_for(&s);
        voice.pitch_ratio = 0.75;
        let mut out = [0.0; BLOCK_SIZE];
        let n = render(&mut voice, &s, &mut out, true);
        assert_eq!(n, BLOCK_SIZE);
        // 3.75 rounds to 4, which is the loop start again; then 4.5 wraps to 0.5
        assert_eq!(&out[..8], &[0.0, 100.0, 200.0, 200.0, 300.0, 0.0, 100.0, 100.0]);
        assert!(voice.phase.index_floor() < 4, "phase {:?} left the loop", voice.phase);
    }
}
