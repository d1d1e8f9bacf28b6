//! Voice: rendering state for one playing note.
//!
//! A `VoiceDsp` holds everything the kernels read and advance between
//! blocks: the voice's copy of the playback range, the fixed-point phase,
//! the amplitude ramp and the two filters. The sample itself lives in a
//! [`SampleBank`]; the voice only keeps its key.

use sv_ir::{Phase, SampleBank, SampleKey, SampleRange, WaveformSample};

use crate::filter::{IirFilter, VoiceFilter};
use crate::interp::{self, InterpMethod};
use crate::{Block, BLOCK_SIZE};

/// Loops shorter than this are played through once instead.
const MIN_LOOP_SIZE: u32 = 2;

/// Highest pitch ratio [`VoiceDsp::write`] renders at; larger ratios are
/// clamped to it. Keeps the phase increment far below the point where the
/// 32-bit sample index could wrap within a block.
pub const MAX_PITCH_RATIO: f32 = 65536.0;

/// How a voice treats its loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Play `start..=end` once.
    #[default]
    Unlooped,
    /// Repeat the loop for as long as the voice plays.
    Looped,
    /// Repeat the loop until the note is released, then play out to `end`.
    LoopUntilRelease,
}

/// Range check still owed before the next block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SanityCheck {
    Clear,
    Startup,
    RangeChanged,
}

/// Rendering state of a single voice.
#[derive(Clone, Debug)]
pub struct VoiceDsp<F: VoiceFilter = IirFilter> {
    /// Which sample this voice plays.
    pub sample_key: SampleKey,
    /// Playback and loop indices, checked against the sample before use.
    pub range: SampleRange,
    /// Loop behaviour; the sanity pass may demote it to `Unlooped`.
    pub loop_mode: LoopMode,
    /// Requested interpolation; shorter ranges render with a lower order.
    pub interp: InterpMethod,
    /// Current position in the sample.
    pub phase: Phase,
    /// Sample frames per output frame; the phase increment is derived from it.
    pub pitch_ratio: f32,
    /// Gain applied to the next output sample.
    pub amp: f32,
    /// Added to `amp` after every output sample.
    pub amp_incr: f32,
    /// Set once the phase first wraps back into the loop.
    pub has_looped: bool,
    /// Output sample rate in Hz, handed to the filters.
    pub output_rate: f32,
    /// Applied first to every interpolated sample.
    pub resonant_filter: F,
    /// Applied after `resonant_filter`.
    pub custom_filter: F,
    released: bool,
    finished: bool,
    pending_check: SanityCheck,
}

impl VoiceDsp {
    /// Create a voice with both filters disabled.
    pub fn new(sample_key: SampleKey, range: SampleRange) -> Self {
        Self::with_filters(sample_key, range, IirFilter::default(), IirFilter::default())
    }
}

impl<F: VoiceFilter> VoiceDsp<F> {
    /// Create a voice with the given primary and auxiliary filters.
    pub fn with_filters(sample_key: SampleKey, range: SampleRange, resonant_filter: F, custom_filter: F) -> Self {
        Self {
            sample_key,
            range,
            loop_mode: LoopMode::Unlooped,
            interp: InterpMethod::default(),
            phase: Phase::from_index(range.start),
            pitch_ratio: 1.0,
            amp: 1.0,
            amp_incr: 0.0,
            has_looped: false,
            output_rate: 44100.0,
            resonant_filter,
            custom_filter,
            released: false,
            finished: false,
            pending_check: SanityCheck::Startup,
        }
    }

    /// Note-off. Ends the loop of a [`LoopMode::LoopUntilRelease`] voice.
    pub fn release(&mut self) {
        self.released = true;
    }

    /// True once [`VoiceDsp::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// True once the voice has run off the end of its sample.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Replace the playback range; it is checked again before the next block.
    pub fn set_range(&mut self, range: SampleRange) {
        self.range = range;
        if self.pending_check == SanityCheck::Clear {
            self.pending_check = SanityCheck::RangeChanged;
        }
    }

    /// Whether the next block should loop.
    pub fn is_looping(&self) -> bool {
        match self.loop_mode {
            LoopMode::Unlooped => false,
            LoopMode::Looped => true,
            LoopMode::LoopUntilRelease => !self.released,
        }
    }

    /// Render one block by nearest-sample lookup.
    pub fn render_nearest(&mut self, sample: &WaveformSample, out: &mut Block, looping: bool) -> usize {
        interp::render_nearest(self, sample, out, looping)
    }

    /// Render one block by linear interpolation.
    pub fn render_linear(&mut self, sample: &WaveformSample, out: &mut Block, looping: bool) -> usize {
        interp::render_linear(self, sample, out, looping)
    }

    /// Render one block by 4-point cubic interpolation.
    ///
    /// The range must span at least 3 frames (`end - start >= 2`, or a loop
    /// of 3 frames when `looping`).
    pub fn render_cubic(&mut self, sample: &WaveformSample, out: &mut Block, looping: bool) -> usize {
        interp::render_cubic(self, sample, out, looping)
    }

    /// Render one block by 7-point windowed-sinc interpolation.
    ///
    /// The range must span at least 6 frames (`end - start >= 5`, or a loop
    /// of 6 frames when `looping`).
    pub fn render_sinc7(&mut self, sample: &WaveformSample, out: &mut Block, looping: bool) -> usize {
        interp::render_sinc7(self, sample, out, looping)
    }

    /// Render one block with `self.interp`, stepping down to a lower order
    /// when the range is too short for its taps.
    pub fn render(&mut self, sample: &WaveformSample, out: &mut Block, looping: bool) -> usize {
        let span = interp::playable_span(&self.range, looping, self.has_looped);
        match self.interp.fitting(span) {
            InterpMethod::None => self.render_nearest(sample, out, looping),
            InterpMethod::Linear => self.render_linear(sample, out, looping),
            InterpMethod::FourthOrder => self.render_cubic(sample, out, looping),
            InterpMethod::SeventhOrder => self.render_sinc7(sample, out, looping),
        }
    }

    /// Produce the next block of the voice from the sample in `bank`.
    ///
    /// Returns the number of samples written. Anything short of a full block
    /// means the voice has finished; the rest of `out` is left untouched.
    pub fn write(&mut self, bank: &SampleBank, out: &mut Block) -> usize {
        if self.finished {
            return 0;
        }
        let Some(sample) = bank.get(self.sample_key) else {
            log::warn!("voice sample {:?} is not in the bank", self.sample_key);
            self.finished = true;
            return 0;
        };

        if self.pending_check != SanityCheck::Clear {
            self.check_sample_sanity(sample);
            if self.finished {
                return 0;
            }
        }

        let looping = self.is_looping();
        if self.pitch_ratio.is_nan() || self.pitch_ratio <= 0.0 {
            self.pitch_ratio = 1.0;
        } else if self.pitch_ratio > MAX_PITCH_RATIO {
            log::debug!("pitch ratio {} clamped to {}", self.pitch_ratio, MAX_PITCH_RATIO);
            self.pitch_ratio = MAX_PITCH_RATIO;
        }

        #[cfg(feature = "alloc_check")]
        let count = assert_no_alloc::assert_no_alloc(|| self.render(sample, out, looping));
        #[cfg(not(feature = "alloc_check"))]
        let count = self.render(sample, out, looping);

        if count < BLOCK_SIZE {
            log::debug!("voice finished at {:.2} after {} samples", self.phase.to_f64(), count);
            self.finished = true;
        }
        count
    }

    /// Fit the voice's range to the sample data.
    fn check_sample_sanity(&mut self, sample: &WaveformSample) {
        let startup = self.pending_check == SanityCheck::Startup;
        self.pending_check = SanityCheck::Clear;

        let frames = u32::try_from(sample.len()).unwrap_or(u32::MAX);
        if frames == 0 {
            log::warn!("sample '{}' has no data", sample.name);
            self.finished = true;
            return;
        }

        let before = self.range;
        let r = &mut self.range;
        let last_frame = frames - 1;
        r.start = r.start.min(last_frame);
        r.end = r.end.min(last_frame);
        if r.start > r.end {
            core::mem::swap(&mut r.start, &mut r.end);
        }
        if r.start == r.end {
            log::debug!("sample '{}' plays a single frame, nothing to render", sample.name);
            self.finished = true;
            return;
        }

        // A voice that has looped reads its leading taps from the loop points
        // even after the loop is gone, so they stay clamped as well.
        if self.loop_mode != LoopMode::Unlooped || self.has_looped {
            r.loop_start = r.loop_start.clamp(r.start, r.end);
            r.loop_end = r.loop_end.clamp(r.start, r.end + 1);
            if r.loop_start > r.loop_end {
                core::mem::swap(&mut r.loop_start, &mut r.loop_end);
            }
            if self.loop_mode != LoopMode::Unlooped && r.loop_len() < MIN_LOOP_SIZE {
                log::warn!(
                    "loop {}..{} of sample '{}' is too short, playing unlooped",
                    r.loop_start,
                    r.loop_end,
                    sample.name
                );
                self.loop_mode = LoopMode::Unlooped;
            }
        }

        if self.range != before {
            log::debug!("voice range clamped from {:?} to {:?}", before, self.range);
        }

        if startup {
            self.phase = Phase::from_index(self.range.start);
            let span = interp::playable_span(&self.range, self.is_looping(), false);
            let fitted = self.interp.fitting(span);
            if fitted != self.interp {
                log::debug!(
                    "sample '{}' too short for {:?} interpolation, using {:?}",
                    sample.name,
                    self.interp,
                    fitted
                );
            }
        }

        if self.is_looping() && self.phase.index_floor() >= self.range.loop_end {
            self.phase = Phase::from_index(self.range.loop_start);
        }

        // Kernels read backwards from the phase down to their first index:
        // the loop start once looped, the range start before that.
        let first = if self.has_looped { self.range.loop_start } else { self.range.start };
        if self.phase.index_floor() < first {
            log::debug!("voice phase {:.2} moved up to index {}", self.phase.to_f64(), first);
            self.phase = Phase::from_index(first);
        }
    }
}
