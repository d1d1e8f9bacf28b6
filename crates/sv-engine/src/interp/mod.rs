//! Interpolating render kernels.
//!
//! Every kernel fills one [`Block`] from the voice's waveform and returns
//! how many samples it wrote. They share [`Pass`], which owns the per-sample
//! pipeline (filters, amplitude ramp, phase step), and [`EdgeTaps`], which
//! holds the values substituted for taps that fall outside the playable
//! range. A kernel is a sequence of bounded runs:
//!
//! ```text
//! leading edge taps -> interior -> trailing edge taps -> loop wrap -> repeat
//! ```
//!
//! Range limits are compared as `i64`, so a range too short for a sub-run
//! simply leaves that run empty.

mod cubic;
mod edges;
mod linear;
mod nearest;
mod sinc;

pub(crate) use cubic::render as render_cubic;
pub(crate) use edges::{playable_span, EdgeTaps};
pub(crate) use linear::render as render_linear;
pub(crate) use nearest::render as render_nearest;
pub(crate) use sinc::render as render_sinc7;

use sv_ir::Phase;
use thiserror::Error;

use crate::filter::VoiceFilter;
use crate::voice::VoiceDsp;
use crate::{Block, BLOCK_SIZE};

/// Interpolation algorithm used by a voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterpMethod {
    /// Nearest sample, no interpolation.
    None,
    /// Straight line between two samples.
    Linear,
    /// Four-point cubic spline.
    #[default]
    FourthOrder,
    /// Seven-point windowed sinc.
    SeventhOrder,
}

/// Unsupported interpolation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("no interpolation of order {0} (expected 0, 1, 4 or 7)")]
pub struct InterpError(pub u8);

impl InterpMethod {
    /// Order number of the method (0, 1, 4 or 7).
    pub fn order(self) -> u8 {
        match self {
            InterpMethod::None => 0,
            InterpMethod::Linear => 1,
            InterpMethod::FourthOrder => 4,
            InterpMethod::SeventhOrder => 7,
        }
    }

    /// Smallest `last - first` index distance the kernel can render.
    ///
    /// The leading-edge runs read forward from the first index, so the
    /// range must hold all of their taps.
    pub fn min_span(self) -> i64 {
        match self {
            InterpMethod::None | InterpMethod::Linear => 0,
            InterpMethod::FourthOrder => 2,
            InterpMethod::SeventhOrder => 5,
        }
    }

    /// Highest-order method, not above `self`, that fits `span`.
    ///
    /// A negative span has no fitting kernel; it falls through to
    /// [`InterpMethod::None`].
    pub fn fitting(self, span: i64) -> InterpMethod {
        debug_assert!(span >= 0, "negative playable span {}", span);
        let mut method = self;
        while span < method.min_span() {
            method = match method {
                InterpMethod::SeventhOrder => InterpMethod::FourthOrder,
                InterpMethod::FourthOrder => InterpMethod::Linear,
                InterpMethod::Linear | InterpMethod::None => return InterpMethod::None,
            };
        }
        method
    }
}

impl TryFrom<u8> for InterpMethod {
    type Error = InterpError;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            0 => Ok(InterpMethod::None),
            1 => Ok(InterpMethod::Linear),
            4 => Ok(InterpMethod::FourthOrder),
            7 => Ok(InterpMethod::SeventhOrder),
            other => Err(InterpError(other)),
        }
    }
}

/// Per-sample pipeline for one render call.
///
/// Works on local copies of phase and amplitude and writes them back to the
/// voice in [`Pass::finish`].
pub(crate) struct Pass<'a, F: VoiceFilter> {
    voice: &'a mut VoiceDsp<F>,
    out: &'a mut Block,
    written: usize,
    phase: Phase,
    incr: Phase,
    amp: f32,
    amp_incr: f32,
    offset: Phase,
}

impl<'a, F: VoiceFilter> Pass<'a, F> {
    pub(crate) fn begin(voice: &'a mut VoiceDsp<F>, out: &'a mut Block) -> Self {
        Self::with_offset(voice, out, Phase::ZERO)
    }

    /// Start a pass with the phase moved forward by `offset`; the offset is
    /// taken back out in [`Pass::finish`].
    pub(crate) fn with_offset(voice: &'a mut VoiceDsp<F>, out: &'a mut Block, offset: Phase) -> Self {
        let incr = Phase::from_ratio(voice.pitch_ratio);
        debug_assert!(incr > Phase::ZERO, "phase increment must be positive");
        Self {
            phase: voice.phase + offset,
            incr,
            amp: voice.amp,
            amp_incr: voice.amp_incr,
            voice,
            out,
            written: 0,
            offset,
        }
    }

    #[inline(always)]
    pub(crate) fn is_full(&self) -> bool {
        self.written >= BLOCK_SIZE
    }

    /// Current index, truncated.
    #[inline(always)]
    pub(crate) fn index(&self) -> i64 {
        self.phase.index_floor() as i64
    }

    /// Current index, rounded to the nearest sample.
    #[inline(always)]
    pub(crate) fn rounded_index(&self) -> i64 {
        self.phase.index_rounded() as i64
    }

    pub(crate) fn has_looped(&self) -> bool {
        self.voice.has_looped
    }

    /// Filter, scale and store one raw value, then step phase and amplitude.
    #[inline(always)]
    pub(crate) fn emit(&mut self, raw: f32) {
        let rate = self.voice.output_rate;
        let mut frame = [raw];
        self.voice.resonant_filter.apply(&mut frame, rate);
        self.voice.custom_filter.apply(&mut frame, rate);
        self.out[self.written] = self.amp * frame[0];
        self.written += 1;
        self.phase.advance(self.incr);
        self.amp += self.amp_incr;
    }

    /// Emit samples while the truncated index satisfies `in_range`.
    ///
    /// `value` gets the index and the coefficient table row.
    #[inline(always)]
    pub(crate) fn run_while(&mut self, in_range: impl Fn(i64) -> bool, mut value: impl FnMut(u32, usize) -> f32) {
        while !self.is_full() {
            let index = self.phase.index_floor();
            if !in_range(index as i64) {
                break;
            }
            let raw = value(index, self.phase.fractional_row());
            self.emit(raw);
        }
    }

    /// Fold the phase back into the loop, however many loop lengths it has
    /// run past. Returns true on the voice's first wrap.
    pub(crate) fn wrap(&mut self, loop_start: u32, loop_end: u32) -> bool {
        self.phase = self.phase.wrap_into(loop_start, loop_end);
        let first = !self.voice.has_looped;
        self.voice.has_looped = true;
        first
    }

    /// Write phase and amplitude back to the voice; returns samples written.
    ///
    /// A looping pass can stop on a full block before its wrap step, or,
    /// with an offset, just below the loop start. Either way the stored
    /// phase is folded back into `loop_start..loop_end`.
    pub(crate) fn finish(self, looping: bool) -> usize {
        let mut phase = self.phase;
        phase.retreat(self.offset);
        let range = self.voice.range;
        let index = phase.index_floor();
        if looping && (index >= range.loop_end || (self.voice.has_looped && index < range.loop_start)) {
            phase = phase.wrap_into(range.loop_start, range.loop_end);
            self.voice.has_looped = true;
        }
        self.voice.phase = phase;
        self.voice.amp = self.amp;
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_round_trips_through_try_from() {
        for method in [
            InterpMethod::None,
            InterpMethod::Linear,
            InterpMethod::FourthOrder,
            InterpMethod::SeventhOrder,
        ] {
            assert_eq!(InterpMethod::try_from(method.order()), Ok(method));
        }
    }

    #[test]
    fn unknown_order_is_rejected() {
        let err = InterpMethod::try_from(3).unwrap_err();
        assert_eq!(err, InterpError(3));
        assert_eq!(err.to_string(), "no interpolation of order 3 (expected 0, 1, 4 or 7)");
    }

    #[test]
    fn default_is_fourth_order() {
        assert_eq!(InterpMethod::default(), InterpMethod::FourthOrder);
    }

    #[test]
    fn fitting_steps_down_until_span_fits() {
        assert_eq!(InterpMethod::SeventhOrder.fitting(5), InterpMethod::SeventhOrder);
        assert_eq!(InterpMethod::SeventhOrder.fitting(4), InterpMethod::FourthOrder);
        assert_eq!(InterpMethod::SeventhOrder.fitting(1), InterpMethod::Linear);
        assert_eq!(InterpMethod::FourthOrder.fitting(0), InterpMethod::Linear);
        assert_eq!(InterpMethod::None.fitting(0), InterpMethod::None);
    }

    #[test]
    fn fitting_never_steps_up() {
        assert_eq!(InterpMethod::Linear.fitting(100), InterpMethod::Linear);
        assert_eq!(InterpMethod::None.fitting(100), InterpMethod::None);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn fitting_negative_span_falls_back_to_nearest() {
        assert_eq!(InterpMethod::SeventhOrder.fitting(-1), InterpMethod::None);
        assert_eq!(InterpMethod::Linear.fitting(-1), InterpMethod::None);
    }
}
