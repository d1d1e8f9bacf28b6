//! Fixed-point playback position.
//!
//! A `Phase` is a 32.32 fixed-point number: the upper half is the integer
//! sample index, the lower half the fraction between that sample and the
//! next. Phase arithmetic is exact, so no drift accumulates however long a
//! voice plays.

use core::ops::{Add, Sub};

/// Number of fractional bits.
const FRACT_BITS: u32 = 32;

/// Mask selecting the fractional bits.
const FRACT_MASK: u64 = (1 << FRACT_BITS) - 1;

/// `2^32` as a float, the scale of one whole sample.
const FRACT_SCALE: f64 = 4_294_967_296.0;

/// Bits of fraction used to select an interpolation table row.
pub const TABLE_ROW_BITS: u32 = 8;

/// Number of rows in every interpolation coefficient table.
pub const TABLE_ROWS: usize = 1 << TABLE_ROW_BITS;

/// Playback position (or increment) in a waveform, 32.32 fixed point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase(u64);

impl Phase {
    /// Position zero.
    pub const ZERO: Phase = Phase(0);

    /// Half a sample.
    pub const HALF: Phase = Phase(1 << (FRACT_BITS - 1));

    /// One whole sample.
    pub const ONE: Phase = Phase(1 << FRACT_BITS);

    /// Phase sitting exactly on sample `index`.
    pub const fn from_index(index: u32) -> Self {
        Phase((index as u64) << FRACT_BITS)
    }

    /// Convert a floating pitch ratio (samples per output sample) to a phase.
    ///
    /// The integer part is taken as-is and the fraction is truncated to 32
    /// bits. Negative or NaN ratios yield zero; ratios of `2^32` and above
    /// saturate to the largest whole increment.
    pub fn from_ratio(ratio: f32) -> Self {
        let ratio = ratio as f64;
        if ratio.is_nan() || ratio <= 0.0 {
            return Phase::ZERO;
        }
        let whole = ratio as u32;
        let fract = ((ratio - whole as f64) * FRACT_SCALE) as u64 & FRACT_MASK;
        Phase(((whole as u64) << FRACT_BITS) | fract)
    }

    /// Step forward by `incr`.
    #[inline(always)]
    pub fn advance(&mut self, incr: Phase) {
        self.0 = self.0.wrapping_add(incr.0);
    }

    /// Step backward by `incr`.
    #[inline(always)]
    pub fn retreat(&mut self, incr: Phase) {
        self.0 = self.0.wrapping_sub(incr.0);
    }

    /// Move back by a whole number of samples (loop wrap).
    #[inline(always)]
    pub fn subtract_index(&mut self, samples: u32) {
        debug_assert!(self.index_floor() >= samples, "phase wrapped below zero");
        self.0 -= (samples as u64) << FRACT_BITS;
    }

    /// Fold the phase into `loop_start..loop_end`, keeping its offset within
    /// the loop. A phase that has wrapped just below zero folds up to the
    /// loop's tail. An empty loop leaves the phase unchanged.
    pub fn wrap_into(self, loop_start: u32, loop_end: u32) -> Phase {
        if loop_end <= loop_start {
            return self;
        }
        let start = Phase::from_index(loop_start).0;
        let len = ((loop_end - loop_start) as i128) << FRACT_BITS;
        let offset = (self.0.wrapping_sub(start) as i64 as i128).rem_euclid(len);
        Phase(start + offset as u64)
    }

    /// Integer sample index, fraction discarded.
    #[inline(always)]
    pub fn index_floor(self) -> u32 {
        (self.0 >> FRACT_BITS) as u32
    }

    /// Nearest sample index (ties round up).
    #[inline(always)]
    pub fn index_rounded(self) -> u32 {
        (self.0.wrapping_add(Self::HALF.0) >> FRACT_BITS) as u32
    }

    /// Raw 32-bit fraction.
    #[inline(always)]
    pub fn fract(self) -> u32 {
        (self.0 & FRACT_MASK) as u32
    }

    /// Coefficient table row for the fractional part, `0..TABLE_ROWS`.
    #[inline(always)]
    pub fn fractional_row(self) -> usize {
        (self.fract() >> (FRACT_BITS - TABLE_ROW_BITS)) as usize
    }

    /// Position as a float, in samples.
    pub fn to_f64(self) -> f64 {
        self.index_floor() as f64 + self.fract() as f64 / FRACT_SCALE
    }
}

impl Add for Phase {
    type Output = Phase;

    fn add(mut self, rhs: Phase) -> Phase {
        self.advance(rhs);
        self
    }
}

impl Sub for Phase {
    type Output = Phase;

    fn sub(mut self, rhs: Phase) -> Phase {
        self.retreat(rhs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_index_has_no_fraction() {
        let p = Phase::from_index(42);
        assert_eq!(p.index_floor(), 42);
        assert_eq!(p.fract(), 0);
        assert_eq!(p.fractional_row(), 0);
    }

    #[test]
    fn from_ratio_splits_integer_and_fraction() {
        let p = Phase::from_ratio(2.5);
        assert_eq!(p.index_floor(), 2);
        assert_eq!(p.fract(), 1 << 31);
        assert_eq!(p.fractional_row(), 128);
    }

    #[test]
    fn from_ratio_unity_is_one_sample() {
        assert_eq!(Phase::from_ratio(1.0), Phase::ONE);
    }

    #[test]
    fn from_ratio_rejects_negative_and_nan() {
        assert_eq!(Phase::from_ratio(-1.0), Phase::ZERO);
        assert_eq!(Phase::from_ratio(f32::NAN), Phase::ZERO);
    }

    #[test]
    fn advance_carries_fraction_into_index() {
        let mut p = Phase::from_ratio(0.75);
        p.advance(Phase::from_ratio(0.5));
        assert_eq!(p.index_floor(), 1);
        assert_eq!(p.fract(), 1 << 30);
    }

    #[test]
    fn many_small_steps_do_not_drift() {
        let incr = Phase::from_ratio(0.25);
        let mut p = Phase::ZERO;
        for _ in 0..4_000_000 {
            p.advance(incr);
        }
        assert_eq!(p, Phase::from_index(1_000_000));
    }

    #[test]
    fn retreat_undoes_advance() {
        let start = Phase::from_ratio(3.125);
        let mut p = start;
        p.advance(Phase::HALF);
        p.retreat(Phase::HALF);
        assert_eq!(p, start);
    }

    #[test]
    fn subtract_index_keeps_fraction() {
        let mut p = Phase::from_index(9) + Phase::from_ratio(0.375);
        p.subtract_index(4);
        assert_eq!(p.index_floor(), 5);
        assert_eq!(p.fract(), Phase::from_ratio(0.375).fract());
    }

    #[test]
    fn wrap_into_folds_several_loops_at_once() {
        let quarter = Phase::from_ratio(0.25);
        assert_eq!(Phase::from_index(9).wrap_into(2, 6), Phase::from_index(5));
        assert_eq!((Phase::from_index(42) + quarter).wrap_into(0, 4), Phase::from_index(2) + quarter);
        assert_eq!((Phase::from_index(3) + Phase::HALF).wrap_into(0, 4), Phase::from_index(3) + Phase::HALF);
    }

    #[test]
    fn wrap_into_lifts_a_phase_wrapped_below_zero() {
        let below_zero = Phase::ZERO - Phase::from_ratio(0.25);
        assert_eq!(below_zero.wrap_into(0, 4), Phase::from_ratio(3.75));
    }

    #[test]
    fn wrap_into_ignores_empty_loop() {
        let p = Phase::from_index(7);
        assert_eq!(p.wrap_into(3, 3), p);
    }

    #[test]
    fn from_ratio_saturates_huge_ratios() {
        assert_eq!(Phase::from_ratio(1e12).index_floor(), u32::MAX);
    }

    #[test]
    fn index_rounded_rounds_half_up() {
        assert_eq!(Phase::from_ratio(1.49).index_rounded(), 1);
        assert_eq!(Phase::from_ratio(1.5).index_rounded(), 2);
        assert_eq!(Phase::from_ratio(1.75).index_floor(), 1);
    }

    #[test]
    fn fractional_row_uses_top_fraction_bits() {
        assert_eq!(Phase::from_ratio(0.999).fractional_row(), TABLE_ROWS - 1);
        assert_eq!(Phase::from_ratio(0.25).fractional_row(), 64);
    }

    #[test]
    fn to_f64_round_trips_simple_values() {
        assert!((Phase::from_ratio(7.625).to_f64() - 7.625).abs() < 1e-9);
    }
}
