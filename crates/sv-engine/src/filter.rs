//! Resonant voice filters.
//!
//! Every voice owns two filters, a primary resonant one and an auxiliary
//! custom one, applied in that order to each interpolated sample before
//! the amplitude ramp. The renderer only knows the [`VoiceFilter`]
//! contract; [`IirFilter`] is the biquad used by default.

use core::f32::consts::TAU;

/// Filter contract seen by the renderer.
pub trait VoiceFilter: Send {
    /// Filter `buf` in place. `output_rate` is the rate `buf` plays at, in Hz.
    ///
    /// State carries over between calls, so calling once per sample must
    /// give the same result as calling once per block.
    fn apply(&mut self, buf: &mut [f32], output_rate: f32);
}

/// Response of an [`IirFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterKind {
    /// Pass-through.
    #[default]
    Disabled,
    /// Two-pole low-pass.
    LowPass,
    /// Two-pole high-pass.
    HighPass,
}

const DEFAULT_CUTOFF_HZ: f32 = 8000.0;
const MIN_CUTOFF_HZ: f32 = 5.0;
/// Highest cutoff as a fraction of the output rate.
const MAX_CUTOFF_RATIO: f32 = 0.45;
const MAX_Q_DB: f32 = 96.0;

#[derive(Clone, Copy, Debug, Default)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

/// Biquad resonant filter (transposed direct form II).
#[derive(Clone, Debug)]
pub struct IirFilter {
    kind: FilterKind,
    cutoff_hz: f32,
    q_db: f32,
    coeffs: Biquad,
    z1: f32,
    z2: f32,
    /// Output rate the coefficients were computed for; zero forces a recompute.
    coeff_rate: f32,
}

impl Default for IirFilter {
    fn default() -> Self {
        Self::new(FilterKind::Disabled)
    }
}

impl IirFilter {
    /// Filter of the given kind at the default cutoff, with a flat Q.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            q_db: 0.0,
            coeffs: Biquad::default(),
            z1: 0.0,
            z2: 0.0,
            coeff_rate: 0.0,
        }
    }

    /// Low-pass at `cutoff_hz` with `q_db` of resonance.
    pub fn lowpass(cutoff_hz: f32, q_db: f32) -> Self {
        let mut f = Self::new(FilterKind::LowPass);
        f.set_cutoff(cutoff_hz);
        f.set_q(q_db);
        f
    }

    /// High-pass at `cutoff_hz` with `q_db` of resonance.
    pub fn highpass(cutoff_hz: f32, q_db: f32) -> Self {
        let mut f = Self::new(FilterKind::HighPass);
        f.set_cutoff(cutoff_hz);
        f.set_q(q_db);
        f
    }

    /// Current response type.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Change the response type; coefficients are rebuilt on the next sample.
    pub fn set_kind(&mut self, kind: FilterKind) {
        if kind != self.kind {
            self.kind = kind;
            self.coeff_rate = 0.0;
        }
    }

    /// Cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Set the cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.max(MIN_CUTOFF_HZ);
        self.coeff_rate = 0.0;
    }

    /// Set the resonance peak height in dB (0 = Q of 1).
    pub fn set_q(&mut self, q_db: f32) {
        self.q_db = q_db.clamp(0.0, MAX_Q_DB);
        self.coeff_rate = 0.0;
    }

    /// Clear the filter history.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    fn recompute(&mut self, output_rate: f32) {
        let cutoff = self.cutoff_hz.min(output_rate * MAX_CUTOFF_RATIO);
        let w0 = TAU * cutoff / output_rate;
        let cos_w0 = libm::cosf(w0);
        let q = libm::powf(10.0, self.q_db / 20.0);
        let alpha = libm::sinf(w0) / (2.0 * q);
        let a0 = 1.0 + alpha;

        let (b0, b1) = match self.kind {
            FilterKind::HighPass => ((1.0 + cos_w0) * 0.5, -(1.0 + cos_w0)),
            _ => ((1.0 - cos_w0) * 0.5, 1.0 - cos_w0),
        };
        self.coeffs = Biquad {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        };
        self.coeff_rate = output_rate;
    }
}

impl VoiceFilter for IirFilter {
    fn apply(&mut self, buf: &mut [f32], output_rate: f32) {
        if self.kind == FilterKind::Disabled {
            return;
        }
        debug_assert!(output_rate > 0.0, "output rate must be positive");
        if self.coeff_rate != output_rate {
            self.recompute(output_rate);
        }

        let Biquad { b0, b1, b2, a1, a2 } = self.coeffs;
        let mut z1 = self.z1;
        let mut z2 = self.z2;
        for s in buf.iter_mut() {
            let x = *s;
            let y = b0 * x + z1;
            z1 = b1 * x - a1 * y + z2;
            z2 = b2 * x - a2 * y;
            *s = y;
        }
        self.z1 = z1;
        self.z2 = z2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 44100.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len).map(|i| libm::sinf(TAU * freq * i as f32 / RATE)).collect()
    }

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    #[test]
    fn disabled_is_passthrough() {
        let mut f = IirFilter::default();
        let mut buf = vec![0.25, -1.0, 3.0];
        f.apply(&mut buf, RATE);
        assert_eq!(buf, vec![0.25, -1.0, 3.0]);
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = IirFilter::lowpass(1000.0, 0.0);
        let mut buf = vec![0.5f32; 400];
        f.apply(&mut buf, RATE);
        let last = buf[buf.len() - 1];
        assert!((last - 0.5).abs() < 0.01, "DC should pass through, got {}", last);
    }

    #[test]
    fn lowpass_attenuates_nyquist() {
        let mut f = IirFilter::lowpass(1000.0, 0.0);
        let mut buf: Vec<f32> = (0..400).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        f.apply(&mut buf, RATE);
        let tail = peak(&buf[200..]);
        assert!(tail < 0.05, "peak should be attenuated, got {}", tail);
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut f = IirFilter::highpass(1000.0, 0.0);
        let mut buf = vec![1.0f32; 400];
        f.apply(&mut buf, RATE);
        assert!(buf[399].abs() < 0.01, "DC should be blocked, got {}", buf[399]);
    }

    #[test]
    fn resonance_boosts_cutoff() {
        let mut flat = IirFilter::lowpass(1000.0, 0.0);
        let mut resonant = IirFilter::lowpass(1000.0, 12.0);
        let mut a = sine(1000.0, 4096);
        let mut b = a.clone();
        flat.apply(&mut a, RATE);
        resonant.apply(&mut b, RATE);
        let (pa, pb) = (peak(&a[1024..]), peak(&b[1024..]));
        assert!(pb > pa * 2.0, "resonant={} flat={}", pb, pa);
    }

    #[test]
    fn state_carries_across_calls() {
        let input = sine(440.0, 128);
        let mut whole = input.clone();
        IirFilter::lowpass(2000.0, 6.0).apply(&mut whole, RATE);

        let mut split = input;
        let mut f = IirFilter::lowpass(2000.0, 6.0);
        for s in split.iter_mut() {
            f.apply(core::slice::from_mut(s), RATE);
        }
        assert_eq!(whole, split);
    }

    #[test]
    fn coefficients_follow_output_rate() {
        let mut f = IirFilter::lowpass(1000.0, 0.0);
        f.apply(&mut [0.0], RATE);
        assert_eq!(f.coeff_rate, RATE);
        f.apply(&mut [0.0], 22050.0);
        assert_eq!(f.coeff_rate, 22050.0);
    }

    #[test]
    fn setters_clamp() {
        let mut f = IirFilter::lowpass(0.0, -3.0);
        assert_eq!(f.cutoff(), MIN_CUTOFF_HZ);
        assert_eq!(f.q_db, 0.0);
        f.set_q(500.0);
        assert_eq!(f.q_db, MAX_Q_DB);
    }

    #[test]
    fn reset_clears_history() {
        let mut f = IirFilter::lowpass(1000.0, 0.0);
        let mut buf = vec![1.0; 20];
        f.apply(&mut buf, RATE);
        assert!(f.z1 != 0.0);

        f.reset();
        assert_eq!(f.z1, 0.0);
        assert_eq!(f.z2, 0.0);
    }
}
