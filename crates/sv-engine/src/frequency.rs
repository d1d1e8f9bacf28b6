//! Pitch conversion for sample playback.
//!
//! Pitches are absolute cents (MIDI key × 100). The result is the floating
//! pitch ratio a [`VoiceDsp`](crate::VoiceDsp) derives its phase increment
//! from: sample frames consumed per output frame.

use sv_ir::WaveformSample;

const CENTS_PER_OCTAVE: f64 = 1200.0;
const CENTS_PER_KEY: f64 = 100.0;

/// Frequency ratio of an interval in cents.
pub fn cents_to_ratio(cents: f32) -> f32 {
    libm::exp2(cents as f64 / CENTS_PER_OCTAVE) as f32
}

/// Absolute pitch, in cents, at which `sample` plays back unchanged.
pub fn root_cents(sample: &WaveformSample) -> f32 {
    (sample.root_key as f64 * CENTS_PER_KEY - sample.pitch_correction as f64) as f32
}

/// Pitch ratio that plays `sample` at `note_cents` on an output running at
/// `output_rate` Hz. Returns 0 for a non-positive output rate.
pub fn pitch_ratio(note_cents: f32, sample: &WaveformSample, output_rate: f32) -> f32 {
    if output_rate <= 0.0 {
        return 0.0;
    }
    let interval = note_cents as f64 - root_cents(sample) as f64;
    let ratio = libm::exp2(interval / CENTS_PER_OCTAVE) * sample.sample_rate as f64 / output_rate as f64;
    ratio as f32
}
