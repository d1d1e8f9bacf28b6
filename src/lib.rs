//! sampvox - per-voice sample playback core.
//!
//! Renders a stored waveform into 64-sample output blocks at any pitch,
//! with nearest, linear, cubic or 7-point sinc interpolation, loop handling,
//! an amplitude ramp and two cascaded filters per voice.
//!
//! ```
//! use sampvox::{LoopMode, SampleBank, SampleData, VoiceDsp, WaveformSample, BLOCK_SIZE};
//!
//! let data = SampleData::from_i16((0..256).map(|i| (i % 32) * 1000).collect());
//! let sample = WaveformSample::new("saw", data).with_loop(0, 256).unwrap();
//! let range = sample.range();
//!
//! let mut bank = SampleBank::with_key();
//! let key = bank.insert(sample);
//!
//! let mut voice = VoiceDsp::new(key, range);
//! voice.loop_mode = LoopMode::Looped;
//! voice.pitch_ratio = 1.5;
//!
//! let mut block = [0.0; BLOCK_SIZE];
//! assert_eq!(voice.write(&bank, &mut block), BLOCK_SIZE);
//! ```

pub use sv_engine::{
    cents_to_ratio, init_tables, pitch_ratio, root_cents, tables, Block, FilterKind, IirFilter, InterpError,
    InterpMethod, InterpTables, LoopMode, VoiceDsp, VoiceFilter, BLOCK_SIZE, MAX_PITCH_RATIO, SINC_TAPS,
};
pub use sv_ir::{Phase, SampleBank, SampleData, SampleError, SampleKey, SampleRange, WaveformSample};
