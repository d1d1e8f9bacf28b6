//! Voice renderer for sampvox.
//!
//! Turns a waveform, a fixed-point playback phase and a pitch ratio into
//! blocks of filtered, amplitude-ramped output samples, with loop handling
//! and selectable interpolation.

mod filter;
mod frequency;
mod interp;
mod tables;
mod voice;

pub use filter::{FilterKind, IirFilter, VoiceFilter};
pub use frequency::{cents_to_ratio, pitch_ratio, root_cents};
pub use interp::{InterpError, InterpMethod};
pub use tables::{init_tables, tables, InterpTables, SINC_TAPS};
pub use voice::{LoopMode, VoiceDsp, MAX_PITCH_RATIO};

/// Samples produced by one render call.
pub const BLOCK_SIZE: usize = 64;

/// One block of mono output.
pub type Block = [f32; BLOCK_SIZE];
