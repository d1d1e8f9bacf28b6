//! Core types for the sampvox voice renderer.
//!
//! Defines the waveform sample store and the fixed-point phase type shared
//! by every interpolation kernel.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod phase;
mod sample;

pub use phase::{Phase, TABLE_ROWS, TABLE_ROW_BITS};
pub use sample::{SampleBank, SampleData, SampleError, SampleKey, SampleRange, WaveformSample};
