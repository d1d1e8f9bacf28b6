//! Waveform sample data.

use alloc::vec::Vec;
use arrayvec::ArrayString;
use thiserror::Error;

slotmap::new_key_type! {
    /// Key for referencing samples in a [`SampleBank`].
    pub struct SampleKey;
}

/// Owns all loaded waveforms. Voices hold a [`SampleKey`] into it.
pub type SampleBank = slotmap::SlotMap<SampleKey, WaveformSample>;

/// Scale from the 24-bit composite value back to 16-bit units.
const LSB_SCALE: f32 = 1.0 / 256.0;

/// Errors raised while building or validating a sample.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SampleError {
    /// No sample frames at all.
    #[error("sample has no data")]
    Empty,
    /// The 24-bit extension does not cover the same frames as the 16-bit data.
    #[error("low-byte extension has {lsb} frames, expected {msb}")]
    ExtensionLength { msb: usize, lsb: usize },
    /// More frames than a 32-bit phase index can address.
    #[error("sample has {0} frames, more than a phase index can address")]
    TooLong(usize),
    /// Playback range reversed or outside the data.
    #[error("playback range {start}..={end} does not fit {len} frames")]
    RangeOutOfBounds { start: u32, end: u32, len: usize },
    /// Loop with no frames in it.
    #[error("loop {loop_start}..{loop_end} is empty or reversed")]
    EmptyLoop { loop_start: u32, loop_end: u32 },
    /// Loop reaching past the playable range.
    #[error("loop end {loop_end} lies beyond playback end {end} + 1")]
    LoopOutOfBounds { loop_end: u32, end: u32 },
}

/// Raw PCM frames: 16-bit words with an optional low byte for 24-bit depth.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleData {
    msb: Vec<i16>,
    lsb: Option<Vec<u8>>,
}

impl SampleData {
    /// Plain 16-bit data.
    pub fn from_i16(msb: Vec<i16>) -> Self {
        Self { msb, lsb: None }
    }

    /// 16-bit data extended with a low byte per frame.
    pub fn with_extension(msb: Vec<i16>, lsb: Vec<u8>) -> Result<Self, SampleError> {
        if msb.len() != lsb.len() {
            return Err(SampleError::ExtensionLength {
                msb: msb.len(),
                lsb: lsb.len(),
            });
        }
        Ok(Self { msb, lsb: Some(lsb) })
    }

    /// Split signed 24-bit values into word and low byte.
    pub fn from_i24(values: &[i32]) -> Self {
        let msb = values.iter().map(|&v| (v >> 8) as i16).collect();
        let lsb = values.iter().map(|&v| (v & 0xFF) as u8).collect();
        Self { msb, lsb: Some(lsb) }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.msb.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.msb.is_empty()
    }

    /// Returns true if a 24-bit low byte is present.
    pub fn has_extension(&self) -> bool {
        self.lsb.is_some()
    }

    /// Signed 24-bit composite value at `idx`.
    #[inline(always)]
    pub fn get_i24(&self, idx: usize) -> i32 {
        let msb = self.msb[idx] as i32;
        let lsb = match &self.lsb {
            Some(lsb) => lsb[idx] as i32,
            None => 0,
        };
        (msb << 8) | lsb
    }

    /// Value at `idx` in 16-bit units, with the low byte as fraction.
    #[inline(always)]
    pub fn get(&self, idx: usize) -> f32 {
        self.get_i24(idx) as f32 * LSB_SCALE
    }
}

/// Playback indices of a voice: `start..=end` is playable,
/// `loop_start..loop_end` repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleRange {
    /// First playable frame.
    pub start: u32,
    /// Last playable frame (inclusive).
    pub end: u32,
    /// First frame of the loop.
    pub loop_start: u32,
    /// One past the last frame of the loop.
    pub loop_end: u32,
}

impl SampleRange {
    /// Frames in the loop; zero if reversed.
    pub fn loop_len(&self) -> u32 {
        self.loop_end.saturating_sub(self.loop_start)
    }
}

/// A recorded waveform with its playback and loop points.
#[derive(Clone, Debug)]
pub struct WaveformSample {
    /// Sample name
    pub name: ArrayString<20>,
    /// Audio data
    pub data: SampleData,
    /// First playable frame
    pub start: u32,
    /// Last playable frame (inclusive)
    pub end: u32,
    /// Loop start frame
    pub loop_start: u32,
    /// Loop end frame (exclusive)
    pub loop_end: u32,
    /// Rate the sample was recorded at, in Hz
    pub sample_rate: u32,
    /// MIDI key at which the sample plays at its recorded pitch
    pub root_key: u8,
    /// Tuning correction in cents
    pub pitch_correction: i8,
}

impl Default for WaveformSample {
    fn default() -> Self {
        Self {
            name: ArrayString::new(),
            data: SampleData::default(),
            start: 0,
            end: 0,
            loop_start: 0,
            loop_end: 0,
            sample_rate: 44100,
            root_key: 60,
            pitch_correction: 0,
        }
    }
}

impl WaveformSample {
    /// Sample playing all of `data`, with a loop over all of it.
    pub fn new(name: &str, data: SampleData) -> Self {
        let frames = data.len() as u32;
        let mut sample = Self {
            data,
            end: frames.saturating_sub(1),
            loop_end: frames,
            ..Self::default()
        };
        let _ = sample.name.try_push_str(name);
        sample
    }

    /// Restrict playback to `start..=end`.
    pub fn with_bounds(mut self, start: u32, end: u32) -> Result<Self, SampleError> {
        self.start = start;
        self.end = end;
        if start <= end {
            self.loop_start = self.loop_start.clamp(start, end);
            self.loop_end = self.loop_end.clamp(self.loop_start + 1, end + 1);
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the loop to `loop_start..loop_end`.
    pub fn with_loop(mut self, loop_start: u32, loop_end: u32) -> Result<Self, SampleError> {
        self.loop_start = loop_start;
        self.loop_end = loop_end;
        self.validate()?;
        Ok(self)
    }

    /// Set recording rate, root key and fine tuning.
    pub fn with_tuning(mut self, sample_rate: u32, root_key: u8, pitch_correction: i8) -> Self {
        self.sample_rate = sample_rate;
        self.root_key = root_key;
        self.pitch_correction = pitch_correction;
        self
    }

    /// Number of frames of data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sample has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at frame `idx`, in 16-bit units.
    #[inline(always)]
    pub fn value(&self, idx: u32) -> f32 {
        self.data.get(idx as usize)
    }

    /// Playback indices a new voice starts from.
    pub fn range(&self) -> SampleRange {
        SampleRange {
            start: self.start,
            end: self.end,
            loop_start: self.loop_start,
            loop_end: self.loop_end,
        }
    }

    /// Check that the playback and loop points fit the data.
    pub fn validate(&self) -> Result<(), SampleError> {
        let len = self.data.len();
        if len == 0 {
            return Err(SampleError::Empty);
        }
        if len > u32::MAX as usize {
            return Err(SampleError::TooLong(len));
        }
        if self.start > self.end || self.end as usize >= len {
            return Err(SampleError::RangeOutOfBounds {
                start: self.start,
                end: self.end,
                len,
            });
        }
        if self.loop_start >= self.loop_end {
            return Err(SampleError::EmptyLoop {
                loop_start: self.loop_start,
                loop_end: self.loop_end,
            });
        }
        if self.loop_end > self.end + 1 {
            return Err(SampleError::LoopOutOfBounds {
                loop_end: self.loop_end,
                end: self.end,
            });
        }
        Ok(())
    }
}
