//! 16-bit PCM RIFF/WAVE encoding
//!
//! The whole file is produced in memory: a 44-byte header followed by the
//! mono sample data. Output sizes are fixed up front by [`WavLayout`], so a
//! render allocates once and never fails.

use tracing::debug;

use crate::error::{Result, SynthError};
use crate::generator::SignalGenerator;
use crate::units::{BlockSize, SampleRate, Seconds};

pub const HEADER_LEN: usize = 44;

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = (BITS_PER_SAMPLE / 8) as usize;
const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Sizes of a mono 16-bit PCM file covering a duration in whole blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavLayout {
    rate: SampleRate,
    block: BlockSize,
    sample_count: usize,
    byte_rate: u32,
}

impl WavLayout {
    /// Round `duration` up to a whole number of blocks.
    ///
    /// Fails when the file would not fit the 32-bit RIFF size field, or the
    /// byte rate would not fit its 32-bit header field.
    ///
    /// # Arguments
    /// * `rate` - Sample rate written to the header
    /// * `duration` - Requested length; rounded up to whole blocks
    /// * `block` - Samples per rendered block
    pub fn new(rate: SampleRate, duration: Seconds, block: BlockSize) -> Result<Self> {
        let samples = duration.to_samples(rate) as u64;
        let block_len = block.samples() as u64;
        let sample_count = samples.div_ceil(block_len) * block_len;

        let total = HEADER_LEN as u64 + sample_count * BYTES_PER_SAMPLE as u64;
        if total > u32::MAX as u64 {
            return Err(SynthError::configuration(format!(
                "{} s at {} Hz does not fit in a wav file",
                duration.value(),
                rate.hz()
            )));
        }

        let byte_rate = rate
            .hz()
            .checked_mul(NUM_CHANNELS as u32 * BYTES_PER_SAMPLE as u32)
            .ok_or_else(|| {
                SynthError::configuration(format!(
                    "sample rate {} Hz is too high for a 16-bit wav header",
                    rate.hz()
                ))
            })?;

        Ok(Self {
            rate,
            block,
            sample_count: sample_count as usize,
            byte_rate,
        })
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.rate
    }

    pub fn block_size(&self) -> BlockSize {
        self.block
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn data_len(&self) -> usize {
        self.sample_count * BYTES_PER_SAMPLE
    }

    pub fn total_len(&self) -> usize {
        HEADER_LEN + self.data_len()
    }

    /// Render `source` block by block into a complete wav file.
    pub fn render<S: SignalGenerator + ?Sized>(&self, source: &mut S) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_len());
        self.write_header(&mut bytes);

        let mut block = vec![0.0f32; self.block.samples()];
        for _ in 0..self.sample_count / self.block.samples() {
            source.render(&mut block);
            for &sample in &block {
                bytes.extend_from_slice(&to_pcm16(sample).to_le_bytes());
            }
        }

        debug!(
            samples = self.sample_count,
            bytes = bytes.len(),
            "rendered wav"
        );
        bytes
    }

    fn write_header(&self, bytes: &mut Vec<u8>) {
        // Sizes were checked against u32::MAX in new().
        let data_len = self.data_len() as u32;
        let block_align = NUM_CHANNELS * BYTES_PER_SAMPLE as u16;

        // RIFF chunk
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(self.total_len() as u32 - 8).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        // fmt subchunk
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        bytes.extend_from_slice(&PCM_FORMAT.to_le_bytes());
        bytes.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
        bytes.extend_from_slice(&self.rate.hz().to_le_bytes());
        bytes.extend_from_slice(&self.byte_rate.to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data subchunk
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
    }
}

/// Clamp to [-1, 1] and scale by 32767, truncating toward zero.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
