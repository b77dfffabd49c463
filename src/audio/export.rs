//! WAV serialization.
//!
//! Buffers are written as canonical 16-bit PCM: a 44-byte RIFF header
//! followed by interleaved little-endian samples.

use super::buffer::AudioBuffer;
use crate::error::ExportError;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Size of the canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

/// Bit depth of every exported file.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Converts a float sample to signed 16-bit PCM.
///
/// The sample is clamped to [-1, 1]; negative values scale by 32768 and the
/// rest by 32767, so both ends of the range map onto `i16::MIN` and
/// `i16::MAX`. Fractions truncate toward zero.
#[inline]
pub fn float_to_pcm16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Serializes a buffer to WAV file bytes.
///
/// # Errors
///
/// Returns an error if the WAV encoder rejects the buffer layout (for
/// example more than 65535 channels).
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, ExportError> {
    let channels = buffer.channel_count();
    let frames = buffer.frames();
    let spec = WavSpec {
        channels: u16::try_from(channels)
            .map_err(|_| ExportError::UnsupportedLayout { channels })?,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let capacity = WAV_HEADER_LEN + frames * channels * (BITS_PER_SAMPLE as usize / 8);
    let mut cursor = Cursor::new(Vec::with_capacity(capacity));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for frame in 0..frames {
            for channel in buffer.channels() {
                writer.write_sample(float_to_pcm16(channel[frame]))?;
            }
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Serializes a buffer and writes it to a WAV file.
///
/// # Errors
///
/// Returns error if encoding fails or the file cannot be written
pub fn export_to_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<(), ExportError> {
    let bytes = encode_wav(buffer)?;
    fs::write(path.as_ref(), bytes)?;
    tracing::info!("Wrote WAV file {}", path.as_ref().display());
    Ok(())
}
