//! Planar floating-point audio buffers.

/// Peak level targeted by normalization (5% headroom).
pub const NORMALIZE_CEILING: f32 = 0.95;

/// Multi-channel audio held as one `Vec<f32>` per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Creates a silent buffer.
    ///
    /// # Arguments
    ///
    /// * `channel_count` - Number of channels (at least one is allocated)
    /// * `frames` - Samples per channel
    /// * `sample_rate` - Sample rate in Hz
    pub fn silent(channel_count: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frames]; channel_count.max(1)],
        }
    }

    /// Wraps existing channel data. Channels are truncated to the shortest one.
    pub fn from_channels(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        if channels.is_empty() {
            channels.push(Vec::new());
        }
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(frames);
        }
        Self {
            sample_rate,
            channels,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Adds a mono signal to every channel starting at frame `offset`.
    /// Samples running past the end of the buffer are dropped.
    pub fn add_mono(&mut self, offset: usize, samples: &[f64]) {
        for channel in &mut self.channels {
            let Some(dest) = channel.get_mut(offset..) else {
                continue;
            };
            for (out, &sample) in dest.iter_mut().zip(samples) {
                *out += sample as f32;
            }
        }
    }

    /// Sums `other`, scaled by `gain`, into this buffer.
    ///
    /// A mono source is spread over every channel; otherwise channels are
    /// matched by index. The overlap is limited to the shorter buffer.
    pub fn mix_in(&mut self, other: &AudioBuffer, gain: f32) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let source = if other.channels.len() == 1 {
                &other.channels[0]
            } else {
                match other.channels.get(index) {
                    Some(source) => source,
                    None => continue,
                }
            };
            for (out, &sample) in channel.iter_mut().zip(source) {
                *out += sample * gain;
            }
        }
    }

    /// Largest absolute sample value over all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Root-mean-square level over all channels.
    pub fn rms(&self) -> f64 {
        let count = self.channels.iter().map(Vec::len).sum::<usize>();
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .channels
            .iter()
            .flatten()
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        (sum / count as f64).sqrt()
    }

    /// Scales the whole buffer so its peak sits at [`NORMALIZE_CEILING`].
    ///
    /// Silent buffers are left untouched. Returns the gain that was applied.
    pub fn normalize(&mut self) -> f32 {
        let peak = self.peak();
        if peak <= 0.0 {
            return 1.0;
        }
        let gain = NORMALIZE_CEILING / peak;
        for sample in self.channels.iter_mut().flatten() {
            *sample *= gain;
        }
        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_buffer() {
        let buf = AudioBuffer::silent(2, 100, 44100);
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frames(), 100);
        assert_eq!(buf.peak(), 0.0);
        assert_eq!(buf.rms(), 0.0);

        let empty = AudioBuffer::silent(0, 0, 44100);
        assert_eq!(empty.channel_count(), 1);
        assert_eq!(empty.frames(), 0);
    }

    #[test]
    fn test_add_mono_clips_at_end() {
        let mut buf = AudioBuffer::silent(2, 4, 8);
        buf.add_mono(2, &[0.5, 0.5, 0.5]);
        assert_eq!(buf.channel(0), &[0.0, 0.0, 0.5, 0.5]);
        assert_eq!(buf.channel(1), &[0.0, 0.0, 0.5, 0.5]);

        buf.add_mono(10, &[1.0]);
        assert_eq!(buf.peak(), 0.5);
    }

    #[test]
    fn test_mix_in_with_gain() {
        let mut master = AudioBuffer::silent(2, 4, 8);
        let track = AudioBuffer::from_channels(vec![vec![1.0, -1.0]], 8);
        master.mix_in(&track, 0.5);
        master.mix_in(&track, 0.5);
        assert_eq!(master.channel(0), &[1.0, -1.0, 0.0, 0.0]);
        assert_eq!(master.channel(1), &[1.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize() {
        let mut buf = AudioBuffer::from_channels(vec![vec![0.1, -0.2], vec![0.05, 0.0]], 8);
        let gain = buf.normalize();
        assert!((gain - 4.75).abs() < 1e-5);
        assert!((buf.peak() - NORMALIZE_CEILING).abs() < 1e-6);
        assert!((buf.channel(0)[0] - 0.475).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_idempotent() {
        let mut buf = AudioBuffer::from_channels(vec![vec![0.3, -0.6, 0.2]], 8);
        buf.normalize();
        let first = buf.clone();
        let gain = buf.normalize();
        assert!((gain - 1.0).abs() < 1e-6);
        for (a, b) in first.channel(0).iter().zip(buf.channel(0)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalize_silence_untouched() {
        let mut buf = AudioBuffer::silent(2, 16, 8);
        assert_eq!(buf.normalize(), 1.0);
        assert_eq!(buf.peak(), 0.0);
    }

    #[test]
    fn test_rms() {
        let buf = AudioBuffer::from_channels(vec![vec![1.0, -1.0, 1.0, -1.0]], 8);
        assert!((buf.rms() - 1.0).abs() < 1e-12);
    }
}
