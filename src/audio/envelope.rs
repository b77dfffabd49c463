//! ADSR amplitude envelope.
//!
//! The envelope is evaluated per sample from the absolute sample index within
//! a note, against fixed attack, decay and release lengths. Phases are
//! checked in order (attack, decay, release window, sustain) and the first
//! matching phase decides the gain. A note shorter than attack + decay never
//! reaches its release window and simply stops where the note ends.

/// Attack time in seconds.
pub const ATTACK_SECONDS: f64 = 0.01;
/// Decay time in seconds.
pub const DECAY_SECONDS: f64 = 0.1;
/// Sustain level (0.0 to 1.0).
pub const SUSTAIN_LEVEL: f64 = 0.7;
/// Release time in seconds.
pub const RELEASE_SECONDS: f64 = 0.1;

/// ADSR envelope with lengths resolved to samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    attack: usize,
    decay: usize,
    release: usize,
    sustain: f64,
}

impl Envelope {
    /// The fixed note envelope at a given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        let to_samples = |seconds: f64| (seconds * sample_rate as f64).round() as usize;
        Self {
            attack: to_samples(ATTACK_SECONDS),
            decay: to_samples(DECAY_SECONDS),
            release: to_samples(RELEASE_SECONDS),
            sustain: SUSTAIN_LEVEL,
        }
    }

    /// Attack length in samples.
    pub fn attack_samples(&self) -> usize {
        self.attack
    }

    /// Decay length in samples.
    pub fn decay_samples(&self) -> usize {
        self.decay
    }

    /// Release length in samples.
    pub fn release_samples(&self) -> usize {
        self.release
    }

    /// Gain at sample `index` of a note lasting `length` samples.
    pub fn gain(&self, index: usize, length: usize) -> f64 {
        let release_start = length.saturating_sub(self.release);

        if index < self.attack {
            index as f64 / self.attack as f64
        } else if index < self.attack + self.decay {
            let progress = (index - self.attack) as f64 / self.decay as f64;
            1.0 - (1.0 - self.sustain) * progress
        } else if index >= release_start {
            let progress = (index - release_start) as f64 / self.release.max(1) as f64;
            self.sustain * (1.0 - progress)
        } else {
            self.sustain
        }
    }

    /// Multiplies `samples` (one whole note) by the envelope in place.
    pub fn apply(&self, samples: &mut [f64]) {
        let length = samples.len();
        for (index, sample) in samples.iter_mut().enumerate() {
            *sample *= self.gain(index, length);
        }
    }
}
