//! Offline audio rendering and WAV export.
//!
//! This module turns tracks into PCM audio without any audio device:
//! - Oscillator voices (sine, square, sawtooth, triangle) per instrument
//! - A fixed ADSR envelope per note
//! - Per-track stems and a volume-weighted master mix
//! - Peak normalization and 16-bit WAV serialization

pub mod buffer;
pub mod envelope;
pub mod export;
pub mod oscillator;
pub mod render;

pub use buffer::AudioBuffer;
pub use envelope::Envelope;
pub use export::{encode_wav, export_to_wav, float_to_pcm16};
pub use oscillator::Waveform;
pub use render::{
    export_master_mix, render_master_mix, render_master_mix_with, render_stems,
    render_stems_with, render_track, Stem,
};
