//! beatforge-export - Turns a sequencer project into downloadable files.
//!
//! This library encodes tracks of step-positioned notes into a Standard MIDI
//! File, synthesizes them into a WAV master mix or per-track stems, and
//! packages the results for a host to save.

pub mod audio;
pub mod error;
pub mod instrument;
pub mod midi;
pub mod package;

// Re-export commonly used types
pub use audio::{export_master_mix, render_master_mix, render_stems, AudioBuffer, Stem};
pub use error::ExportError;
pub use instrument::InstrumentTable;
pub use midi::{encode_midi, ExportOptions, Note, Project, Track, TrackId, TICKS_PER_BEAT};
