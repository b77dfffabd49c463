//! Note/track model and MIDI export.
//!
//! This module holds the snapshot types handed over by the editor (notes,
//! tracks, export options) together with the pitch and timing conversions
//! shared by the MIDI encoder and the audio renderer.
//!
//! Positions are expressed in grid steps: 4 steps make one quarter note, so
//! the grid has 16th-note resolution.

mod midi_export;
mod note;
mod project;
mod track;

pub use midi_export::{encode_midi, encode_midi_with, export_to_midi, read_vlq, write_vlq};
pub use note::Note;
pub use project::{ExportOptions, Project, TimeSignature};
pub use track::{playable_tracks, Track, TrackId};

/// Standard MIDI note names for display purposes.
/// Maps MIDI note number (0-127) to note name within an octave.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Ticks per beat (quarter note). Fixed for every exported file.
pub const TICKS_PER_BEAT: u32 = 480;

/// Grid steps per beat (16th-note grid).
pub const STEPS_PER_BEAT: f64 = 4.0;

/// Default tempo in beats per minute.
pub const DEFAULT_BPM: f64 = 120.0;

/// Length of the tempo track, in steps, before its end-of-track event.
pub const TEMPO_TRACK_STEPS: f64 = 64.0;

/// Semitone offset used when a pitch name is not recognised.
pub const FALLBACK_SEMITONE: u8 = 0;

/// Pitch spellings and their semitone offset within the octave.
///
/// Enharmonic spellings that cross an octave boundary (`Cb`, `B#`) keep the
/// octave number of the written note, so `Cb4` maps to the same number as `B4`.
const PITCH_CLASSES: [(&str, u8); 21] = [
    ("C", 0),
    ("B#", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("Fb", 4),
    ("E#", 5),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
    ("Cb", 11),
];

/// Looks up the semitone offset (0-11) of a pitch spelling.
///
/// The letter is case-insensitive; the accidental must be `#` or `b`.
/// Returns `None` for anything outside the table.
pub fn semitone_offset(pitch_name: &str) -> Option<u8> {
    let name = pitch_name.trim();
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let accidental = chars.as_str();

    PITCH_CLASSES.iter().find_map(|&(spelling, offset)| {
        let mut spelled = spelling.chars();
        let matches = spelled.next() == Some(letter) && spelled.as_str() == accidental;
        matches.then_some(offset)
    })
}

/// Resolves a pitch spelling to its semitone offset, falling back to
/// [`FALLBACK_SEMITONE`] for unknown names.
pub fn pitch_class_or_default(pitch_name: &str) -> u8 {
    semitone_offset(pitch_name).unwrap_or_else(|| {
        tracing::debug!("Unknown pitch name {:?}, using C", pitch_name);
        FALLBACK_SEMITONE
    })
}

/// Converts a pitch name and octave to a MIDI note number.
///
/// Uses the convention that C4 is note 60. The result is not clamped; callers
/// emitting MIDI bytes clamp it into 0-127 themselves. Computed in `i64` so
/// any `i32` octave yields a value instead of overflowing.
///
/// # Examples
///
/// ```
/// use beatforge_export::midi::note_to_midi_number;
///
/// assert_eq!(note_to_midi_number("C", 4), 60);
/// assert_eq!(note_to_midi_number("A", 4), 69);
/// ```
pub fn note_to_midi_number(pitch_name: &str, octave: i32) -> i64 {
    pitch_class_or_default(pitch_name) as i64 + (octave as i64 + 1) * 12
}

/// Equal-temperament frequency of a MIDI note number, tuned to A4 = 440 Hz.
pub fn midi_to_frequency_hz(midi: i64) -> f64 {
    440.0 * 2f64.powf((midi - 69) as f64 / 12.0)
}

/// Equal-temperament frequency of a note, tuned to A4 = 440 Hz.
pub fn note_to_frequency_hz(pitch_name: &str, octave: i32) -> f64 {
    midi_to_frequency_hz(note_to_midi_number(pitch_name, octave))
}

/// Converts grid steps to seconds at the given tempo.
///
/// # Arguments
///
/// * `steps` - Position or length in 16th-note steps
/// * `bpm` - Tempo in beats per minute
pub fn steps_to_seconds(steps: f64, bpm: f64) -> f64 {
    steps / (STEPS_PER_BEAT * bpm / 60.0)
}

/// Converts grid steps to ticks at the fixed [`TICKS_PER_BEAT`] resolution.
pub fn steps_to_ticks(steps: f64) -> i64 {
    steps_to_ticks_with(steps, TICKS_PER_BEAT)
}

/// Converts grid steps to ticks at an arbitrary resolution, rounding to the
/// nearest tick.
pub fn steps_to_ticks_with(steps: f64, ticks_per_quarter: u32) -> i64 {
    (steps / STEPS_PER_BEAT * ticks_per_quarter as f64).round() as i64
}

/// Converts a MIDI note number to a human-readable note name with octave.
///
/// ```
/// use beatforge_export::midi::midi_number_to_name;
///
/// assert_eq!(midi_number_to_name(60), "C4");
/// ```
pub fn midi_number_to_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}
