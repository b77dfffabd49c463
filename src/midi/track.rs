//! Track representation.
//!
//! A track is an ordered collection of notes played by one instrument, with
//! the mixer settings (volume, mute, solo) that decide how it is exported.

use super::note::Note;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a track by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Wraps an editor-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Represents a single instrument track containing notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Identifier used to label stems.
    pub id: TrackId,

    /// Human-readable name for the track.
    pub name: String,

    /// Instrument key, resolved to a GM program and an oscillator waveform.
    #[serde(default)]
    pub instrument: String,

    /// Track volume (0-100), applied as a linear gain of `volume / 100`.
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Muted tracks are left out of every export.
    #[serde(default)]
    pub muted: bool,

    /// When any track is soloed, only soloed tracks are exported.
    #[serde(default)]
    pub solo: bool,

    /// Notes in editor order.
    #[serde(default)]
    notes: Vec<Note>,
}

fn default_volume() -> f64 {
    100.0
}

impl Track {
    /// Creates an empty track at full volume.
    ///
    /// # Arguments
    ///
    /// * `id` - Editor identifier
    /// * `name` - Display name for the track
    /// * `instrument` - Instrument key such as "piano" or "bass"
    pub fn new(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        instrument: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instrument: instrument.into(),
            volume: default_volume(),
            muted: false,
            solo: false,
            notes: Vec::new(),
        }
    }

    /// Builder-style variant of [`Track::add_note`].
    pub fn with_note(mut self, note: Note) -> Self {
        self.add_note(note);
        self
    }

    /// Builder-style volume setter.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Appends a note.
    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Creates and appends a new note.
    pub fn create_note(
        &mut self,
        pitch_name: impl Into<String>,
        octave: i32,
        step: f64,
        length: f64,
        velocity: i32,
    ) {
        self.add_note(Note::new(pitch_name, octave, step, length, velocity));
    }

    /// Returns all notes in the track.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the number of notes in the track.
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Returns true when the track has no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// End of the last note, in steps. Zero for an empty track.
    pub fn duration_steps(&self) -> f64 {
        self.notes
            .iter()
            .map(Note::end_step)
            .fold(0.0, f64::max)
    }

    /// Linear gain applied when mixing, never negative.
    pub fn gain(&self) -> f64 {
        (self.volume / 100.0).max(0.0)
    }

    /// Whether the track is exported given the project's solo state.
    pub fn is_audible(&self, any_solo: bool) -> bool {
        !self.muted && (!any_solo || self.solo)
    }
}

/// Returns the tracks that should be exported, considering mute/solo states.
///
/// If any track is soloed, only soloed tracks are kept. Muted tracks are
/// always dropped, soloed or not.
pub fn playable_tracks(tracks: &[Track]) -> impl Iterator<Item = &Track> {
    let any_solo = tracks.iter().any(|t| t.solo);
    tracks.iter().filter(move |t| t.is_audible(any_solo))
}
