//! Standard MIDI File (SMF) export.
//!
//! Encodes tracks into a Format 1 (multi-track) file with:
//! - Track 0: project name, time signature and tempo, ending after 64 steps
//! - Tracks 1-N: one per exported track with name, program change and notes
//!
//! Muted tracks (and, when anything is soloed, non-soloed tracks) produce no
//! track chunk at all. Mute/solo state itself has no SMF representation.

use super::{
    playable_tracks, steps_to_ticks, ExportOptions, Track, TEMPO_TRACK_STEPS, TICKS_PER_BEAT,
};
use crate::error::ExportError;
use crate::instrument::InstrumentTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Largest value a MIDI variable-length quantity can hold (28 bits).
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Highest MIDI channel (0-indexed).
const MAX_CHANNEL: usize = 15;

/// Writes a variable-length quantity (VLQ) used for delta times in MIDI.
///
/// VLQ encodes values using 7 bits per byte, most significant group first,
/// with the MSB of every byte except the last set to signal continuation.
/// Values above [`VLQ_MAX`] are clamped.
///
/// # Arguments
///
/// * `value` - The value to encode
/// * `buffer` - Output buffer to write to
pub fn write_vlq(value: u32, buffer: &mut Vec<u8>) {
    let value = value.min(VLQ_MAX);
    if value == 0 {
        buffer.push(0);
        return;
    }

    let mut temp = value;
    let mut bytes = Vec::with_capacity(4);

    while temp > 0 {
        bytes.push((temp & 0x7F) as u8);
        temp >>= 7;
    }

    // Write bytes in reverse order with continuation bits
    for (i, &byte) in bytes.iter().rev().enumerate() {
        if i < bytes.len() - 1 {
            buffer.push(byte | 0x80);
        } else {
            buffer.push(byte);
        }
    }
}

/// Reads a variable-length quantity from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends early or the quantity is longer than four bytes.
pub fn read_vlq(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    for (i, &byte) in bytes.iter().take(4).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

/// MIDI event types for track data.
#[derive(Debug, Clone, PartialEq)]
enum MidiEvent {
    /// Note on: channel, pitch, velocity
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    /// Note off: channel, pitch (release velocity is always 0)
    NoteOff { channel: u8, pitch: u8 },
    /// Program change: channel, program number
    ProgramChange { channel: u8, program: u8 },
    /// Set tempo: microseconds per quarter note
    SetTempo { microseconds_per_beat: u32 },
    /// Time signature: numerator, denominator as power of 2
    TimeSignature {
        numerator: u8,
        denominator_power: u8,
    },
    /// Track name (meta event)
    TrackName { name: String },
    /// End of track (meta event)
    EndOfTrack,
}

impl MidiEvent {
    /// Ordering among events sharing a tick (lower = first).
    ///
    /// Setup events come first, then note offs, then note ons, so a note
    /// starting exactly where another ends never overlaps it.
    fn priority(&self) -> u8 {
        match self {
            MidiEvent::TrackName { .. } => 0,
            MidiEvent::TimeSignature { .. } | MidiEvent::ProgramChange { .. } => 1,
            MidiEvent::SetTempo { .. } => 2,
            MidiEvent::NoteOff { .. } => 10,
            MidiEvent::NoteOn { .. } => 11,
            MidiEvent::EndOfTrack => 255,
        }
    }
}

/// A MIDI event at an absolute tick position.
#[derive(Debug, Clone, PartialEq)]
struct TimedEvent {
    tick: i64,
    event: MidiEvent,
}

impl TimedEvent {
    fn new(tick: i64, event: MidiEvent) -> Self {
        Self { tick, event }
    }
}

/// Writes a single MIDI event to the buffer (without delta time).
fn write_event(event: &MidiEvent, buffer: &mut Vec<u8>) {
    match event {
        MidiEvent::NoteOn {
            channel,
            pitch,
            velocity,
        } => {
            buffer.push(0x90 | (channel & 0x0F));
            buffer.push(pitch & 0x7F);
            buffer.push(velocity & 0x7F);
        }
        MidiEvent::NoteOff { channel, pitch } => {
            buffer.push(0x80 | (channel & 0x0F));
            buffer.push(pitch & 0x7F);
            buffer.push(0);
        }
        MidiEvent::ProgramChange { channel, program } => {
            buffer.push(0xC0 | (channel & 0x0F));
            buffer.push(program & 0x7F);
        }
        MidiEvent::SetTempo {
            microseconds_per_beat,
        } => {
            // Meta event: FF 51 03 tt tt tt
            buffer.extend_from_slice(&[0xFF, 0x51, 0x03]);
            buffer.extend_from_slice(&microseconds_per_beat.to_be_bytes()[1..]);
        }
        MidiEvent::TimeSignature {
            numerator,
            denominator_power,
        } => {
            // Meta event: FF 58 04 nn dd cc bb
            // cc = MIDI clocks per metronome click (24 = quarter note)
            // bb = 32nd notes per quarter note (8)
            buffer.extend_from_slice(&[0xFF, 0x58, 0x04]);
            buffer.push(*numerator);
            buffer.push(*denominator_power);
            buffer.push(24);
            buffer.push(8);
        }
        MidiEvent::TrackName { name } => {
            // Meta event: FF 03 len text
            buffer.push(0xFF);
            buffer.push(0x03);
            let name_bytes = name.as_bytes();
            write_vlq(name_bytes.len() as u32, buffer);
            buffer.extend_from_slice(name_bytes);
        }
        MidiEvent::EndOfTrack => {
            buffer.extend_from_slice(&[0xFF, 0x2F, 0x00]);
        }
    }
}

/// Builds the track chunk data from a list of timed events.
///
/// Events are ordered by tick, then by [`MidiEvent::priority`]; the sort is
/// stable so equal events keep insertion order. Delta times are folded from
/// a cursor that starts at tick 0 for every track.
fn build_track_data(mut events: Vec<TimedEvent>) -> Vec<u8> {
    events.sort_by(|a, b| {
        a.tick
            .cmp(&b.tick)
            .then(a.event.priority().cmp(&b.event.priority()))
    });

    let (buffer, _) = events
        .iter()
        .fold((Vec::new(), 0i64), |(mut buffer, last_tick), timed| {
            let delta = (timed.tick - last_tick).clamp(0, VLQ_MAX as i64) as u32;
            write_vlq(delta, &mut buffer);
            write_event(&timed.event, &mut buffer);
            (buffer, timed.tick.max(last_tick))
        });
    buffer
}

/// Appends a track chunk (`MTrk` + big-endian length + data).
fn write_track_chunk(out: &mut Vec<u8>, track_data: &[u8]) {
    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
    out.extend_from_slice(track_data);
}

/// Calculates the power of 2 for a time signature denominator.
///
/// E.g., 4 -> 2 (2^2 = 4), 8 -> 3 (2^3 = 8)
fn denominator_to_power(denom: u8) -> u8 {
    match denom {
        1 => 0,
        2 => 1,
        4 => 2,
        8 => 3,
        16 => 4,
        32 => 5,
        64 => 6,
        _ => 2, // Default to quarter note
    }
}

/// Microseconds per quarter note for a tempo, limited to the 24-bit field.
fn microseconds_per_beat(bpm: f64) -> u32 {
    (60_000_000.0 / bpm).round().clamp(1.0, 0xFF_FFFF as f64) as u32
}

/// Events of the tempo/meta track.
fn tempo_track_events(options: &ExportOptions) -> Vec<TimedEvent> {
    let signature = options.time_signature;
    vec![
        TimedEvent::new(
            0,
            MidiEvent::TrackName {
                name: options.project_name.clone(),
            },
        ),
        TimedEvent::new(
            0,
            MidiEvent::TimeSignature {
                numerator: signature.numerator,
                denominator_power: denominator_to_power(signature.denominator),
            },
        ),
        TimedEvent::new(
            0,
            MidiEvent::SetTempo {
                microseconds_per_beat: microseconds_per_beat(options.effective_bpm()),
            },
        ),
        TimedEvent::new(steps_to_ticks(TEMPO_TRACK_STEPS), MidiEvent::EndOfTrack),
    ]
}

/// Events of one instrument track.
///
/// A track without notes only gets its name and end-of-track.
fn instrument_track_events(track: &Track, channel: u8, program: u8) -> Vec<TimedEvent> {
    let mut events = vec![TimedEvent::new(
        0,
        MidiEvent::TrackName {
            name: track.name.clone(),
        },
    )];

    if !track.is_empty() {
        events.push(TimedEvent::new(
            0,
            MidiEvent::ProgramChange { channel, program },
        ));
    }

    for note in track.notes() {
        let on_tick = steps_to_ticks(note.start_step());
        let off_tick = steps_to_ticks(note.end_step());
        if off_tick <= on_tick {
            tracing::debug!(
                "Skipping zero-length note {}{} in track {:?}",
                note.pitch_name,
                note.octave,
                track.name
            );
            continue;
        }

        let pitch = note.midi_number();
        events.push(TimedEvent::new(
            on_tick,
            MidiEvent::NoteOn {
                channel,
                pitch,
                velocity: note.scaled_velocity(track.volume),
            },
        ));
        events.push(TimedEvent::new(
            off_tick,
            MidiEvent::NoteOff { channel, pitch },
        ));
    }

    let track_end = events.iter().map(|e| e.tick).max().unwrap_or(0);
    events.push(TimedEvent::new(track_end, MidiEvent::EndOfTrack));
    events
}

/// Encodes tracks as Standard MIDI File bytes using the built-in instruments.
///
/// This never fails: unknown pitches, instruments and out-of-range values
/// degrade to documented defaults.
pub fn encode_midi(tracks: &[Track], options: &ExportOptions) -> Vec<u8> {
    encode_midi_with(tracks, options, &InstrumentTable::builtin())
}

/// Encodes tracks as Standard MIDI File bytes with a custom instrument table.
///
/// # Format
///
/// Creates a Format 1 file at 480 ticks per quarter note:
/// - Track 0: tempo, time signature and project name
/// - Tracks 1-N: one per exported track, channel = export index capped at 15
pub fn encode_midi_with(
    tracks: &[Track],
    options: &ExportOptions,
    instruments: &InstrumentTable,
) -> Vec<u8> {
    let chunks: Vec<Vec<u8>> = std::iter::once(build_track_data(tempo_track_events(options)))
        .chain(playable_tracks(tracks).enumerate().map(|(index, track)| {
            let channel = index.min(MAX_CHANNEL) as u8;
            let program = instruments.program_for(&track.instrument);
            let data = build_track_data(instrument_track_events(track, channel, program));
            tracing::debug!(
                "Encoded track {:?} on channel {} (program {}, {} bytes)",
                track.name,
                channel,
                program,
                data.len()
            );
            data
        }))
        .collect();

    let num_tracks = u16::try_from(chunks.len()).unwrap_or(u16::MAX);
    let mut out = Vec::with_capacity(14 + chunks.iter().map(|c| c.len() + 8).sum::<usize>());

    // Header chunk (MThd)
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes()); // Header length (always 6)
    out.extend_from_slice(&1u16.to_be_bytes()); // Format 1 (multi-track)
    out.extend_from_slice(&num_tracks.to_be_bytes());
    out.extend_from_slice(&(TICKS_PER_BEAT as u16).to_be_bytes()); // Division

    for chunk in &chunks {
        write_track_chunk(&mut out, chunk);
    }

    tracing::info!(
        "Encoded MIDI file with {} tracks ({} bytes)",
        num_tracks,
        out.len()
    );
    out
}

/// Writes encoded MIDI bytes to a file.
pub(super) fn write_midi_file<P: AsRef<Path>>(bytes: &[u8], path: P) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

/// Exports tracks to a Standard MIDI File on disk.
///
/// # Errors
///
/// Returns error if file creation or writing fails
pub fn export_to_midi<P: AsRef<Path>>(
    tracks: &[Track],
    options: &ExportOptions,
    path: P,
) -> Result<(), ExportError> {
    write_midi_file(&encode_midi(tracks, options), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::{Note, TimeSignature};

    fn options(name: &str) -> ExportOptions {
        ExportOptions {
            project_name: name.to_string(),
            ..ExportOptions::default()
        }
    }

    /// Splits an SMF byte stream into its track chunk payloads.
    fn track_chunks(bytes: &[u8]) -> Vec<&[u8]> {
        let mut chunks = Vec::new();
        let mut pos = 14;
        while pos + 8 <= bytes.len() {
            assert_eq!(&bytes[pos..pos + 4], b"MTrk");
            let len = u32::from_be_bytes([
                bytes[pos + 4],
                bytes[pos + 5],
                bytes[pos + 6],
                bytes[pos + 7],
            ]) as usize;
            chunks.push(&bytes[pos + 8..pos + 8 + len]);
            pos += 8 + len;
        }
        assert_eq!(pos, bytes.len());
        chunks
    }

    #[test]
    fn test_vlq_encoding() {
        let mut buffer = Vec::new();

        write_vlq(0, &mut buffer);
        assert_eq!(buffer, vec![0x00]);
        buffer.clear();

        write_vlq(127, &mut buffer);
        assert_eq!(buffer, vec![0x7F]);
        buffer.clear();

        write_vlq(128, &mut buffer);
        assert_eq!(buffer, vec![0x81, 0x00]);
        buffer.clear();

        write_vlq(16383, &mut buffer);
        assert_eq!(buffer, vec![0xFF, 0x7F]);
        buffer.clear();

        write_vlq(0x4000, &mut buffer);
        assert_eq!(buffer, vec![0x81, 0x80, 0x00]);
        buffer.clear();

        write_vlq(VLQ_MAX, &mut buffer);
        assert_eq!(buffer, vec![0xFF, 0xFF, 0xFF, 0x7F]);
        buffer.clear();

        write_vlq(u32::MAX, &mut buffer);
        assert_eq!(buffer, vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_vlq_decoding_inverts_encoding() {
        let mut value = 0u32;
        while value <= VLQ_MAX {
            for v in [value, value.saturating_sub(1), (value + 1).min(VLQ_MAX)] {
                let mut buffer = Vec::new();
                write_vlq(v, &mut buffer);
                assert_eq!(read_vlq(&buffer), Some((v, buffer.len())), "value {v}");
            }
            value = if value == 0 { 1 } else { value * 2 + 7 };
        }
        assert_eq!(read_vlq(&[0x81]), None);
        assert_eq!(read_vlq(&[0x80, 0x80, 0x80, 0x80, 0x00]), None);
    }

    #[test]
    fn test_denominator_power() {
        assert_eq!(denominator_to_power(4), 2);
        assert_eq!(denominator_to_power(8), 3);
        assert_eq!(denominator_to_power(2), 1);
        assert_eq!(denominator_to_power(16), 4);
        assert_eq!(denominator_to_power(3), 2);
    }

    #[test]
    fn test_tempo() {
        assert_eq!(microseconds_per_beat(120.0), 500_000);
        assert_eq!(microseconds_per_beat(90.0), 666_667);
        assert_eq!(microseconds_per_beat(0.001), 0xFF_FFFF);
    }

    #[test]
    fn test_single_note_file_bytes() {
        let track =
            Track::new("t1", "Piano", "piano").with_note(Note::new("C", 4, 0.0, 4.0, 100));
        let bytes = encode_midi(&[track], &options("Demo"));

        let mut expected = Vec::new();
        expected.extend_from_slice(b"MThd");
        expected.extend_from_slice(&[0, 0, 0, 6, 0, 1, 0, 2, 0x01, 0xE0]);

        expected.extend_from_slice(b"MTrk");
        expected.extend_from_slice(&[0, 0, 0, 28]);
        expected.extend_from_slice(&[0x00, 0xFF, 0x03, 0x04]);
        expected.extend_from_slice(b"Demo");
        expected.extend_from_slice(&[0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08]);
        expected.extend_from_slice(&[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        expected.extend_from_slice(&[0xBC, 0x00, 0xFF, 0x2F, 0x00]);

        expected.extend_from_slice(b"MTrk");
        expected.extend_from_slice(&[0, 0, 0, 25]);
        expected.extend_from_slice(&[0x00, 0xFF, 0x03, 0x05]);
        expected.extend_from_slice(b"Piano");
        expected.extend_from_slice(&[0x00, 0xC0, 0x00]);
        expected.extend_from_slice(&[0x00, 0x90, 60, 100]);
        expected.extend_from_slice(&[0x83, 0x60, 0x80, 60, 0x00]);
        expected.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_note_off_before_note_on_at_same_tick() {
        let mut track = Track::new("t1", "Bass", "bass");
        // Second note starts exactly where the first ends (tick 480)
        track.create_note("D", 4, 4.0, 4.0, 100);
        track.create_note("C", 4, 0.0, 4.0, 100);
        let bytes = encode_midi(&[track], &options("Demo"));
        let chunks = track_chunks(&bytes);
        let data = chunks[1];

        let expected_tail = [
            0x00, 0xC0, 33, // program change (bass)
            0x00, 0x90, 60, 100, // C4 on at 0
            0x83, 0x60, 0x80, 60, 0x00, // C4 off at 480
            0x00, 0x90, 62, 100, // D4 on at 480
            0x83, 0x60, 0x80, 62, 0x00, // D4 off at 960
            0x00, 0xFF, 0x2F, 0x00,
        ];
        assert!(data.ends_with(&expected_tail), "{data:02X?}");
    }

    #[test]
    fn test_muted_tracks_are_skipped() {
        let mut muted = Track::new("m", "Muted", "lead");
        muted.create_note("C", 4, 0.0, 4.0, 100);
        muted.muted = true;
        let mut audible = Track::new("a", "Audible", "lead");
        audible.create_note("E", 4, 0.0, 4.0, 100);

        let bytes = encode_midi(&[muted, audible], &options("Demo"));
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 2);
        let chunks = track_chunks(&bytes);
        assert_eq!(chunks.len(), 2);
        assert!(!bytes.windows(5).any(|w| w == b"Muted"));
        // The remaining track takes channel 0
        assert!(chunks[1].windows(2).any(|w| w == [0xC0, 80]));
    }

    #[test]
    fn test_only_muted_tracks_leaves_tempo_track() {
        let mut muted = Track::new("m", "Muted", "lead");
        muted.create_note("C", 4, 0.0, 4.0, 100);
        muted.muted = true;
        let bytes = encode_midi(&[muted], &options("Demo"));
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 1);
        assert_eq!(track_chunks(&bytes).len(), 1);
    }

    #[test]
    fn test_empty_track_has_only_name_and_end() {
        let track = Track::new("e", "Empty", "piano");
        let bytes = encode_midi(&[track], &options("Demo"));
        let chunks = track_chunks(&bytes);
        let mut expected = vec![0x00, 0xFF, 0x03, 0x05];
        expected.extend_from_slice(b"Empty");
        expected.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        assert_eq!(chunks[1], expected.as_slice());
    }

    #[test]
    fn test_velocity_scaling_and_clamping() {
        let mut track = Track::new("t", "Keys", "piano").with_volume(50.0);
        track.create_note("C", 4, 0.0, 1.0, 100);
        track.create_note("D", 4, 1.0, 1.0, 1);
        track.create_note("E", 4, 2.0, 1.0, 900);
        let bytes = encode_midi(&[track], &options("Demo"));
        let data = track_chunks(&bytes)[1];

        let velocities: Vec<u8> = data
            .windows(3)
            .filter(|w| w[0] == 0x90)
            .map(|w| w[2])
            .collect();
        assert_eq!(velocities, vec![50, 1, 127]);
    }

    #[test]
    fn test_channel_capped_at_15() {
        let tracks: Vec<Track> = (0..18)
            .map(|i| {
                Track::new(i.to_string().as_str(), "T", "piano")
                    .with_note(Note::new("C", 4, 0.0, 1.0, 100))
            })
            .collect();
        let bytes = encode_midi(&tracks, &options("Demo"));
        let chunks = track_chunks(&bytes);
        assert_eq!(chunks.len(), 19);
        assert!(chunks[16].windows(2).any(|w| w == [0xCF, 0x00]));
        assert!(chunks[18].windows(2).any(|w| w == [0xCF, 0x00]));
    }

    #[test]
    fn test_extreme_octaves_clamp_pitch() {
        let mut track = Track::new("x", "X", "piano");
        track.create_note("C", i32::MAX, 0.0, 4.0, 100);
        track.create_note("C", i32::MIN, 4.0, 4.0, 100);
        let bytes = encode_midi(&[track], &options("Demo"));
        let data = track_chunks(&bytes)[1];

        let pitches: Vec<u8> = data
            .windows(3)
            .filter(|w| w[0] == 0x90)
            .map(|w| w[1])
            .collect();
        assert_eq!(pitches, vec![127, 0]);
    }

    #[test]
    fn test_out_of_range_program_is_clamped() {
        let instruments: InstrumentTable =
            serde_json::from_str(r#"{"programs":{"theremin":200}}"#).unwrap();
        let track = Track::new("t", "T", "theremin").with_note(Note::new("C", 4, 0.0, 4.0, 100));
        let bytes = encode_midi_with(&[track], &options("Demo"), &instruments);
        let data = track_chunks(&bytes)[1];
        assert!(data.windows(2).any(|w| w == [0xC0, 0x7F]));
    }

    #[test]
    fn test_export_to_midi_writes_file() {
        let dir = std::env::temp_dir().join(format!("beatforge-midi-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("demo.mid");

        let track = Track::new("t", "Keys", "piano").with_note(Note::new("C", 4, 0.0, 4.0, 100));
        let tracks = [track];
        export_to_midi(&tracks, &options("Demo"), &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, encode_midi(&tracks, &options("Demo")));
        assert!(midly::Smf::parse(&written).is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_export_to_midi_reports_io_errors() {
        let path = std::env::temp_dir()
            .join(format!("beatforge-missing-{}", std::process::id()))
            .join("nested")
            .join("demo.mid");
        let result = export_to_midi(&[], &options("Demo"), &path);
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_zero_length_notes_dropped() {
        let mut track = Track::new("t", "T", "piano");
        track.create_note("C", 4, 0.0, 0.0, 100);
        track.create_note("C", 4, 0.0, -2.0, 100);
        let bytes = encode_midi(&[track], &options("Demo"));
        let data = track_chunks(&bytes)[1];
        assert!(!data.contains(&0x90));
    }

    #[test]
    fn test_parses_with_midly() {
        let mut lead = Track::new("l", "Lead", "lead");
        lead.create_note("A", 4, 0.0, 2.0, 90);
        lead.create_note("C#", 5, 2.0, 2.0, 90);
        let mut bass = Track::new("b", "Bass", "bass").with_volume(80.0);
        bass.create_note("E", 2, 0.0, 8.0, 120);

        let opts = ExportOptions {
            bpm: 90.0,
            time_signature: TimeSignature::new(6, 8),
            ..options("Session")
        };
        let bytes = encode_midi(&[lead, bass], &opts);
        let smf = midly::Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.format, midly::Format::Parallel);
        assert_eq!(
            smf.header.timing,
            midly::Timing::Metrical(midly::num::u15::new(480))
        );
        assert_eq!(smf.tracks.len(), 3);

        let metas: Vec<_> = smf.tracks[0].iter().map(|e| e.kind).collect();
        assert!(metas.contains(&midly::TrackEventKind::Meta(
            midly::MetaMessage::TimeSignature(6, 3, 24, 8)
        )));
        assert!(metas.contains(&midly::TrackEventKind::Meta(midly::MetaMessage::Tempo(
            midly::num::u24::new(666_667)
        ))));

        let mut tick = 0u32;
        let mut note_ons = Vec::new();
        for event in &smf.tracks[2] {
            tick += event.delta.as_int();
            if let midly::TrackEventKind::Midi {
                channel,
                message: midly::MidiMessage::NoteOn { key, vel },
            } = event.kind
            {
                note_ons.push((tick, channel.as_int(), key.as_int(), vel.as_int()));
            }
        }
        assert_eq!(note_ons, vec![(0, 1, 40, 96)]);
    }
}
