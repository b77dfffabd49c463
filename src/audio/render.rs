//! Offline rendering of tracks to PCM audio.
//!
//! Each note is voiced as an oscillator shaped by the ADSR envelope and
//! summed into its track buffer. Tracks are rendered independently on the
//! rayon pool and then accumulated into the master mix in track order, so the
//! result does not depend on thread scheduling.

use super::buffer::AudioBuffer;
use super::envelope::Envelope;
use super::export::encode_wav;
use super::oscillator::{self, Waveform};
use crate::error::ExportError;
use crate::instrument::InstrumentTable;
use crate::midi::{playable_tracks, steps_to_seconds, ExportOptions, Note, Track, TrackId};
use rayon::prelude::*;

/// Silence appended after the last note of a track, in steps, for release tails.
pub const TAIL_PADDING_STEPS: f64 = 4.0;

/// Channels in every rendered buffer.
pub const OUTPUT_CHANNELS: usize = 2;

/// Peak amplitude of a full-velocity note, leaving room for several voices.
pub const NOTE_HEADROOM: f64 = 0.5;

/// Longest render produced, in seconds. Later audio is cut off.
pub const MAX_RENDER_SECONDS: f64 = 1800.0;

/// One track rendered to its own WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct Stem {
    /// Identifier of the source track.
    pub track_id: TrackId,
    /// Name of the source track.
    pub track_name: String,
    /// Complete WAV file bytes.
    pub wav: Vec<u8>,
}

/// Frame count of a [`MAX_RENDER_SECONDS`] render.
fn max_render_frames(options: &ExportOptions) -> usize {
    (MAX_RENDER_SECONDS * options.effective_sample_rate() as f64) as usize
}

/// Number of frames covering `steps` at the export tempo and sample rate,
/// capped at [`max_render_frames`].
fn frames_for_steps(steps: f64, options: &ExportOptions) -> usize {
    let seconds = steps_to_seconds(steps, options.effective_bpm());
    let frames = (seconds * options.effective_sample_rate() as f64).ceil();
    let max_frames = max_render_frames(options);
    if frames >= max_frames as f64 {
        max_frames
    } else {
        frames.max(0.0) as usize
    }
}

fn warn_if_truncated(frames: usize, options: &ExportOptions, what: &str) {
    if frames >= max_render_frames(options) {
        tracing::warn!(
            "{} exceeds {} seconds, truncating render",
            what,
            MAX_RENDER_SECONDS
        );
    }
}

/// Synthesizes one note as a mono signal, envelope and velocity applied.
pub fn render_note(
    note: &Note,
    waveform: Waveform,
    envelope: &Envelope,
    options: &ExportOptions,
) -> Vec<f64> {
    let frames = frames_for_steps(note.length_steps(), options);
    let mut samples = vec![0.0; frames];
    oscillator::fill(
        &mut samples,
        waveform,
        note.frequency_hz(),
        options.effective_sample_rate() as f64,
    );
    envelope.apply(&mut samples);

    let amplitude = note.clamped_velocity() as f64 / 127.0 * NOTE_HEADROOM;
    for sample in &mut samples {
        *sample *= amplitude;
    }
    samples
}

/// Renders a track into a buffer sized to its own duration plus tail padding.
///
/// Mute and volume are not applied here; callers decide which tracks to
/// render and how loud they sit in a mix.
pub fn render_track(
    track: &Track,
    options: &ExportOptions,
    instruments: &InstrumentTable,
) -> AudioBuffer {
    let sample_rate = options.effective_sample_rate();
    let frames = frames_for_steps(track.duration_steps() + TAIL_PADDING_STEPS, options);
    warn_if_truncated(frames, options, &format!("Track {:?}", track.name));
    let mut buffer = AudioBuffer::silent(OUTPUT_CHANNELS, frames, sample_rate);

    let waveform = instruments.waveform_for(&track.instrument);
    let envelope = Envelope::new(sample_rate);
    let bpm = options.effective_bpm();

    for note in track.notes().iter().filter(|n| n.is_sounding()) {
        let start = (steps_to_seconds(note.start_step(), bpm) * sample_rate as f64).round();
        if start >= frames as f64 {
            continue;
        }
        let samples = render_note(note, waveform, &envelope, options);
        buffer.add_mono(start as usize, &samples);
    }

    tracing::debug!(
        "Rendered track {:?} ({} notes, {:?}) to {} frames",
        track.name,
        track.note_count(),
        waveform,
        frames
    );
    buffer
}

/// Renders every audible, non-empty track to its own WAV stem.
pub fn render_stems(
    tracks: &[Track],
    options: &ExportOptions,
) -> Result<Vec<Stem>, ExportError> {
    render_stems_with(tracks, options, &InstrumentTable::builtin())
}

/// [`render_stems`] with a custom instrument table.
pub fn render_stems_with(
    tracks: &[Track],
    options: &ExportOptions,
    instruments: &InstrumentTable,
) -> Result<Vec<Stem>, ExportError> {
    let sources: Vec<&Track> = playable_tracks(tracks).filter(|t| !t.is_empty()).collect();

    let stems = sources
        .par_iter()
        .map(|track| -> Result<Stem, ExportError> {
            let mut buffer = render_track(track, options, instruments);
            if options.normalize {
                buffer.normalize();
            }
            Ok(Stem {
                track_id: track.id.clone(),
                track_name: track.name.clone(),
                wav: encode_wav(&buffer)?,
            })
        })
        .collect::<Result<Vec<_>, ExportError>>()?;

    tracing::info!("Rendered {} stems", stems.len());
    Ok(stems)
}

/// Mixes every audible track into one stereo buffer.
///
/// Each track is scaled by its volume before summing. The mix length covers
/// the longest track plus tail padding; with nothing to render the result is
/// a short silent buffer of the padding length.
pub fn render_master_mix(tracks: &[Track], options: &ExportOptions) -> AudioBuffer {
    render_master_mix_with(tracks, options, &InstrumentTable::builtin())
}

/// [`render_master_mix`] with a custom instrument table.
pub fn render_master_mix_with(
    tracks: &[Track],
    options: &ExportOptions,
    instruments: &InstrumentTable,
) -> AudioBuffer {
    let sources: Vec<&Track> = playable_tracks(tracks).filter(|t| !t.is_empty()).collect();

    let total_steps = sources
        .iter()
        .map(|t| t.duration_steps())
        .fold(0.0, f64::max);
    let frames = frames_for_steps(total_steps + TAIL_PADDING_STEPS, options);
    warn_if_truncated(frames, options, "Master mix");

    let rendered: Vec<AudioBuffer> = sources
        .par_iter()
        .map(|track| render_track(track, options, instruments))
        .collect();

    let sample_rate = options.effective_sample_rate();
    let mut master = AudioBuffer::silent(OUTPUT_CHANNELS, frames, sample_rate);
    for (track, buffer) in sources.iter().zip(&rendered) {
        master.mix_in(buffer, track.gain() as f32);
    }

    if options.normalize {
        let gain = master.normalize();
        tracing::debug!("Normalized master mix with gain {:.3}", gain);
    }

    tracing::info!(
        "Mixed {} tracks into {:.2}s master",
        sources.len(),
        master.duration_seconds()
    );
    master
}

/// Renders the master mix and serializes it to WAV bytes.
pub fn export_master_mix(
    tracks: &[Track],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    encode_wav(&render_master_mix(tracks, options))
}
