//! Download packaging.
//!
//! Wraps encoder output with a MIME type and a safe filename and hands it to
//! a [`Downloader`], the host's "save this file" primitive. Multi-stem exports
//! go through a [`StemBundler`] chosen by the caller.

mod bundler;

pub use bundler::{
    bundler_for, default_bundler, stem_filenames, SequentialBundler, StemBundler,
    DEFAULT_STEM_DELAY,
};
#[cfg(feature = "zip")]
pub use bundler::ZipBundler;

use crate::audio::{encode_wav, render_master_mix_with, render_stems_with};
use crate::error::ExportError;
use crate::instrument::InstrumentTable;
use crate::midi::{encode_midi_with, ExportOptions, Track};
use std::fs;
use std::path::{Path, PathBuf};

/// MIME type of Standard MIDI Files.
pub const MIDI_MIME: &str = "audio/midi";

/// MIME type of WAV files.
pub const WAV_MIME: &str = "audio/wav";

/// MIME type of zip archives.
pub const ZIP_MIME: &str = "application/zip";

/// Filename stem used when sanitizing leaves nothing.
const FALLBACK_FILENAME: &str = "project";

/// Replaces every character that is not an ASCII letter or digit with `_`.
///
/// ```
/// use beatforge_export::package::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Beat #2"), "My_Beat__2");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// A file ready to be handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Sanitized filename including extension.
    pub filename: String,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Download {
    /// Wraps bytes with an already-final filename.
    pub fn new(filename: impl Into<String>, mime: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime,
            bytes,
        }
    }

    /// A `.mid` download named after `name`.
    pub fn midi(name: &str, bytes: Vec<u8>) -> Self {
        Self::new(format!("{}.mid", sanitize_filename(name)), MIDI_MIME, bytes)
    }

    /// A `.wav` download named after `name`.
    pub fn wav(name: &str, bytes: Vec<u8>) -> Self {
        Self::new(format!("{}.wav", sanitize_filename(name)), WAV_MIME, bytes)
    }

    /// A `.zip` download named after `name`.
    pub fn zip(name: &str, bytes: Vec<u8>) -> Self {
        Self::new(format!("{}.zip", sanitize_filename(name)), ZIP_MIME, bytes)
    }
}

/// The host's file-save primitive.
pub trait Downloader {
    /// Delivers one file to the user.
    fn save(&mut self, download: Download) -> Result<(), ExportError>;
}

/// Saves downloads as files in a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectoryDownloader {
    /// Creates a downloader writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl Downloader for DirectoryDownloader {
    fn save(&mut self, download: Download) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&download.filename);
        fs::write(&path, &download.bytes)?;
        tracing::info!(
            "Saved {} ({}, {} bytes)",
            path.display(),
            download.mime,
            download.bytes.len()
        );
        self.saved.push(path);
        Ok(())
    }
}

/// Keeps downloads in memory, for hosts that forward the bytes elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloader {
    /// Downloads received so far, in order.
    pub downloads: Vec<Download>,
}

impl Downloader for MemoryDownloader {
    fn save(&mut self, download: Download) -> Result<(), ExportError> {
        self.downloads.push(download);
        Ok(())
    }
}

/// Encodes tracks to MIDI and saves `<project>.mid`.
pub fn download_midi(
    tracks: &[Track],
    options: &ExportOptions,
    instruments: &InstrumentTable,
    downloader: &mut dyn Downloader,
) -> Result<(), ExportError> {
    let bytes = encode_midi_with(tracks, options, instruments);
    downloader.save(Download::midi(&options.project_name, bytes))
}

/// Renders the master mix and saves `<project>.wav`.
pub fn download_master_mix(
    tracks: &[Track],
    options: &ExportOptions,
    instruments: &InstrumentTable,
    downloader: &mut dyn Downloader,
) -> Result<(), ExportError> {
    let bytes = encode_wav(&render_master_mix_with(tracks, options, instruments))?;
    downloader.save(Download::wav(&options.project_name, bytes))
}

/// Renders stems and delivers them through `bundler`.
///
/// Returns the number of files handed to the downloader.
pub fn download_stems(
    tracks: &[Track],
    options: &ExportOptions,
    instruments: &InstrumentTable,
    bundler: &dyn StemBundler,
    downloader: &mut dyn Downloader,
) -> Result<usize, ExportError> {
    let stems = render_stems_with(tracks, options, instruments)?;
    bundler.deliver(&options.project_name, &stems, downloader)
}
