//! Delivery strategies for multi-stem exports.

use super::{sanitize_filename, Download, Downloader};
use crate::audio::Stem;
use crate::error::ExportError;
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

/// Pause between individual stem saves.
pub const DEFAULT_STEM_DELAY: Duration = Duration::from_millis(200);

/// Hands a set of rendered stems to a downloader.
pub trait StemBundler {
    /// Delivers `stems` and returns how many files were saved.
    fn deliver(
        &self,
        project_name: &str,
        stems: &[Stem],
        downloader: &mut dyn Downloader,
    ) -> Result<usize, ExportError>;
}

/// Unique `.wav` filenames for stems, `<project>_<track>.wav`.
///
/// Tracks sharing a name get a numeric suffix so no file overwrites another.
pub fn stem_filenames(project_name: &str, stems: &[Stem]) -> Vec<String> {
    let prefix = sanitize_filename(project_name);
    let mut taken = HashSet::new();
    stems
        .iter()
        .map(|stem| {
            let base = format!("{}_{}", prefix, sanitize_filename(&stem.track_name));
            let mut name = format!("{base}.wav");
            let mut counter = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}_{counter}.wav");
                counter += 1;
            }
            name
        })
        .collect()
}

/// Saves each stem as its own file, pausing between saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialBundler {
    /// Pause inserted between consecutive saves.
    pub delay: Duration,
}

impl SequentialBundler {
    /// Creates a bundler with a custom pause.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SequentialBundler {
    fn default() -> Self {
        Self::new(DEFAULT_STEM_DELAY)
    }
}

impl StemBundler for SequentialBundler {
    fn deliver(
        &self,
        project_name: &str,
        stems: &[Stem],
        downloader: &mut dyn Downloader,
    ) -> Result<usize, ExportError> {
        let names = stem_filenames(project_name, stems);
        for (index, (stem, name)) in stems.iter().zip(names).enumerate() {
            if index > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            downloader.save(Download::new(name, super::WAV_MIME, stem.wav.clone()))?;
        }
        Ok(stems.len())
    }
}

/// Stores every stem in one uncompressed `<project>_stems.zip`.
#[cfg(feature = "zip")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZipBundler;

#[cfg(feature = "zip")]
impl ZipBundler {
    /// Builds the archive bytes.
    pub fn archive(&self, project_name: &str, stems: &[Stem]) -> Result<Vec<u8>, ExportError> {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;
        use zip::{CompressionMethod, ZipWriter};

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (stem, name) in stems.iter().zip(stem_filenames(project_name, stems)) {
            zip.start_file(name, options)?;
            zip.write_all(&stem.wav)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

#[cfg(feature = "zip")]
impl StemBundler for ZipBundler {
    fn deliver(
        &self,
        project_name: &str,
        stems: &[Stem],
        downloader: &mut dyn Downloader,
    ) -> Result<usize, ExportError> {
        if stems.is_empty() {
            return Ok(0);
        }
        let bytes = self.archive(project_name, stems)?;
        let name = format!("{project_name}_stems");
        downloader.save(Download::zip(&name, bytes))?;
        Ok(1)
    }
}

/// Picks a stem bundler at call time.
///
/// Asking for a zip when the crate was built without the `zip` feature falls
/// back to sequential saves.
pub fn bundler_for(prefer_zip: bool, delay: Duration) -> Box<dyn StemBundler> {
    if prefer_zip {
        match zip_bundler() {
            Some(bundler) => return bundler,
            None => tracing::warn!("Zip support not compiled in, saving stems one by one"),
        }
    }
    Box::new(SequentialBundler::new(delay))
}

/// The zip bundler when compiled in, sequential saves otherwise.
pub fn default_bundler() -> Box<dyn StemBundler> {
    zip_bundler().unwrap_or_else(|| Box::new(SequentialBundler::default()))
}

#[cfg(feature = "zip")]
fn zip_bundler() -> Option<Box<dyn StemBundler>> {
    Some(Box::new(ZipBundler))
}

#[cfg(not(feature = "zip"))]
fn zip_bundler() -> Option<Box<dyn StemBundler>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::TrackId;
    use crate::package::MemoryDownloader;

    fn stem(id: &str, name: &str) -> Stem {
        Stem {
            track_id: TrackId::new(id),
            track_name: name.to_string(),
            wav: vec![id.len() as u8],
        }
    }

    #[test]
    fn test_stem_filenames_are_unique() {
        let stems = vec![stem("1", "Drums"), stem("2", "Bass"), stem("3", "Drums")];
        assert_eq!(
            stem_filenames("Night Drive", &stems),
            vec![
                "Night_Drive_Drums.wav",
                "Night_Drive_Bass.wav",
                "Night_Drive_Drums_2.wav"
            ]
        );
    }

    #[test]
    fn test_sequential_bundler() {
        let stems = vec![stem("1", "Lead"), stem("22", "Pad")];
        let mut downloader = MemoryDownloader::default();
        let count = SequentialBundler::new(Duration::ZERO)
            .deliver("Demo", &stems, &mut downloader)
            .unwrap();

        assert_eq!(count, 2);
        let files: Vec<_> = downloader
            .downloads
            .iter()
            .map(|d| (d.filename.as_str(), d.mime, d.bytes.clone()))
            .collect();
        assert_eq!(
            files,
            vec![
                ("Demo_Lead.wav", "audio/wav", vec![1]),
                ("Demo_Pad.wav", "audio/wav", vec![2]),
            ]
        );
    }

    #[test]
    fn test_sequential_bundler_pauses_between_saves() {
        let stems = vec![stem("1", "A"), stem("2", "B"), stem("3", "C")];
        let mut downloader = MemoryDownloader::default();
        let started = std::time::Instant::now();
        SequentialBundler::new(Duration::from_millis(10))
            .deliver("Demo", &stems, &mut downloader)
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_no_stems_saves_nothing() {
        let mut downloader = MemoryDownloader::default();
        let bundler = bundler_for(false, Duration::ZERO);
        assert_eq!(bundler.deliver("Demo", &[], &mut downloader).unwrap(), 0);
        assert!(downloader.downloads.is_empty());
    }

    #[test]
    fn test_default_bundler_follows_features() {
        let stems = vec![stem("1", "Lead"), stem("2", "Pad")];
        let mut downloader = MemoryDownloader::default();
        let count = default_bundler()
            .deliver("Demo", &stems[..1], &mut downloader)
            .unwrap();
        assert_eq!(count, 1);
        let expected = if cfg!(feature = "zip") {
            "Demo_stems.zip"
        } else {
            "Demo_Lead.wav"
        };
        assert_eq!(downloader.downloads[0].filename, expected);
    }

    #[cfg(not(feature = "zip"))]
    #[test]
    fn test_zip_request_falls_back_to_sequential() {
        let stems = vec![stem("1", "Lead"), stem("2", "Pad")];
        let mut downloader = MemoryDownloader::default();
        let count = bundler_for(true, Duration::ZERO)
            .deliver("Demo", &stems, &mut downloader)
            .unwrap();
        assert_eq!(count, 2);
        assert!(downloader.downloads.iter().all(|d| d.mime == "audio/wav"));
    }

    #[cfg(feature = "zip")]
    #[test]
    fn test_zip_bundler() {
        let stems = vec![stem("1", "Lead"), stem("2", "Pad")];
        let mut downloader = MemoryDownloader::default();
        let count = bundler_for(true, Duration::ZERO)
            .deliver("Demo", &stems, &mut downloader)
            .unwrap();

        assert_eq!(count, 1);
        let archive = &downloader.downloads[0];
        assert_eq!(archive.filename, "Demo_stems.zip");
        assert_eq!(archive.mime, "application/zip");
        assert_eq!(&archive.bytes[0..4], b"PK\x03\x04");

        let reader = zip::ZipArchive::new(std::io::Cursor::new(archive.bytes.clone())).unwrap();
        let names: Vec<_> = reader.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Demo_Lead.wav"));
        assert!(names.contains(&"Demo_Pad.wav"));
    }
}
