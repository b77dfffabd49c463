//! beatforge-export - Command-line exporter for sequencer projects.
//!
//! Reads a project snapshot (JSON) and writes the requested artifacts into an
//! output directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- song.json                  # MIDI, master mix and stems into ./output
//! cargo run -- song.json --out dist --zip # stems bundled into one archive
//! RUST_LOG=debug cargo run -- song.json   # verbose logging
//! ```

use beatforge_export::package::{
    bundler_for, download_master_mix, download_midi, download_stems, DirectoryDownloader,
    DEFAULT_STEM_DELAY,
};
use beatforge_export::Project;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Default directory for exported files.
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Command-line options for the exporter.
struct CliOptions {
    /// Project snapshot to export.
    project: PathBuf,
    /// Directory the files are written into.
    out_dir: PathBuf,
    /// Write the Standard MIDI File.
    midi: bool,
    /// Write the master mix WAV.
    mix: bool,
    /// Write one WAV per track.
    stems: bool,
    /// Bundle stems into a single zip archive.
    zip: bool,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `<project.json>`: Project snapshot to export (required)
    /// - `--out <dir>` or `-o <dir>`: Output directory (default `output`)
    /// - `--no-midi`, `--no-mix`, `--no-stems`: Skip an artifact
    /// - `--zip`: Bundle stems into one archive
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut project: Option<PathBuf> = None;
        let mut out_dir = PathBuf::from(DEFAULT_OUTPUT_DIR);
        let mut midi = true;
        let mut mix = true;
        let mut stems = true;
        let mut zip = false;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--out" | "-o" => {
                    i += 1;
                    if i >= args.len() {
                        eprintln!("Error: --out requires a directory argument");
                        std::process::exit(1);
                    }
                    out_dir = PathBuf::from(&args[i]);
                }
                "--no-midi" => midi = false,
                "--no-mix" => mix = false,
                "--no-stems" => stems = false,
                "--zip" => zip = true,
                "--help" | "-h" => {
                    print_help(&args);
                    std::process::exit(0);
                }
                other if other.starts_with('-') => {
                    eprintln!("Unknown option: {}", other);
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
                other => {
                    if project.is_some() {
                        eprintln!("Error: only one project file can be exported at a time");
                        std::process::exit(1);
                    }
                    project = Some(PathBuf::from(other));
                }
            }
            i += 1;
        }

        let Some(project) = project else {
            print_help(&args);
            std::process::exit(1);
        };

        Ok(Self {
            project,
            out_dir,
            midi,
            mix,
            stems,
            zip,
        })
    }
}

fn print_help(args: &[String]) {
    eprintln!("beatforge-export - Export sequencer projects to MIDI and WAV");
    eprintln!();
    eprintln!(
        "Usage: {} <project.json> [OPTIONS]",
        args.first().map(String::as_str).unwrap_or("beatforge-export")
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --out DIR   Output directory (default: {})", DEFAULT_OUTPUT_DIR);
    eprintln!("      --no-midi   Skip the Standard MIDI File");
    eprintln!("      --no-mix    Skip the master mix");
    eprintln!("      --no-stems  Skip per-track stems");
    eprintln!("      --zip       Bundle stems into a single .zip");
    eprintln!("  -h, --help      Print this help message");
}

fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let project = Project::load_from_file(&cli.project)
        .with_context(|| format!("Failed to load project {}", cli.project.display()))?;
    let instruments = project.instrument_table();
    let options = &project.options;
    tracing::info!(
        "Exporting '{}': {} tracks at {} BPM",
        options.project_name,
        project.tracks.len(),
        options.effective_bpm()
    );

    let mut downloader = DirectoryDownloader::new(&cli.out_dir);
    let mut failed = false;

    if cli.midi {
        if let Err(e) = download_midi(&project.tracks, options, &instruments, &mut downloader) {
            tracing::error!("MIDI export failed: {:?}", e);
            failed = true;
        }
    }

    if cli.mix {
        if let Err(e) =
            download_master_mix(&project.tracks, options, &instruments, &mut downloader)
        {
            tracing::error!("Master mix export failed: {:?}", e);
            failed = true;
        }
    }

    if cli.stems {
        let bundler = bundler_for(cli.zip, DEFAULT_STEM_DELAY);
        match download_stems(
            &project.tracks,
            options,
            &instruments,
            bundler.as_ref(),
            &mut downloader,
        ) {
            Ok(0) => tracing::info!("No audible tracks, no stems written"),
            Ok(count) => tracing::info!("Stem export wrote {} file(s)", count),
            Err(e) => {
                tracing::error!("Stem export failed: {:?}", e);
                failed = true;
            }
        }
    }

    for path in downloader.saved() {
        println!("{}", path.display());
    }

    if failed {
        anyhow::bail!("some exports failed, see log for details");
    }
    Ok(())
}
