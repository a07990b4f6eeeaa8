// SPDX-License-Identifier: MIT OR Apache-2.0
//! Splice command line.
//!
//! Usage:
//!   splice info timeline.json
//!   splice validate timeline.json
//!   splice export-otio timeline.json -o timeline.otio
//!   splice migrate clips.json --name "Cut 1" --fps 24 -o timeline.json
//!   splice to-legacy timeline.json --project p1

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use splice_editor::{logging, EditorConfig};
use splice_interchange::{legacy, native, otio, LegacyClip};
use splice_timeline::{validate_timeline, Severity, Timeline, TimelineSettings, TrackKind};
use std::path::{Path, PathBuf};

/// Timeline conversion and inspection tool
#[derive(Parser, Debug)]
#[command(name = "splice", version)]
#[command(about = "Inspect, validate and convert Splice timelines")]
struct Args {
    /// Editor configuration file (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a native timeline
    Info {
        /// Native timeline JSON
        file: PathBuf,
    },
    /// List validation problems
    Validate {
        /// Native timeline JSON
        file: PathBuf,
    },
    /// Convert a native timeline to OpenTimelineIO JSON
    ExportOtio {
        /// Native timeline JSON
        file: PathBuf,
        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a native timeline from a legacy clip list
    Migrate {
        /// Legacy clip list JSON
        file: PathBuf,
        /// Timeline name
        #[arg(long)]
        name: String,
        /// Frame rate, overriding the configured default
        #[arg(long)]
        fps: Option<f64>,
        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Flatten a native timeline into a legacy clip list
    ToLegacy {
        /// Native timeline JSON
        file: PathBuf,
        /// Project ID stamped on each clip
        #[arg(long)]
        project: String,
        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match EditorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {e}", path.display());
                std::process::exit(2);
            }
        },
        None => EditorConfig::default(),
    };

    if let Err(e) = logging::init(&config.log_filter) {
        eprintln!("Failed to initialize logging: {e}");
    }
    tracing::debug!("Starting splice v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args.command, &config) {
        tracing::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &EditorConfig) -> Result<()> {
    match command {
        Command::Info { file } => {
            let timeline = read_timeline(&file)?;
            print_info(&timeline, config);
        }
        Command::Validate { file } => {
            let timeline = read_timeline(&file)?;
            let violations = validate_timeline(&timeline);
            for violation in &violations {
                let level = match violation.severity() {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                println!("{level}: {violation}");
            }
            let errors = violations.iter().filter(|v| v.is_error()).count();
            if errors > 0 {
                bail!("{errors} error(s) in {}", file.display());
            }
            println!("{}: ok ({} warning(s))", file.display(), violations.len());
        }
        Command::ExportOtio { file, output } => {
            let timeline = read_timeline(&file)?;
            write_output(output.as_deref(), &otio::export_otio(&timeline)?)?;
        }
        Command::Migrate {
            file,
            name,
            fps,
            output,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let clips: Vec<LegacyClip> = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", file.display()))?;
            let settings = TimelineSettings {
                frame_rate: fps.unwrap_or(config.default_settings.frame_rate),
                ..config.default_settings
            };
            let timeline = legacy::migrate_from_legacy(&clips, &name, settings)?;
            write_output(output.as_deref(), &native::to_json(&timeline)?)?;
        }
        Command::ToLegacy {
            file,
            project,
            output,
        } => {
            let timeline = read_timeline(&file)?;
            let clips = legacy::to_legacy_format(&timeline, &project);
            write_output(output.as_deref(), &serde_json::to_string_pretty(&clips)?)?;
        }
    }
    Ok(())
}

fn read_timeline(path: &Path) -> Result<Timeline> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let timeline =
        native::from_json(&content).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!(path = %path.display(), clips = timeline.clip_count(), "Loaded timeline");
    Ok(timeline)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Wrote output");
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn print_info(timeline: &Timeline, config: &EditorConfig) {
    let duration = timeline.duration();
    println!("{} ({})", timeline.name, timeline.id);
    println!(
        "  {} fps, {}x{}, {} Hz / {} ch",
        timeline.settings.frame_rate,
        timeline.settings.width,
        timeline.settings.height,
        timeline.settings.sample_rate,
        timeline.settings.channels
    );
    println!(
        "  duration {} ({})",
        duration.to_timecode(config.timecode_format),
        duration.to_human_duration()
    );
    for track in timeline.tracks(None) {
        let kind = match track.kind {
            TrackKind::Video => "V",
            TrackKind::Audio => "A",
        };
        println!(
            "  [{kind}{}] {:<16} {:>3} clip(s)  {}",
            track.index + 1,
            track.name,
            track.clip_count(),
            track.duration().to_human_duration()
        );
    }
    println!(
        "  {} marker(s), {} clip(s) total",
        timeline.markers.len(),
        timeline.clip_count()
    );
}
