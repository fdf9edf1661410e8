use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use chapterize::{FormatKind, FrameRate, COMMON_FRAMERATES};

#[derive(Parser)]
#[command(name = "chapterize")]
#[command(about = "Convert editor marker exports into video chapter timestamps")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a marker export into chapter lines
    Convert {
        /// Marker export (.edl, .txt, .csv); reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write chapters here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame rate for HH:MM:SS:FF timecodes (default 30, or 29.97 for drop-frame EDLs)
        #[arg(long, value_name = "FPS", value_parser = parse_fps)]
        fps: Option<FrameRate>,

        /// Parse as this format instead of detecting it
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Emit JSON instead of chapter lines
        #[arg(long)]
        json: bool,

        /// Fail when the chapters break platform rules (short or colliding chapters)
        #[arg(long)]
        strict: bool,

        /// Log every marker and chapter
        #[arg(short, long)]
        verbose: bool,
    },

    /// Detect the format of a marker export and list what was found
    Detect {
        /// Marker export; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show every raw marker
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show supported formats and common framerates
    Formats,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    ResolveEdl,
    PremiereEdl,
    MarkerText,
    MarkerCsv,
}

impl From<FormatArg> for FormatKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::ResolveEdl => FormatKind::DaVinciResolveEdl,
            FormatArg::PremiereEdl => FormatKind::PremiereEdl,
            FormatArg::MarkerText => FormatKind::PremiereMarkerText,
            FormatArg::MarkerCsv => FormatKind::PremiereMarkerCsv,
        }
    }
}

fn parse_fps(value: &str) -> Result<FrameRate, String> {
    let fps: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    FrameRate::new(fps).map_err(|e| e.to_string())
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Display supported formats and framerates
pub fn show_format_info() {
    println!("Supported marker exports:");
    for (arg, kind) in FormatArg::value_variants()
        .iter()
        .map(|arg| (*arg, FormatKind::from(*arg)))
    {
        let name = arg
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        println!("  {:<13} {}", name, kind.description());
    }
    println!();
    println!("Common framerates (--fps):");
    for fps in COMMON_FRAMERATES {
        println!("  {:.3}", fps);
    }
    println!();
    println!(
        "Note: without --fps, frame timecodes are read at {} ({} when an EDL declares DROP FRAME)",
        FrameRate::DEFAULT,
        FrameRate::NTSC
    );
}
