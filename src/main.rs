mod cli;

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chapterize::{convert, inspect, lint, render, render_json, PipelineConfig};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let verbose = match &cli.command {
        Commands::Convert { verbose, .. } | Commands::Detect { verbose, .. } => *verbose,
        Commands::Formats => false,
    };
    init_logging(verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            fps,
            format,
            json,
            strict,
            verbose,
        } => {
            let mut config = PipelineConfig::default().with_debug(verbose);
            config.frame_rate = fps;
            config.format = format.map(Into::into);
            convert_command(input.as_deref(), output, &config, json, strict)
        }
        Commands::Detect { input, verbose } => {
            let config = PipelineConfig::default().with_debug(verbose);
            detect_command(input.as_deref(), &config, verbose)
        }
        Commands::Formats => {
            cli::show_format_info();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "chapterize=debug" } else { "chapterize=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Decode an export, accepting UTF-8 and BOM-marked UTF-16 (Premiere writes marker CSVs as UTF-16).
fn decode_text(bytes: Vec<u8>) -> Result<String> {
    let utf16 = |bytes: &[u8], from: fn([u8; 2]) -> u16| -> Result<String> {
        let units: Vec<u16> = bytes.chunks_exact(2).map(|c| from([c[0], c[1]])).collect();
        String::from_utf16(&units).map_err(|e| anyhow!("invalid UTF-16 input: {}", e))
    };

    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8(bytes).context("input is not valid UTF-8")
}

fn read_input(input: Option<&Path>) -> Result<String> {
    let bytes = match input {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };
    decode_text(bytes)
}

fn convert_command(
    input: Option<&Path>,
    output: Option<PathBuf>,
    config: &PipelineConfig,
    json: bool,
    strict: bool,
) -> Result<()> {
    let text = read_input(input)?;
    // Recovered-record warnings are logged by the pipeline
    let conversion = convert(&text, config)?;

    let findings = lint(&conversion.chapters);
    for finding in &findings {
        eprintln!("note: {}", finding);
    }
    if strict && !findings.is_empty() {
        bail!("{} chapter rule violation(s) found", findings.len());
    }

    let rendered = if json {
        render_json(&conversion.chapters)?
    } else {
        render(&conversion.chapters)?
    };

    match output {
        Some(path) => {
            fs::write(&path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} chapters from {} to {}",
                conversion.chapters.len(),
                conversion.format,
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", rendered)?;
        }
    }

    Ok(())
}

fn detect_command(input: Option<&Path>, config: &PipelineConfig, verbose: bool) -> Result<()> {
    let text = read_input(input)?;
    let (format, parsed) = inspect(&text, config)?;

    println!("Format:   {}", format);
    if let Some(title) = &parsed.title {
        println!("Title:    {}", title);
    }
    if let Some(drop_frame) = parsed.drop_frame {
        println!("Timecode: {}", if drop_frame { "drop frame" } else { "non-drop frame" });
    }
    println!("Markers:  {}", parsed.entries.len());
    println!("Warnings: {}", parsed.warnings.len());

    if verbose {
        println!();
        for entry in &parsed.entries {
            println!("  line {:>4}  {:<14} {}", entry.source_line, entry.timecode_text, entry.label);
        }
        for warning in &parsed.warnings {
            println!("  warning: {}", warning);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf16_le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Name\tIn".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(bytes).unwrap(), "Name\tIn");
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text(b"00:00:00 Intro".to_vec()).unwrap(), "00:00:00 Intro");
        assert!(decode_text(vec![0xC3, 0x28]).is_err());
    }
}
