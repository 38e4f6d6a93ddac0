use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use canonical_huffman::{CodecStats, HuffmanCodec};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Canonical Huffman file compressor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress INPUT into OUTPUT.
    Encode { input: PathBuf, output: PathBuf },
    /// Restore the original bytes of a compressed INPUT into OUTPUT.
    Decode { input: PathBuf, output: PathBuf },
    /// Print the code table stored in a compressed file.
    Inspect { input: PathBuf },
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("failed to create log filter")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install log subscriber")?;
    Ok(())
}

fn encode(input: &Path, output: &Path) -> Result<CodecStats> {
    let source = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let mut compressed = Vec::new();
    let stats = HuffmanCodec::encode_from_file(source, &mut compressed)
        .with_context(|| format!("failed to compress {}", input.display()))?;
    fs::write(output, &compressed).with_context(|| format!("cannot write {}", output.display()))?;
    Ok(stats)
}

fn decode(input: &Path, output: &Path) -> Result<CodecStats> {
    let source = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let mut restored = Vec::new();
    let stats = HuffmanCodec::decode_from_file(source, &mut restored)
        .with_context(|| format!("failed to decompress {}", input.display()))?;
    fs::write(output, &restored).with_context(|| format!("cannot write {}", output.display()))?;
    Ok(stats)
}

fn inspect(input: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let table = HuffmanCodec::read_table(&data)
        .with_context(|| format!("{} has no valid header", input.display()))?;
    println!("{} symbols, longest code {} bits", table.len(), table.max_length());
    print!("{}", table);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level())?;

    let started = Instant::now();
    let (verb, stats) = match &cli.command {
        Command::Encode { input, output } => ("compressed", encode(input, output)?),
        Command::Decode { input, output } => ("decompressed", decode(input, output)?),
        Command::Inspect { input } => return inspect(input),
    };

    info!(
        input_bytes = stats.input_bytes,
        output_bytes = stats.output_bytes,
        ratio = %format!("{:.3}", stats.ratio()),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{}",
        verb
    );
    Ok(())
}
