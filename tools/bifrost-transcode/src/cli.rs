//! CLI commands for bifrost-transcode

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use crate::config::TranscodeConfig;
use crate::ingest::{read_connectors, SegmentReader};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::pipeline::{StreamSink, Transcoder};
use crate::verify::verify_output;

#[derive(Parser)]
#[command(name = "bifrost-transcode")]
#[command(about = "Transcode Overture transportation data into Valhalla intermediate files", long_about = None)]
pub struct Cli {
    /// Raise log level (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert segment (and connector) features into ways.bin, nodes.bin and way_nodes.bin
    Convert {
        /// Segment features, one JSON object per line
        #[arg(long)]
        segments: PathBuf,

        /// Connector features, one JSON object per line
        #[arg(long)]
        connectors: Option<PathBuf>,

        /// Output directory for the record streams and manifest.json
        #[arg(short, long)]
        output_dir: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker threads for attribute resolution (default: all cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Segments per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// First node identifier
        #[arg(long)]
        node_id_base: Option<u64>,

        /// First way identifier
        #[arg(long)]
        way_id_base: Option<u64>,

        /// Traffic drives on the left
        #[arg(long)]
        drive_on_left: bool,
    },

    /// Verify an output directory against its manifest.json
    Verify {
        /// Directory written by `convert`
        #[arg(short, long)]
        output_dir: PathBuf,
    },
}

/// Settings of a convert run
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub segments: PathBuf,
    pub connectors: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub config: TranscodeConfig,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Convert {
                segments,
                connectors,
                output_dir,
                config,
                threads,
                batch_size,
                node_id_base,
                way_id_base,
                drive_on_left,
            } => {
                let mut config = match config {
                    Some(path) => TranscodeConfig::load(&path)
                        .with_context(|| format!("Failed to load config {}", path.display()))?,
                    None => TranscodeConfig::default(),
                };
                if threads.is_some() {
                    config.threads = threads;
                }
                if let Some(n) = batch_size {
                    config.batch_size = n;
                }
                if let Some(base) = node_id_base {
                    config.node_id_base = base;
                }
                if let Some(base) = way_id_base {
                    config.way_id_base = base;
                }
                if drive_on_left {
                    config.drive_on_right = false;
                }

                let manifest = run_convert(ConvertArgs {
                    segments,
                    connectors,
                    output_dir: output_dir.clone(),
                    config,
                })?;

                println!();
                verify_output(&output_dir)?;

                if manifest.cancelled {
                    anyhow::bail!("conversion stopped before the input was exhausted");
                }
            }
            Commands::Verify { output_dir } => {
                verify_output(&output_dir)?;
            }
        }

        Ok(())
    }
}

/// Convert, write the streams and the manifest, return the manifest
pub fn run_convert(args: ConvertArgs) -> Result<Manifest> {
    let start = Instant::now();
    println!("🦋 Converting Overture segments");
    println!("📂 Segments: {}", args.segments.display());
    if let Some(path) = &args.connectors {
        println!("📂 Connectors: {}", path.display());
    }
    println!("📂 Output: {}", args.output_dir.display());
    println!();

    let mut transcoder = Transcoder::new(args.config).context("Invalid configuration")?;

    if let Some(path) = &args.connectors {
        println!("Loading connectors...");
        let connectors = read_connectors(path)
            .with_context(|| format!("Failed to read connectors from {}", path.display()))?;
        println!("  ✓ Found {} connectors", connectors.len());
        transcoder = transcoder.with_connectors(connectors);
    }

    println!("Resolving and assembling segments...");
    let segments = SegmentReader::open(&args.segments)
        .with_context(|| format!("Failed to open {}", args.segments.display()))?;
    let mut sink = StreamSink::create(&args.output_dir)
        .with_context(|| format!("Failed to create outputs in {}", args.output_dir.display()))?;

    let run = transcoder
        .run_with(segments, &mut sink, |progress| {
            debug!(
                segments_read = progress.segments_read,
                ways = progress.ways,
                "batch done"
            );
            true
        })
        .context("Conversion failed")?;
    let streams = sink.finish().context("Failed to flush record streams")?;

    println!("  ✓ Read {} segments", run.segments_read);
    println!(
        "  ✓ Wrote {} ways, {} nodes ({} connectors), {} way nodes",
        run.ways, run.nodes, run.connectors, run.way_nodes
    );
    if run.excluded_total() > 0 {
        for (kind, count) in &run.excluded {
            println!("  ⚠ Excluded {} segments: {}", count, kind);
        }
    }

    let manifest = Manifest::new(&streams, &run);
    manifest.write(manifest_path(&args.output_dir))?;

    println!();
    println!(
        "✅ Conversion complete in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(manifest)
}

fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}
