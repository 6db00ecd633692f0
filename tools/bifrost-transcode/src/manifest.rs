//! `manifest.json`: what a convert run wrote
//!
//! The record streams are header-less, so record counts and checksums live
//! here. `verify` checks the streams against it.

use anyhow::{Context, Result};
use bifrost_records::{NodeRecord, Record, StreamSummary, WayNodeRecord, WayRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::pipeline::{RunSummary, StreamSummaries, NODES_FILE, WAYS_FILE, WAY_NODES_FILE};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub file: String,
    pub record_size: usize,
    pub records: u64,
    /// CRC-64/GO-ISO of the whole file, lower-case hex
    pub crc64: String,
}

impl StreamEntry {
    fn new<R: Record>(file: &str, summary: &StreamSummary) -> Self {
        Self {
            file: file.to_string(),
            record_size: R::SIZE,
            records: summary.records,
            crc64: format!("{:016x}", summary.crc64),
        }
    }

    pub fn crc64_value(&self) -> Result<u64> {
        u64::from_str_radix(&self.crc64, 16)
            .with_context(|| format!("Invalid crc64 {:?} for {}", self.crc64, self.file))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streams {
    pub ways: StreamEntry,
    pub nodes: StreamEntry,
    pub way_nodes: StreamEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub tool_version: String,
    pub streams: Streams,
    pub segments_read: u64,
    pub connectors: u64,
    /// Excluded segments per reason (`degenerate_segment`, `unresolved_connector`)
    pub excluded: BTreeMap<String, u64>,
    pub cancelled: bool,
}

impl Manifest {
    pub fn new(streams: &StreamSummaries, run: &RunSummary) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            streams: Streams {
                ways: StreamEntry::new::<WayRecord>(WAYS_FILE, &streams.ways),
                nodes: StreamEntry::new::<NodeRecord>(NODES_FILE, &streams.nodes),
                way_nodes: StreamEntry::new::<WayNodeRecord>(WAY_NODES_FILE, &streams.way_nodes),
            },
            segments_read: run.segments_read,
            connectors: run.connectors,
            excluded: run
                .excluded
                .iter()
                .map(|(kind, count)| (kind.as_str().to_string(), *count))
                .collect(),
            cancelled: run.cancelled,
        }
    }

    /// Write manifest to disk
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        println!("  ✓ Wrote {}", path.display());
        Ok(())
    }

    /// Read manifest from disk
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let manifest = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(manifest)
    }
}
