//! Resolve/assemble pipeline
//!
//! Segments are read in batches. Each batch is prepared in parallel on the
//! rayon pool (`collect` keeps input order), then assembled and written on the
//! calling thread in input order. Rejected segments are logged and counted.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use bifrost_records::{NodeRecord, RecordWriter, StreamSummary, WayNodeRecord, WayRecord};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::assemble::{AssembledWay, Assembler, PreparedSegment, Preparer};
use crate::config::TranscodeConfig;
use crate::error::{Result, SegmentError, SegmentErrorKind, TranscodeError};
use crate::model::{Connector, Segment};

pub const WAYS_FILE: &str = "ways.bin";
pub const NODES_FILE: &str = "nodes.bin";
pub const WAY_NODES_FILE: &str = "way_nodes.bin";

type Prepared = std::result::Result<PreparedSegment, SegmentError>;

/// Destination of the three record streams. Append-only.
pub trait RecordSink {
    fn way(&mut self, way: &WayRecord) -> Result<()>;
    fn node(&mut self, node: &NodeRecord) -> Result<()>;
    fn way_node(&mut self, way_node: &WayNodeRecord) -> Result<()>;

    fn write_assembled(&mut self, assembled: &AssembledWay) -> Result<()> {
        for node in &assembled.new_nodes {
            self.node(node)?;
        }
        for way_node in &assembled.way_nodes {
            self.way_node(way_node)?;
        }
        self.way(&assembled.way)
    }
}

/// Keeps everything in memory
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemorySink {
    pub ways: Vec<WayRecord>,
    pub nodes: Vec<NodeRecord>,
    pub way_nodes: Vec<WayNodeRecord>,
}

impl RecordSink for MemorySink {
    fn way(&mut self, way: &WayRecord) -> Result<()> {
        self.ways.push(*way);
        Ok(())
    }

    fn node(&mut self, node: &NodeRecord) -> Result<()> {
        self.nodes.push(*node);
        Ok(())
    }

    fn way_node(&mut self, way_node: &WayNodeRecord) -> Result<()> {
        self.way_nodes.push(*way_node);
        Ok(())
    }
}

/// Summaries of the three finished streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummaries {
    pub ways: StreamSummary,
    pub nodes: StreamSummary,
    pub way_nodes: StreamSummary,
}

/// Buffered writers for `ways.bin`, `nodes.bin` and `way_nodes.bin`
pub struct StreamSink<W: Write> {
    ways: RecordWriter<WayRecord, W>,
    nodes: RecordWriter<NodeRecord, W>,
    way_nodes: RecordWriter<WayNodeRecord, W>,
}

impl<W: Write> StreamSink<W> {
    pub fn new(ways: W, nodes: W, way_nodes: W) -> Self {
        Self {
            ways: RecordWriter::new(ways),
            nodes: RecordWriter::new(nodes),
            way_nodes: RecordWriter::new(way_nodes),
        }
    }

    pub fn finish(self) -> Result<StreamSummaries> {
        Ok(StreamSummaries {
            ways: self.ways.finish()?,
            nodes: self.nodes.finish()?,
            way_nodes: self.way_nodes.finish()?,
        })
    }
}

impl StreamSink<File> {
    /// Create (truncating) the three stream files in `dir`
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| TranscodeError::io(dir, e))?;
        let open = |name: &str| -> Result<File> {
            let path: PathBuf = dir.join(name);
            File::create(&path).map_err(|e| TranscodeError::io(path, e))
        };
        Ok(Self::new(
            open(WAYS_FILE)?,
            open(NODES_FILE)?,
            open(WAY_NODES_FILE)?,
        ))
    }
}

impl<W: Write> RecordSink for StreamSink<W> {
    fn way(&mut self, way: &WayRecord) -> Result<()> {
        Ok(self.ways.append(way)?)
    }

    fn node(&mut self, node: &NodeRecord) -> Result<()> {
        Ok(self.nodes.append(node)?)
    }

    fn way_node(&mut self, way_node: &WayNodeRecord) -> Result<()> {
        Ok(self.way_nodes.append(way_node)?)
    }
}

/// Counters of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub segments_read: u64,
    pub ways: u64,
    pub nodes: u64,
    pub way_nodes: u64,
    pub connectors: u64,
    pub excluded: BTreeMap<SegmentErrorKind, u64>,
    /// The caller stopped the run before the input was exhausted
    pub cancelled: bool,
}

impl RunSummary {
    pub fn excluded_total(&self) -> u64 {
        self.excluded.values().sum()
    }

    fn record_rejection(&mut self, err: &SegmentError) {
        debug!(
            segment_id = %err.segment_id(),
            reason = %err.kind(),
            "excluding segment: {err}"
        );
        *self.excluded.entry(err.kind()).or_insert(0) += 1;
    }
}

pub struct Transcoder {
    config: TranscodeConfig,
    preparer: Preparer,
    pool: Option<rayon::ThreadPool>,
}

impl Transcoder {
    pub fn new(config: TranscodeConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| TranscodeError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            preparer: Preparer::new(&config),
            config,
            pool,
        })
    }

    /// Connector records used to place references and position connector nodes
    pub fn with_connectors<I: IntoIterator<Item = Connector>>(mut self, connectors: I) -> Self {
        self.preparer = self.preparer.with_connectors(connectors);
        self
    }

    pub fn run<I, S>(&self, segments: I, sink: &mut S) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Segment>,
        S: RecordSink,
    {
        self.run_with(segments.into_iter().map(Ok), sink, |_| true)
    }

    /// Run over fallible input, polling `should_continue` before every batch.
    ///
    /// An input error aborts the run; what was written so far stays a valid
    /// prefix of every stream.
    pub fn run_with<I, S, F>(
        &self,
        segments: I,
        sink: &mut S,
        mut should_continue: F,
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Segment>>,
        S: RecordSink,
        F: FnMut(&RunSummary) -> bool,
    {
        info!(
            batch_size = self.config.batch_size,
            threads = ?self.config.threads,
            "transcode started"
        );

        let mut assembler = Assembler::new(&self.config);
        let mut summary = RunSummary::default();
        let mut input = segments.into_iter().peekable();

        while input.peek().is_some() {
            if !should_continue(&summary) {
                summary.cancelled = true;
                info!(segments_read = summary.segments_read, "transcode cancelled");
                break;
            }

            let mut batch = Vec::with_capacity(self.config.batch_size);
            for segment in input.by_ref().take(self.config.batch_size) {
                batch.push(segment?);
            }
            summary.segments_read += batch.len() as u64;

            for prepared in self.prepare_batch(batch) {
                match prepared {
                    Ok(prepared) => {
                        let assembled = assembler.assemble(prepared);
                        sink.write_assembled(&assembled)?;
                        summary.ways += 1;
                        summary.nodes += assembled.new_nodes.len() as u64;
                        summary.way_nodes += assembled.way_nodes.len() as u64;
                    }
                    Err(err) => summary.record_rejection(&err),
                }
            }
        }

        summary.connectors = assembler.connector_count() as u64;
        info!(
            segments = summary.segments_read,
            ways = summary.ways,
            nodes = summary.nodes,
            way_nodes = summary.way_nodes,
            excluded = summary.excluded_total(),
            "transcode finished"
        );
        Ok(summary)
    }

    fn prepare_batch(&self, batch: Vec<Segment>) -> Vec<Prepared> {
        let prepare = || -> Vec<Prepared> {
            batch
                .into_par_iter()
                .map(|s| self.preparer.prepare(s))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(prepare),
            None => prepare(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    fn segment(id: &str, n: usize) -> Segment {
        let geometry = (0..n)
            .map(|i| Coordinate::new(0.001 * i as f64, 0.0))
            .collect();
        Segment::new(id, geometry)
    }

    #[test]
    fn test_rejections_counted_not_emitted() {
        let transcoder = Transcoder::new(TranscodeConfig::default()).unwrap();
        let mut sink = MemorySink::default();
        let input = vec![
            segment("ok-1", 2),
            segment("degenerate", 1),
            segment("ok-2", 3).with_connector("X", 0.42),
            segment("ok-3", 2),
        ];

        let summary = transcoder.run(input, &mut sink).unwrap();
        assert_eq!(summary.segments_read, 4);
        assert_eq!(summary.ways, 2);
        assert_eq!(summary.excluded[&SegmentErrorKind::DegenerateSegment], 1);
        assert_eq!(summary.excluded[&SegmentErrorKind::UnresolvedConnector], 1);
        assert_eq!(summary.excluded_total(), 2);

        // rejected segments consume no way index and no node id
        assert_eq!(sink.ways[1].way_id, 2);
        assert_eq!(sink.nodes.last().unwrap().osm_id, 4);
        assert_eq!(sink.way_nodes[2].way_index, 1);
    }

    #[test]
    fn test_batches_preserve_order() {
        let config = TranscodeConfig {
            batch_size: 3,
            threads: Some(2),
            ..Default::default()
        };
        let transcoder = Transcoder::new(config).unwrap();
        let mut sink = MemorySink::default();
        let input: Vec<Segment> = (0..10).map(|i| segment(&format!("s{i}"), 2)).collect();

        transcoder.run(input, &mut sink).unwrap();
        let ids: Vec<u64> = sink.ways.iter().map(|w| w.way_id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        let node_ids: Vec<u64> = sink.nodes.iter().map(|n| n.osm_id).collect();
        assert_eq!(node_ids, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancellation_between_batches() {
        let config = TranscodeConfig {
            batch_size: 2,
            ..Default::default()
        };
        let transcoder = Transcoder::new(config).unwrap();
        let mut sink = MemorySink::default();
        let input = (0..10).map(|i| Ok(segment(&format!("s{i}"), 2)));

        let summary = transcoder
            .run_with(input, &mut sink, |progress| progress.segments_read < 4)
            .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.segments_read, 4);
        assert_eq!(sink.ways.len(), 4);
        assert_eq!(sink.way_nodes.len(), 8);
    }

    #[test]
    fn test_input_error_aborts() {
        let transcoder = Transcoder::new(TranscodeConfig::default()).unwrap();
        let mut sink = MemorySink::default();
        let input = vec![
            Ok(segment("a", 2)),
            Err(TranscodeError::Config("bad line".into())),
        ];
        assert!(transcoder.run_with(input, &mut sink, |_| true).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TranscodeConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Transcoder::new(config),
            Err(TranscodeError::Config(_))
        ));
    }

    #[test]
    fn test_stream_sink_summaries() {
        let mut sink = StreamSink::new(Vec::new(), Vec::new(), Vec::new());
        let transcoder = Transcoder::new(TranscodeConfig::default()).unwrap();
        transcoder
            .run(vec![segment("a", 3), segment("b", 2)], &mut sink)
            .unwrap();
        let summaries = sink.finish().unwrap();
        assert_eq!(summaries.ways.records, 2);
        assert_eq!(summaries.nodes.records, 5);
        assert_eq!(summaries.way_nodes.records, 5);
        assert_eq!(summaries.way_nodes.bytes, 5 * 56);
    }
}
