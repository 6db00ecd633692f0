//! Overture transportation segments -> Valhalla intermediate record streams
//!
//! `ingest` reads features, `profiles` resolves their attributes, `assemble`
//! builds the way/node/way-node topology and `pipeline` drives both over a
//! stream of segments into any `RecordSink`.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod profiles;
pub mod verify;

pub use assemble::{AssembledWay, Assembler, PreparedSegment, Preparer};
pub use config::TranscodeConfig;
pub use error::{Result, SegmentError, SegmentErrorKind, TranscodeError, UnresolvedReason};
pub use ingest::{read_connectors, ConnectorReader, SegmentReader};
pub use manifest::Manifest;
pub use model::{
    AccessAssignment, Connector, ConnectorRef, Coordinate, Disposition, Heading, Lanes, Mode,
    Segment, SpeedLimit, SpeedUnit,
};
pub use pipeline::{MemorySink, RecordSink, RunSummary, StreamSink, Transcoder};
pub use profiles::{resolve, resolve_access, Capability, ResolvedAttributes};
pub use verify::{verify_output, VerifyReport};
