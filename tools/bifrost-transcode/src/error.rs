//! Typed errors of the transcoding library
//!
//! `SegmentError` rejects one segment and the run carries on;
//! `TranscodeError` aborts the run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use bifrost_records::RecordError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("segment {segment_id}: {positions} coordinate position(s), at least 2 required")]
    DegenerateSegment { segment_id: String, positions: usize },

    #[error("segment {segment_id}: connector {connector_id} at {at} could not be placed ({reason})")]
    UnresolvedConnector {
        segment_id: String,
        connector_id: String,
        at: f64,
        reason: UnresolvedReason,
    },
}

/// Why a connector reference could not be tied to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No vertex within the `at` tolerance or the coordinate tolerance
    NoMatchingVertex,
    /// `at` is NaN or outside `[0, 1]`
    InvalidFraction,
    /// Another reference on the same segment already claimed the vertex
    VertexAlreadyClaimed,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoMatchingVertex => "no matching vertex",
            Self::InvalidFraction => "invalid fraction",
            Self::VertexAlreadyClaimed => "vertex already claimed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentErrorKind {
    DegenerateSegment,
    UnresolvedConnector,
}

impl SegmentErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DegenerateSegment => "degenerate_segment",
            Self::UnresolvedConnector => "unresolved_connector",
        }
    }
}

impl fmt::Display for SegmentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SegmentError {
    pub fn kind(&self) -> SegmentErrorKind {
        match self {
            Self::DegenerateSegment { .. } => SegmentErrorKind::DegenerateSegment,
            Self::UnresolvedConnector { .. } => SegmentErrorKind::UnresolvedConnector,
        }
    }

    pub fn segment_id(&self) -> &str {
        match self {
            Self::DegenerateSegment { segment_id, .. }
            | Self::UnresolvedConnector { segment_id, .. } => segment_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{path}:{line}: {message}")]
    Input {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl TranscodeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranscodeError>;
