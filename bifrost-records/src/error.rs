//! Error types for record encoding and stream I/O

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    /// Fewer bytes than one full record were supplied to a decoder
    #[error("truncated {record}: need {expected} bytes, got {actual}")]
    TruncatedRecord {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A stream whose length is not a whole number of records
    #[error("{record} stream of {len} bytes is not a multiple of the {record_size}-byte record size")]
    MisalignedStream {
        record: &'static str,
        len: u64,
        record_size: usize,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, RecordError>;
