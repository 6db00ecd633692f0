//! JSON-lines readers for segment and connector features
//!
//! Blank lines are skipped. A line that does not parse is an input error
//! carrying its 1-based line number; it is not a segment rejection.

pub mod overture;

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{Result, TranscodeError};
use crate::model::{Connector, Segment};
use overture::{ConnectorFeature, SegmentFeature};

/// Streams features of type `T` (decoded from `F`) from a JSON-lines source
pub struct FeatureReader<R: BufRead, F, T> {
    path: PathBuf,
    lines: Lines<R>,
    line: usize,
    _types: PhantomData<fn(F) -> T>,
}

pub type SegmentReader<R> = FeatureReader<R, SegmentFeature, Segment>;
pub type ConnectorReader<R> = FeatureReader<R, ConnectorFeature, Connector>;

impl<R: BufRead, F, T> FeatureReader<R, F, T> {
    /// `path` only labels errors
    pub fn new(source: R, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: source.lines(),
            line: 0,
            _types: PhantomData,
        }
    }

    fn input_error(&self, message: String) -> TranscodeError {
        TranscodeError::Input {
            path: self.path.clone(),
            line: self.line,
            message,
        }
    }
}

impl<F, T> FeatureReader<BufReader<File>, F, T> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TranscodeError::io(path, e))?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R, F, T> Iterator for FeatureReader<R, F, T>
where
    R: BufRead,
    F: DeserializeOwned,
    T: TryFrom<F>,
    T::Error: ToString,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(TranscodeError::io(self.path.clone(), e))),
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }

            let parsed = serde_json::from_str::<F>(&line)
                .map_err(|e| self.input_error(e.to_string()))
                .and_then(|feature| {
                    T::try_from(feature).map_err(|e| self.input_error(e.to_string()))
                });
            return Some(parsed);
        }
    }
}

/// Read a whole connector file
pub fn read_connectors<P: AsRef<Path>>(path: P) -> Result<Vec<Connector>> {
    ConnectorReader::open(path)?.collect()
}
