//! Header-less record streams
//!
//! A stream is the concatenation of encoded records with no header, trailer or
//! separator, so byte offset `i * R::SIZE` addresses record `i`. Writers only
//! append. A stream cut short at any record boundary is a valid prefix.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::Path;

use crc::{Crc, CRC_64_GO_ISO};

use crate::error::{RecordError, Result};
use crate::record::Record;

/// CRC-64-ISO, as recorded in the output manifest
pub static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

pub fn checksum(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}

/// What a finished (or verified) stream contains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub records: u64,
    pub bytes: u64,
    pub crc64: u64,
}

/// Buffered append-only writer of fixed-size records.
///
/// Keeps a record count and a running CRC-64 of every byte written.
pub struct RecordWriter<R: Record, W: Write> {
    sink: BufWriter<W>,
    digest: crc::Digest<'static, u64>,
    scratch: Vec<u8>,
    records: u64,
    _record: PhantomData<R>,
}

impl<R: Record, W: Write> RecordWriter<R, W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: BufWriter::with_capacity(R::SIZE * 1024, sink),
            digest: CRC64.digest(),
            scratch: vec![0u8; R::SIZE],
            records: 0,
            _record: PhantomData,
        }
    }

    pub fn append(&mut self, record: &R) -> Result<()> {
        record.encode_into(&mut self.scratch);
        self.sink.write_all(&self.scratch)?;
        self.digest.update(&self.scratch);
        self.records += 1;
        Ok(())
    }

    /// Records appended so far
    pub fn count(&self) -> u64 {
        self.records
    }

    /// Flush and return the sink together with the stream summary
    pub fn into_parts(self) -> Result<(W, StreamSummary)> {
        let summary = StreamSummary {
            records: self.records,
            bytes: self.records * R::SIZE as u64,
            crc64: self.digest.finalize(),
        };
        let sink = self
            .sink
            .into_inner()
            .map_err(|e| RecordError::Io(e.into_error()))?;
        Ok((sink, summary))
    }

    pub fn finish(self) -> Result<StreamSummary> {
        self.into_parts().map(|(_, summary)| summary)
    }
}

/// Write `records` contiguously to `sink`
pub fn write_stream<'a, R, W, I>(records: I, sink: W) -> Result<StreamSummary>
where
    R: Record + 'a,
    W: Write,
    I: IntoIterator<Item = &'a R>,
{
    let mut writer = RecordWriter::new(sink);
    for record in records {
        writer.append(record)?;
    }
    writer.finish()
}

fn check_alignment<R: Record>(len: u64) -> Result<()> {
    if len % R::SIZE as u64 != 0 {
        return Err(RecordError::MisalignedStream {
            record: R::NAME,
            len,
            record_size: R::SIZE,
        });
    }
    Ok(())
}

/// Decode a whole in-memory stream
pub fn decode_stream<R: Record>(bytes: &[u8]) -> Result<Vec<R>> {
    check_alignment::<R>(bytes.len() as u64)?;
    Ok(bytes.chunks_exact(R::SIZE).map(R::decode_unchecked).collect())
}

/// Iterates the records of a stream without loading it whole.
///
/// A trailing partial record yields `TruncatedRecord` and ends iteration.
pub struct RecordReader<R: Record, Rd: Read> {
    source: Rd,
    scratch: Vec<u8>,
    done: bool,
    _record: PhantomData<R>,
}

impl<R: Record, Rd: Read> RecordReader<R, Rd> {
    pub fn new(source: Rd) -> Self {
        Self {
            source,
            scratch: vec![0u8; R::SIZE],
            done: false,
            _record: PhantomData,
        }
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut filled = 0;
        while filled < R::SIZE {
            match self.source.read(&mut self.scratch[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Record> RecordReader<R, BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Record, Rd: Read> Iterator for RecordReader<R, Rd> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) if n < R::SIZE => {
                self.done = true;
                Some(Err(RecordError::TruncatedRecord {
                    record: R::NAME,
                    expected: R::SIZE,
                    actual: n,
                }))
            }
            Ok(_) => Some(Ok(R::decode_unchecked(&self.scratch))),
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Read a whole stream file
pub fn read_stream<R: Record, P: AsRef<Path>>(path: P) -> Result<Vec<R>> {
    let path = path.as_ref();
    check_alignment::<R>(std::fs::metadata(path)?.len())?;
    RecordReader::<R, _>::open(path)?.collect()
}

/// Check a stream file's alignment and recompute its record count and CRC-64
pub fn verify_stream<R: Record, P: AsRef<Path>>(path: P) -> Result<StreamSummary> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    check_alignment::<R>(len)?;

    let mut digest = CRC64.digest();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        digest.update(&buf[..n]);
    }

    Ok(StreamSummary {
        records: len / R::SIZE as u64,
        bytes: len,
        crc64: digest.finalize(),
    })
}
