//! Common contract of the three fixed-size records

use crate::error::{RecordError, Result};

/// A fixed-size, header-less record of one of the engine's binary streams.
///
/// Byte offset `i * SIZE` is the only addressing scheme a stream has.
pub trait Record: Sized {
    /// Size in bytes, tail padding included (`sizeof` of the C struct)
    const SIZE: usize;
    /// Name used in diagnostics
    const NAME: &'static str;

    /// Encode into `out`, which is exactly `SIZE` bytes long.
    ///
    /// Never fails: values that overflow their bit-field are masked to fit.
    fn encode_into(&self, out: &mut [u8]);

    /// Decode from the first `SIZE` bytes of `bytes`.
    fn decode_unchecked(bytes: &[u8]) -> Self;

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Decode one record, failing when fewer than `SIZE` bytes are supplied.
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(RecordError::TruncatedRecord {
                record: Self::NAME,
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self::decode_unchecked(&bytes[..Self::SIZE]))
    }
}
