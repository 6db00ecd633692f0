//! Declared bit-field layouts and manual packing
//!
//! The engine's records are C structs with bit-fields. Compilers do not agree
//! on bit-field placement across languages, so every packed word here is
//! described by an explicit ordered list of `(name, width)` pairs and packed by
//! hand. Placement follows the System V C ABI the engine is built with: fields
//! fill their storage unit in declaration order from the least significant bit
//! on little-endian targets and from the most significant bit on big-endian
//! targets.
//!
//! Values wider than their field are masked to the field width. This is the
//! engine's own behaviour (it performs no range checks), so an implausible lane
//! count or an oversized index wraps silently rather than failing the encode.

/// One named sub-field of a packed storage unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub width: u32,
}

pub const fn field(name: &'static str, width: u32) -> BitField {
    BitField { name, width }
}

/// Ordered description of one packed storage unit (`u16`, `u32` or `u64`).
#[derive(Debug, Clone, Copy)]
pub struct BitLayout {
    pub unit_bits: u32,
    pub fields: &'static [BitField],
}

impl BitLayout {
    pub const fn new(unit_bits: u32, fields: &'static [BitField]) -> Self {
        Self { unit_bits, fields }
    }

    /// Sum of all declared widths
    pub const fn total_width(&self) -> u32 {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].width;
            i += 1;
        }
        total
    }

    /// True when the declared fields exactly fill the storage unit
    pub const fn is_exact(&self) -> bool {
        self.total_width() == self.unit_bits
    }

    /// Bit offset of a field counted in declaration order (before endian placement)
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        let mut offset = 0;
        for f in self.fields {
            if f.name == name {
                return Some(offset);
            }
            offset += f.width;
        }
        None
    }

    pub fn writer(&self) -> BitWriter<'_> {
        BitWriter {
            layout: self,
            next: 0,
            offset: 0,
            word: 0,
        }
    }

    pub fn reader(&self, word: u64) -> BitReader<'_> {
        BitReader {
            layout: self,
            next: 0,
            offset: 0,
            word,
        }
    }

    /// Shift that places a field of `width` bits declared at `offset`
    fn shift(&self, offset: u32, width: u32) -> u32 {
        if cfg!(target_endian = "big") {
            self.unit_bits - offset - width
        } else {
            offset
        }
    }
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Packs values into a storage unit, one declared field at a time.
///
/// Fields must be supplied in declaration order; the name is checked against
/// the layout in debug builds so a reordered struct cannot silently shift bits.
pub struct BitWriter<'a> {
    layout: &'a BitLayout,
    next: usize,
    offset: u32,
    word: u64,
}

impl BitWriter<'_> {
    pub fn put(mut self, name: &str, value: u64) -> Self {
        let f = self.layout.fields[self.next];
        debug_assert_eq!(f.name, name, "bit-field written out of declaration order");
        let shift = self.layout.shift(self.offset, f.width);
        self.word |= (value & mask(f.width)) << shift;
        self.offset += f.width;
        self.next += 1;
        self
    }

    pub fn flag(self, name: &str, value: bool) -> Self {
        self.put(name, value as u64)
    }

    pub fn finish(self) -> u64 {
        debug_assert_eq!(
            self.next,
            self.layout.fields.len(),
            "bit-field layout not fully written"
        );
        self.word
    }
}

/// Unpacks a storage unit in declaration order.
pub struct BitReader<'a> {
    layout: &'a BitLayout,
    next: usize,
    offset: u32,
    word: u64,
}

impl BitReader<'_> {
    pub fn take(&mut self, name: &str) -> u64 {
        let f = self.layout.fields[self.next];
        debug_assert_eq!(f.name, name, "bit-field read out of declaration order");
        let shift = self.layout.shift(self.offset, f.width);
        let value = (self.word >> shift) & mask(f.width);
        self.offset += f.width;
        self.next += 1;
        value
    }

    pub fn flag(&mut self, name: &str) -> bool {
        self.take(name) != 0
    }

    /// Discard a field (spare bits)
    pub fn skip(&mut self, name: &str) {
        self.take(name);
    }
}

/// Sequential native-endian writer over a fixed record buffer.
pub(crate) struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.put(&v.to_ne_bytes());
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.put(&v.to_ne_bytes());
    }

    pub(crate) fn u16(&mut self, v: u16) {
        self.put(&v.to_ne_bytes());
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    pub(crate) fn i8(&mut self, v: i8) {
        self.put(&v.to_ne_bytes());
    }

    /// Zero-fill up to `end` (struct tail padding)
    pub(crate) fn pad_to(&mut self, end: usize) {
        self.buf[self.pos..end].fill(0);
        self.pos = end;
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

/// Sequential native-endian reader. Callers check the buffer length up front.
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    pub(crate) fn u64(&mut self) -> u64 {
        u64::from_ne_bytes(self.take())
    }

    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_ne_bytes(self.take())
    }

    pub(crate) fn u16(&mut self) -> u16 {
        u16::from_ne_bytes(self.take())
    }

    pub(crate) fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    pub(crate) fn i8(&mut self) -> i8 {
        i8::from_ne_bytes(self.take())
    }

    pub(crate) fn skip_to(&mut self, end: usize) {
        self.pos = end;
    }
}
