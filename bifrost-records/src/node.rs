//! OSMNode record (nodes.bin, and embedded in every OSMWayNode)
//!
//! Layout (native-endian, 48 bytes):
//!
//!   osm_id:                 u64
//!   names:                  u64   // NODE_NAME_LAYOUT
//!   controls:               u64   // NODE_CONTROL_LAYOUT
//!   attributes:             u32   // NODE_ATTRIBUTE_LAYOUT
//!   bss_info:               u32
//!   linguistic_info_index:  u32
//!   lng7:                   u32   // (lon + 180) * 1e7
//!   lat7:                   u32   // (lat + 90) * 1e7
//!   padding:                [4]u8

use crate::bits::{field, BitLayout, ByteReader, ByteWriter};
use crate::record::Record;

pub const NODE_RECORD_SIZE: usize = 48;

/// Fixed-point scale of `lat7`/`lng7`
pub const COORDINATE_SCALE: f64 = 1e7;

pub const NODE_NAME_LAYOUT: BitLayout = BitLayout::new(
    64,
    &[
        field("name_index", 21),
        field("ref_index", 21),
        field("exit_to_index", 21),
        field("named_intersection", 1),
    ],
);

pub const NODE_CONTROL_LAYOUT: BitLayout = BitLayout::new(
    64,
    &[
        field("country_iso_index", 21),
        field("state_iso_index", 21),
        field("traffic_signal", 1),
        field("forward_signal", 1),
        field("backward_signal", 1),
        field("stop_sign", 1),
        field("forward_stop", 1),
        field("backward_stop", 1),
        field("yield_sign", 1),
        field("forward_yield", 1),
        field("backward_yield", 1),
        field("minor", 1),
        field("direction", 1),
        field("spare", 11),
    ],
);

pub const NODE_ATTRIBUTE_LAYOUT: BitLayout = BitLayout::new(
    32,
    &[
        field("access", 12),
        field("type", 4),
        field("intersection", 1),
        field("non_link_edge", 1),
        field("link_edge", 1),
        field("shortlink", 1),
        field("non_ferry_edge", 1),
        field("ferry_edge", 1),
        field("flat_loop", 1),
        field("urban", 1),
        field("tagged_access", 1),
        field("private_access", 1),
        field("cash_only_toll", 1),
        field("spare", 5),
    ],
);

const _: () = assert!(NODE_NAME_LAYOUT.is_exact());
const _: () = assert!(NODE_CONTROL_LAYOUT.is_exact());
const _: () = assert!(NODE_ATTRIBUTE_LAYOUT.is_exact());

/// Encode a latitude in degrees as the engine's offset fixed-point value.
///
/// Out-of-range input saturates at the ends of the `u32` range.
pub fn lat_to_fixed(lat: f64) -> u32 {
    ((lat + 90.0) * COORDINATE_SCALE).round() as u32
}

pub fn lng_to_fixed(lng: f64) -> u32 {
    ((lng + 180.0) * COORDINATE_SCALE).round() as u32
}

pub fn fixed_to_lat(lat7: u32) -> f64 {
    lat7 as f64 / COORDINATE_SCALE - 90.0
}

pub fn fixed_to_lng(lng7: u32) -> f64 {
    lng7 as f64 / COORDINATE_SCALE - 180.0
}

/// String-table references carried in the name word (21 bits each)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeNames {
    pub name_index: u32,
    pub ref_index: u32,
    pub exit_to_index: u32,
    pub named_intersection: bool,
}

impl NodeNames {
    pub fn pack(&self) -> u64 {
        NODE_NAME_LAYOUT
            .writer()
            .put("name_index", self.name_index.into())
            .put("ref_index", self.ref_index.into())
            .put("exit_to_index", self.exit_to_index.into())
            .flag("named_intersection", self.named_intersection)
            .finish()
    }

    pub fn unpack(word: u64) -> Self {
        let mut r = NODE_NAME_LAYOUT.reader(word);
        Self {
            name_index: r.take("name_index") as u32,
            ref_index: r.take("ref_index") as u32,
            exit_to_index: r.take("exit_to_index") as u32,
            named_intersection: r.flag("named_intersection"),
        }
    }
}

/// Region indices and traffic-control flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeControls {
    pub country_iso_index: u32,
    pub state_iso_index: u32,
    pub traffic_signal: bool,
    pub forward_signal: bool,
    pub backward_signal: bool,
    pub stop_sign: bool,
    pub forward_stop: bool,
    pub backward_stop: bool,
    pub yield_sign: bool,
    pub forward_yield: bool,
    pub backward_yield: bool,
    pub minor: bool,
    pub direction: bool,
}

impl NodeControls {
    pub fn pack(&self) -> u64 {
        NODE_CONTROL_LAYOUT
            .writer()
            .put("country_iso_index", self.country_iso_index.into())
            .put("state_iso_index", self.state_iso_index.into())
            .flag("traffic_signal", self.traffic_signal)
            .flag("forward_signal", self.forward_signal)
            .flag("backward_signal", self.backward_signal)
            .flag("stop_sign", self.stop_sign)
            .flag("forward_stop", self.forward_stop)
            .flag("backward_stop", self.backward_stop)
            .flag("yield_sign", self.yield_sign)
            .flag("forward_yield", self.forward_yield)
            .flag("backward_yield", self.backward_yield)
            .flag("minor", self.minor)
            .flag("direction", self.direction)
            .put("spare", 0)
            .finish()
    }

    pub fn unpack(word: u64) -> Self {
        let mut r = NODE_CONTROL_LAYOUT.reader(word);
        let out = Self {
            country_iso_index: r.take("country_iso_index") as u32,
            state_iso_index: r.take("state_iso_index") as u32,
            traffic_signal: r.flag("traffic_signal"),
            forward_signal: r.flag("forward_signal"),
            backward_signal: r.flag("backward_signal"),
            stop_sign: r.flag("stop_sign"),
            forward_stop: r.flag("forward_stop"),
            backward_stop: r.flag("backward_stop"),
            yield_sign: r.flag("yield_sign"),
            forward_yield: r.flag("forward_yield"),
            backward_yield: r.flag("backward_yield"),
            minor: r.flag("minor"),
            direction: r.flag("direction"),
        };
        r.skip("spare");
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    /// 12-bit mode mask
    pub access: u16,
    /// 4 bits, engine `NodeType`
    pub node_type: u8,
    pub intersection: bool,
    pub non_link_edge: bool,
    pub link_edge: bool,
    pub shortlink: bool,
    pub non_ferry_edge: bool,
    pub ferry_edge: bool,
    pub flat_loop: bool,
    pub urban: bool,
    pub tagged_access: bool,
    pub private_access: bool,
    pub cash_only_toll: bool,
}

impl NodeAttributes {
    pub fn pack(&self) -> u32 {
        NODE_ATTRIBUTE_LAYOUT
            .writer()
            .put("access", self.access.into())
            .put("type", self.node_type.into())
            .flag("intersection", self.intersection)
            .flag("non_link_edge", self.non_link_edge)
            .flag("link_edge", self.link_edge)
            .flag("shortlink", self.shortlink)
            .flag("non_ferry_edge", self.non_ferry_edge)
            .flag("ferry_edge", self.ferry_edge)
            .flag("flat_loop", self.flat_loop)
            .flag("urban", self.urban)
            .flag("tagged_access", self.tagged_access)
            .flag("private_access", self.private_access)
            .flag("cash_only_toll", self.cash_only_toll)
            .put("spare", 0)
            .finish() as u32
    }

    pub fn unpack(word: u32) -> Self {
        let mut r = NODE_ATTRIBUTE_LAYOUT.reader(word.into());
        let out = Self {
            access: r.take("access") as u16,
            node_type: r.take("type") as u8,
            intersection: r.flag("intersection"),
            non_link_edge: r.flag("non_link_edge"),
            link_edge: r.flag("link_edge"),
            shortlink: r.flag("shortlink"),
            non_ferry_edge: r.flag("non_ferry_edge"),
            ferry_edge: r.flag("ferry_edge"),
            flat_loop: r.flag("flat_loop"),
            urban: r.flag("urban"),
            tagged_access: r.flag("tagged_access"),
            private_access: r.flag("private_access"),
            cash_only_toll: r.flag("cash_only_toll"),
        };
        r.skip("spare");
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeRecord {
    pub osm_id: u64,
    pub names: NodeNames,
    pub controls: NodeControls,
    pub attributes: NodeAttributes,
    pub bss_info: u32,
    pub linguistic_info_index: u32,
    pub lng7: u32,
    pub lat7: u32,
}

impl NodeRecord {
    /// Set the fixed-point position from degrees
    pub fn with_position(mut self, lon: f64, lat: f64) -> Self {
        self.lng7 = lng_to_fixed(lon);
        self.lat7 = lat_to_fixed(lat);
        self
    }

    /// Decoded `(lon, lat)` in degrees
    pub fn position(&self) -> (f64, f64) {
        (fixed_to_lng(self.lng7), fixed_to_lat(self.lat7))
    }

    pub(crate) fn write(&self, w: &mut ByteWriter<'_>) {
        w.u64(self.osm_id);
        w.u64(self.names.pack());
        w.u64(self.controls.pack());
        w.u32(self.attributes.pack());
        w.u32(self.bss_info);
        w.u32(self.linguistic_info_index);
        w.u32(self.lng7);
        w.u32(self.lat7);
        w.pad_to(NODE_RECORD_SIZE);
    }

    pub(crate) fn read(r: &mut ByteReader<'_>) -> Self {
        let node = Self {
            osm_id: r.u64(),
            names: NodeNames::unpack(r.u64()),
            controls: NodeControls::unpack(r.u64()),
            attributes: NodeAttributes::unpack(r.u32()),
            bss_info: r.u32(),
            linguistic_info_index: r.u32(),
            lng7: r.u32(),
            lat7: r.u32(),
        };
        r.skip_to(NODE_RECORD_SIZE);
        node
    }
}

impl Record for NodeRecord {
    const SIZE: usize = NODE_RECORD_SIZE;
    const NAME: &'static str = "OSMNode";

    fn encode_into(&self, out: &mut [u8]) {
        self.write(&mut ByteWriter::new(out));
    }

    fn decode_unchecked(bytes: &[u8]) -> Self {
        Self::read(&mut ByteReader::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point_rounds() {
        assert_eq!(lat_to_fixed(0.0), 900_000_000);
        assert_eq!(lng_to_fixed(0.0), 1_800_000_000);
        assert_eq!(lat_to_fixed(-90.0), 0);
        assert_eq!(lat_to_fixed(90.0), 1_800_000_000);
        assert_eq!(lng_to_fixed(180.0), 3_600_000_000);
        // 0.00000006 is closer to 1e-7 than to 0
        assert_eq!(lat_to_fixed(0.000_000_06), 900_000_001);
        assert_eq!(lat_to_fixed(0.000_000_04), 900_000_000);
    }

    #[test]
    fn test_position_round_trip() {
        let node = NodeRecord::default().with_position(-122.419_415_5, 37.774_929_5);
        let (lon, lat) = node.position();
        assert!((lon + 122.419_415_5).abs() < 1e-7);
        assert!((lat - 37.774_929_5).abs() < 1e-7);
    }

    #[test]
    fn test_field_offsets() {
        let node = NodeRecord {
            osm_id: 0x0102_0304_0506_0708,
            bss_info: 11,
            linguistic_info_index: 22,
            lng7: 33,
            lat7: 44,
            ..Default::default()
        };
        let bytes = node.encode();
        assert_eq!(bytes.len(), NODE_RECORD_SIZE);
        assert_eq!(&bytes[0..8], &0x0102_0304_0506_0708u64.to_ne_bytes());
        assert_eq!(&bytes[28..32], &11u32.to_ne_bytes());
        assert_eq!(&bytes[32..36], &22u32.to_ne_bytes());
        assert_eq!(&bytes[36..40], &33u32.to_ne_bytes());
        assert_eq!(&bytes[40..44], &44u32.to_ne_bytes());
        assert_eq!(&bytes[44..48], &[0u8; 4]);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_attribute_bits() {
        let attrs = NodeAttributes {
            access: 2047,
            node_type: 0,
            intersection: true,
            ..Default::default()
        };
        assert_eq!(attrs.pack(), 2047 | (1 << 16));
    }

    #[test]
    fn test_name_index_wraps_at_21_bits() {
        let names = NodeNames {
            name_index: (1 << 21) + 5,
            ..Default::default()
        };
        assert_eq!(NodeNames::unpack(names.pack()).name_index, 5);
    }
}
