//! Byte-exact codec for Valhalla's intermediate way/node records
//!
//! Valhalla's `valhalla_build_tiles` reads `ways.bin`, `nodes.bin` and
//! `way_nodes.bin` as raw memory dumps of its `OSMWay`, `OSMNode` and
//! `OSMWayNode` structs. This crate encodes and decodes those records one
//! field at a time so the produced bytes match the C layout without relying
//! on Rust struct layout.

pub mod bits;
pub mod error;
pub mod node;
pub mod record;
pub mod stream;
pub mod way;
pub mod way_node;

pub use error::{RecordError, Result};
pub use node::{NodeAttributes, NodeControls, NodeNames, NodeRecord, NODE_RECORD_SIZE};
pub use record::Record;
pub use stream::{
    checksum, decode_stream, read_stream, verify_stream, write_stream, RecordReader,
    RecordWriter, StreamSummary,
};
pub use way::{
    VehicleAccess, WayAccess, WayAttributes, WayBikeAttributes, WayClassification, WayRecord,
    WaySpeeds, WayStringRefs, WAY_RECORD_SIZE,
};
pub use way_node::{WayNodeRecord, WAY_NODE_RECORD_SIZE};
