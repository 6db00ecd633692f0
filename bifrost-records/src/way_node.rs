//! OSMWayNode record - one per (way, shape position) pair (way_nodes.bin)
//!
//! Layout (native-endian, 56 bytes):
//!
//!   node:                  [48]u8   // embedded OSMNode
//!   way_index:             u32      // 0-based index into ways.bin
//!   way_shape_node_index:  u32      // 0-based position along the way

use crate::bits::{ByteReader, ByteWriter};
use crate::node::{NodeRecord, NODE_RECORD_SIZE};
use crate::record::Record;

pub const WAY_NODE_RECORD_SIZE: usize = 56;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayNodeRecord {
    pub node: NodeRecord,
    pub way_index: u32,
    pub way_shape_node_index: u32,
}

impl Record for WayNodeRecord {
    const SIZE: usize = WAY_NODE_RECORD_SIZE;
    const NAME: &'static str = "OSMWayNode";

    fn encode_into(&self, out: &mut [u8]) {
        let mut w = ByteWriter::new(out);
        self.node.write(&mut w);
        debug_assert_eq!(w.position(), NODE_RECORD_SIZE);
        w.u32(self.way_index);
        w.u32(self.way_shape_node_index);
    }

    fn decode_unchecked(bytes: &[u8]) -> Self {
        let mut r = ByteReader::new(bytes);
        let node = NodeRecord::read(&mut r);
        Self {
            node,
            way_index: r.u32(),
            way_shape_node_index: r.u32(),
        }
    }
}
