//! Topology assembly: segments -> way, node and way-node records
//!
//! Split in two so the expensive part can run in parallel:
//!
//! - `Preparer::prepare` validates a segment, places its connectors and
//!   resolves its attributes. Pure; any order, any thread.
//! - `Assembler::assemble` hands out way indices and node identifiers and
//!   builds the records. Must see prepared segments in input order, because
//!   identifiers follow first-encounter order across the whole stream.
//!
//! A rejected segment never reaches the assembler, so it consumes no way
//! index and no node identifier.

pub mod placement;

use bifrost_records::{NodeAttributes, NodeRecord, WayNodeRecord, WayRecord};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::config::TranscodeConfig;
use crate::error::SegmentError;
use crate::model::{Connector, Coordinate, Segment};
use crate::profiles::{resolve, ResolvedAttributes};

pub use placement::{place_connectors, vertex_fractions, PlacementTolerance};

/// Node access mask: every engine mode (auto through motorcycle, 11 bits)
pub const ALL_NODE_ACCESS: u16 = 0x7FF;

/// Engine `NodeType::kStreetIntersection`
pub const STREET_INTERSECTION: u8 = 0;

/// A segment that passed validation, ready for identifier assignment
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSegment {
    pub segment_id: String,
    pub geometry: Vec<Coordinate>,
    /// Connector placed on each vertex, if any
    pub connectors: Vec<Option<PlacedConnector>>,
    pub attributes: ResolvedAttributes,
}

/// A connector tied to a vertex
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedConnector {
    pub id: String,
    /// The connector's own coordinate when known, else the vertex
    pub position: Coordinate,
}

/// Read-only context of the prepare stage
#[derive(Debug, Clone)]
pub struct Preparer {
    tolerance: PlacementTolerance,
    drive_on_right: bool,
    connector_positions: FxHashMap<String, Coordinate>,
}

impl Preparer {
    pub fn new(config: &TranscodeConfig) -> Self {
        Self {
            tolerance: PlacementTolerance {
                at: config.at_tolerance,
                coordinate_deg: config.coordinate_tolerance_deg,
            },
            drive_on_right: config.drive_on_right,
            connector_positions: FxHashMap::default(),
        }
    }

    /// Known connector coordinates, used for placement fallback and for
    /// the stored position of connector nodes
    pub fn with_connectors<I: IntoIterator<Item = Connector>>(mut self, connectors: I) -> Self {
        self.connector_positions
            .extend(connectors.into_iter().map(|c| (c.id, c.position)));
        self
    }

    pub fn connector_position(&self, id: &str) -> Option<Coordinate> {
        self.connector_positions.get(id).copied()
    }

    pub fn prepare(&self, segment: Segment) -> Result<PreparedSegment, SegmentError> {
        if segment.geometry.len() < 2 {
            return Err(SegmentError::DegenerateSegment {
                segment_id: segment.id,
                positions: segment.geometry.len(),
            });
        }

        let slots = place_connectors(
            &segment.id,
            &segment.geometry,
            &segment.connectors,
            &self.connector_positions,
            self.tolerance,
        )?;
        let attributes = resolve(&segment, self.drive_on_right);

        let connectors = slots
            .into_iter()
            .zip(segment.geometry.iter())
            .map(|(slot, vertex)| {
                slot.map(|i| {
                    let id = segment.connectors[i].connector_id.clone();
                    let position = self.connector_position(&id).unwrap_or(*vertex);
                    PlacedConnector { id, position }
                })
            })
            .collect();

        Ok(PreparedSegment {
            segment_id: segment.id,
            geometry: segment.geometry,
            connectors,
            attributes,
        })
    }
}

/// Records produced by one assembled segment
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledWay {
    pub way: WayRecord,
    pub way_index: u32,
    /// One per vertex, in coordinate order
    pub way_nodes: Vec<WayNodeRecord>,
    /// Nodes whose identifier was assigned by this segment
    pub new_nodes: Vec<NodeRecord>,
}

/// Sequential identifier assignment and record construction.
///
/// Owns the node-id counter and the connector -> node map; neither is
/// shared with the parallel prepare stage.
pub struct Assembler {
    way_id_base: u64,
    next_way_index: u32,
    next_node_id: u64,
    connector_nodes: FxHashMap<String, NodeRecord>,
}

fn node_record(osm_id: u64, position: Coordinate, intersection: bool) -> NodeRecord {
    NodeRecord {
        osm_id,
        attributes: NodeAttributes {
            access: ALL_NODE_ACCESS,
            node_type: STREET_INTERSECTION,
            intersection,
            ..Default::default()
        },
        ..Default::default()
    }
    .with_position(position.lon, position.lat)
}

impl Assembler {
    pub fn new(config: &TranscodeConfig) -> Self {
        Self {
            way_id_base: config.way_id_base,
            next_way_index: 0,
            next_node_id: config.node_id_base,
            connector_nodes: FxHashMap::default(),
        }
    }

    /// Distinct connectors seen so far
    pub fn connector_count(&self) -> usize {
        self.connector_nodes.len()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    pub fn assemble(&mut self, prepared: PreparedSegment) -> AssembledWay {
        let way_index = self.next_way_index;
        self.next_way_index += 1;

        let positions = prepared.geometry.len();
        if positions > u16::MAX as usize {
            warn!(
                segment_id = %prepared.segment_id,
                positions,
                "node count exceeds u16, wrapping"
            );
        }

        let mut way_nodes = Vec::with_capacity(positions);
        let mut new_nodes = Vec::new();

        for (shape_index, (vertex, connector)) in prepared
            .geometry
            .iter()
            .zip(prepared.connectors.iter())
            .enumerate()
        {
            let node = match connector {
                Some(placed) => match self.connector_nodes.get(&placed.id) {
                    Some(node) => *node,
                    None => {
                        let node = node_record(self.next_id(), placed.position, true);
                        self.connector_nodes.insert(placed.id.clone(), node);
                        new_nodes.push(node);
                        node
                    }
                },
                None => {
                    let node = node_record(self.next_id(), *vertex, false);
                    new_nodes.push(node);
                    node
                }
            };

            way_nodes.push(WayNodeRecord {
                node,
                way_index,
                way_shape_node_index: shape_index as u32,
            });
        }

        let way = prepared
            .attributes
            .way_record(self.way_id_base + way_index as u64, positions as u16);

        AssembledWay {
            way,
            way_index,
            way_nodes,
            new_nodes,
        }
    }
}
