//! Attribute resolution: Overture tag sets -> the engine's single-valued way fields
//!
//! Every function here is pure, so segments can be resolved in parallel.

pub mod access;
pub mod classification;
pub mod speed;
pub mod surface;

pub use access::{resolve_access, AccessDecision, AccessTable, Capability};
pub use classification::{classify, road_class, Classification, RoadClass, Use};
pub use speed::{resolve_speed, to_kmh, ResolvedSpeed};
pub use surface::{resolve_surface, Surface};

use bifrost_records::{
    VehicleAccess, WayAccess, WayAttributes, WayBikeAttributes, WayClassification, WayRecord,
    WaySpeeds,
};

use crate::model::{Heading, Lanes, Segment};

/// Everything the way record needs from a segment's tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAttributes {
    pub classification: Classification,
    pub surface: Surface,
    pub access: AccessTable,
    pub speed: ResolvedSpeed,
    pub lanes: Lanes,
    pub drive_on_right: bool,
}

pub fn resolve(segment: &Segment, drive_on_right: bool) -> ResolvedAttributes {
    let classification = classify(
        segment.subtype.as_deref(),
        segment.class.as_deref(),
        segment.subclass.as_deref(),
    );
    ResolvedAttributes {
        classification,
        surface: resolve_surface(segment.surface.as_deref()),
        access: AccessTable::resolve(&segment.access),
        speed: resolve_speed(&segment.speed_limits, classification.road_class),
        lanes: segment.lanes,
        drive_on_right,
    }
}

impl ResolvedAttributes {
    fn vehicle_access(&self, heading: Heading) -> VehicleAccess {
        let auto = self.access.permits(Capability::Auto, heading);
        VehicleAccess {
            auto,
            bus: self.access.permits(Capability::Bus, heading),
            taxi: auto,
            truck: self.access.permits(Capability::Truck, heading),
            motorcycle: auto,
            emergency: auto,
            hov: auto,
            moped: auto,
        }
    }

    /// The way record for this segment, string references left empty
    pub fn way_record(&self, way_id: u64, node_count: u16) -> WayRecord {
        let c = &self.classification;
        let s = &self.speed;
        let l = &self.lanes;

        WayRecord {
            way_id,
            node_count,
            attributes: WayAttributes {
                oneway: self.access.oneway(),
                oneway_reverse: self.access.oneway_reverse(),
                ferry: c.ferry,
                rail: c.rail,
                surface: self.surface.code(),
                drive_on_right: self.drive_on_right,
                tagged_speed: s.tagged,
                forward_tagged_speed: s.forward_tagged,
                backward_tagged_speed: s.backward_tagged,
                tagged_lanes: l.total.is_some(),
                forward_tagged_lanes: l.forward.is_some(),
                backward_tagged_lanes: l.backward.is_some(),
                ..Default::default()
            },
            classification: WayClassification {
                road_class: c.road_class.code(),
                link: c.link,
                use_code: c.usage.code(),
                lanes: l.total.unwrap_or(0),
                forward_lanes: l.forward.unwrap_or(0),
                backward_lanes: l.backward.unwrap_or(0),
                turn_channel: c.turn_channel,
                pedestrian_forward: self.access.permits(Capability::Pedestrian, Heading::Forward),
                pedestrian_backward: self
                    .access
                    .permits(Capability::Pedestrian, Heading::Backward),
                ..Default::default()
            },
            access: WayAccess {
                forward: self.vehicle_access(Heading::Forward),
                backward: self.vehicle_access(Heading::Backward),
            },
            bike: WayBikeAttributes {
                bike_forward: self.access.permits(Capability::Bicycle, Heading::Forward),
                bike_backward: self.access.permits(Capability::Bicycle, Heading::Backward),
                ..Default::default()
            },
            speeds: WaySpeeds {
                speed_limit: s.speed_limit,
                speed: s.speed,
                forward_speed: s.forward_speed,
                backward_speed: s.backward_speed,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
