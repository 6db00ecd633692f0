//! OSMWay record - one per transcoded segment (ways.bin)
//!
//! Layout (native-endian, 320 bytes):
//!
//!   way_id:          u64
//!   string refs:     70 x u32   // name/ref/destination string-table indices
//!   duration:        u32        // ferry duration in seconds
//!   attributes:      u32        // WAY_ATTRIBUTE_LAYOUT
//!   classification:  u32        // WAY_CLASSIFICATION_LAYOUT
//!   access:          u16        // WAY_ACCESS_LAYOUT
//!   bike:            u16        // WAY_BIKE_LAYOUT
//!   node_count:      u16
//!   speeds:          7 x u8     // km/h
//!   layer:           i8
//!   padding:         [6]u8

use crate::bits::{field, BitLayout, ByteReader, ByteWriter};
use crate::record::Record;

pub const WAY_RECORD_SIZE: usize = 320;

/// Number of `u32` string-table references following the way id
pub const WAY_STRING_REF_COUNT: usize = 70;

/// Declared order of the string-table reference slots
pub const WAY_STRING_REF_NAMES: [&str; WAY_STRING_REF_COUNT] = [
    "ref_index",
    "ref_lang_index",
    "ref_left_index",
    "ref_left_lang_index",
    "ref_right_index",
    "ref_right_lang_index",
    "int_ref_index",
    "int_ref_lang_index",
    "int_ref_left_index",
    "int_ref_left_lang_index",
    "int_ref_right_index",
    "int_ref_right_lang_index",
    "name_index",
    "name_lang_index",
    "name_left_index",
    "name_left_lang_index",
    "name_right_index",
    "name_right_lang_index",
    "name_forward_index",
    "name_forward_lang_index",
    "name_backward_index",
    "name_backward_lang_index",
    "alt_name_index",
    "alt_name_lang_index",
    "alt_name_left_index",
    "alt_name_left_lang_index",
    "alt_name_right_index",
    "alt_name_right_lang_index",
    "official_name_index",
    "official_name_lang_index",
    "official_name_left_index",
    "official_name_left_lang_index",
    "official_name_right_index",
    "official_name_right_lang_index",
    "tunnel_name_index",
    "tunnel_name_lang_index",
    "tunnel_name_left_index",
    "tunnel_name_left_lang_index",
    "tunnel_name_right_index",
    "tunnel_name_right_lang_index",
    "fwd_turn_lanes_index",
    "bwd_turn_lanes_index",
    "fwd_jct_base_index",
    "bwd_jct_base_index",
    "fwd_jct_overlay_index",
    "bwd_jct_overlay_index",
    "fwd_signboard_base_index",
    "bwd_signboard_base_index",
    "destination_index",
    "destination_lang_index",
    "destination_forward_index",
    "destination_backward_index",
    "destination_forward_lang_index",
    "destination_backward_lang_index",
    "destination_ref_index",
    "destination_ref_lang_index",
    "destination_ref_to_index",
    "destination_ref_to_lang_index",
    "destination_int_ref_index",
    "destination_int_ref_to_index",
    "destination_street_index",
    "destination_street_lang_index",
    "destination_street_to_index",
    "destination_street_to_lang_index",
    "junction_name_index",
    "junction_name_lang_index",
    "junction_ref_index",
    "junction_ref_lang_index",
    "level_index",
    "level_ref_index",
];

pub const WAY_ATTRIBUTE_LAYOUT: BitLayout = BitLayout::new(
    32,
    &[
        field("destination_only", 1),
        field("no_thru_traffic", 1),
        field("oneway", 1),
        field("oneway_reverse", 1),
        field("roundabout", 1),
        field("ferry", 1),
        field("rail", 1),
        field("surface", 3),
        field("tunnel", 1),
        field("toll", 1),
        field("bridge", 1),
        field("seasonal", 1),
        field("drive_on_right", 1),
        field("bike_network", 4),
        field("exit", 1),
        field("tagged_speed", 1),
        field("forward_tagged_speed", 1),
        field("backward_tagged_speed", 1),
        field("tagged_lanes", 1),
        field("forward_tagged_lanes", 1),
        field("backward_tagged_lanes", 1),
        field("truck_route", 1),
        field("sidewalk_right", 1),
        field("sidewalk_left", 1),
        field("sac_scale", 3),
    ],
);

pub const WAY_CLASSIFICATION_LAYOUT: BitLayout = BitLayout::new(
    32,
    &[
        field("road_class", 3),
        field("link", 1),
        field("use", 6),
        field("lanes", 4),
        field("forward_lanes", 4),
        field("backward_lanes", 4),
        field("turn_channel", 1),
        field("wheelchair", 1),
        field("wheelchair_tag", 1),
        field("has_user_tags", 1),
        field("has_pronunciation_tags", 1),
        field("internal", 1),
        field("hov_type", 1),
        field("indoor", 1),
        field("pedestrian_forward", 1),
        field("pedestrian_backward", 1),
    ],
);

pub const WAY_ACCESS_LAYOUT: BitLayout = BitLayout::new(
    16,
    &[
        field("auto_forward", 1),
        field("bus_forward", 1),
        field("taxi_forward", 1),
        field("truck_forward", 1),
        field("motorcycle_forward", 1),
        field("emergency_forward", 1),
        field("hov_forward", 1),
        field("moped_forward", 1),
        field("auto_backward", 1),
        field("bus_backward", 1),
        field("taxi_backward", 1),
        field("truck_backward", 1),
        field("motorcycle_backward", 1),
        field("emergency_backward", 1),
        field("hov_backward", 1),
        field("moped_backward", 1),
    ],
);

pub const WAY_BIKE_LAYOUT: BitLayout = BitLayout::new(
    16,
    &[
        field("cycle_lane_right", 2),
        field("cycle_lane_left", 2),
        field("cycle_lane_right_opposite", 1),
        field("cycle_lane_left_opposite", 1),
        field("shoulder_right", 1),
        field("shoulder_left", 1),
        field("dismount", 1),
        field("use_sidepath", 1),
        field("bike_forward", 1),
        field("bike_backward", 1),
        field("lit", 1),
        field("destination_only_hgv", 1),
        field("spare", 2),
    ],
);

const _: () = assert!(WAY_ATTRIBUTE_LAYOUT.is_exact());
const _: () = assert!(WAY_CLASSIFICATION_LAYOUT.is_exact());
const _: () = assert!(WAY_ACCESS_LAYOUT.is_exact());
const _: () = assert!(WAY_BIKE_LAYOUT.is_exact());

/// String-table reference slots, in `WAY_STRING_REF_NAMES` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WayStringRefs(pub [u32; WAY_STRING_REF_COUNT]);

impl Default for WayStringRefs {
    fn default() -> Self {
        Self([0; WAY_STRING_REF_COUNT])
    }
}

impl WayStringRefs {
    pub fn slot(name: &str) -> Option<usize> {
        WAY_STRING_REF_NAMES.iter().position(|n| *n == name)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        Self::slot(name).map(|i| self.0[i])
    }

    /// Returns false when `name` is not a declared slot
    pub fn set(&mut self, name: &str, value: u32) -> bool {
        match Self::slot(name) {
            Some(i) => {
                self.0[i] = value;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayAttributes {
    pub destination_only: bool,
    pub no_thru_traffic: bool,
    pub oneway: bool,
    pub oneway_reverse: bool,
    pub roundabout: bool,
    pub ferry: bool,
    pub rail: bool,
    /// 3 bits
    pub surface: u8,
    pub tunnel: bool,
    pub toll: bool,
    pub bridge: bool,
    pub seasonal: bool,
    pub drive_on_right: bool,
    /// 4 bits
    pub bike_network: u8,
    pub exit: bool,
    pub tagged_speed: bool,
    pub forward_tagged_speed: bool,
    pub backward_tagged_speed: bool,
    pub tagged_lanes: bool,
    pub forward_tagged_lanes: bool,
    pub backward_tagged_lanes: bool,
    pub truck_route: bool,
    pub sidewalk_right: bool,
    pub sidewalk_left: bool,
    /// 3 bits
    pub sac_scale: u8,
}

impl WayAttributes {
    pub fn pack(&self) -> u32 {
        WAY_ATTRIBUTE_LAYOUT
            .writer()
            .flag("destination_only", self.destination_only)
            .flag("no_thru_traffic", self.no_thru_traffic)
            .flag("oneway", self.oneway)
            .flag("oneway_reverse", self.oneway_reverse)
            .flag("roundabout", self.roundabout)
            .flag("ferry", self.ferry)
            .flag("rail", self.rail)
            .put("surface", self.surface.into())
            .flag("tunnel", self.tunnel)
            .flag("toll", self.toll)
            .flag("bridge", self.bridge)
            .flag("seasonal", self.seasonal)
            .flag("drive_on_right", self.drive_on_right)
            .put("bike_network", self.bike_network.into())
            .flag("exit", self.exit)
            .flag("tagged_speed", self.tagged_speed)
            .flag("forward_tagged_speed", self.forward_tagged_speed)
            .flag("backward_tagged_speed", self.backward_tagged_speed)
            .flag("tagged_lanes", self.tagged_lanes)
            .flag("forward_tagged_lanes", self.forward_tagged_lanes)
            .flag("backward_tagged_lanes", self.backward_tagged_lanes)
            .flag("truck_route", self.truck_route)
            .flag("sidewalk_right", self.sidewalk_right)
            .flag("sidewalk_left", self.sidewalk_left)
            .put("sac_scale", self.sac_scale.into())
            .finish() as u32
    }

    pub fn unpack(word: u32) -> Self {
        let mut r = WAY_ATTRIBUTE_LAYOUT.reader(word.into());
        Self {
            destination_only: r.flag("destination_only"),
            no_thru_traffic: r.flag("no_thru_traffic"),
            oneway: r.flag("oneway"),
            oneway_reverse: r.flag("oneway_reverse"),
            roundabout: r.flag("roundabout"),
            ferry: r.flag("ferry"),
            rail: r.flag("rail"),
            surface: r.take("surface") as u8,
            tunnel: r.flag("tunnel"),
            toll: r.flag("toll"),
            bridge: r.flag("bridge"),
            seasonal: r.flag("seasonal"),
            drive_on_right: r.flag("drive_on_right"),
            bike_network: r.take("bike_network") as u8,
            exit: r.flag("exit"),
            tagged_speed: r.flag("tagged_speed"),
            forward_tagged_speed: r.flag("forward_tagged_speed"),
            backward_tagged_speed: r.flag("backward_tagged_speed"),
            tagged_lanes: r.flag("tagged_lanes"),
            forward_tagged_lanes: r.flag("forward_tagged_lanes"),
            backward_tagged_lanes: r.flag("backward_tagged_lanes"),
            truck_route: r.flag("truck_route"),
            sidewalk_right: r.flag("sidewalk_right"),
            sidewalk_left: r.flag("sidewalk_left"),
            sac_scale: r.take("sac_scale") as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayClassification {
    /// 3 bits, engine `RoadClass`
    pub road_class: u8,
    pub link: bool,
    /// 6 bits, engine `Use`
    pub use_code: u8,
    /// 4 bits each
    pub lanes: u8,
    pub forward_lanes: u8,
    pub backward_lanes: u8,
    pub turn_channel: bool,
    pub wheelchair: bool,
    pub wheelchair_tag: bool,
    pub has_user_tags: bool,
    pub has_pronunciation_tags: bool,
    pub internal: bool,
    pub hov_type: bool,
    pub indoor: bool,
    pub pedestrian_forward: bool,
    pub pedestrian_backward: bool,
}

impl WayClassification {
    pub fn pack(&self) -> u32 {
        WAY_CLASSIFICATION_LAYOUT
            .writer()
            .put("road_class", self.road_class.into())
            .flag("link", self.link)
            .put("use", self.use_code.into())
            .put("lanes", self.lanes.into())
            .put("forward_lanes", self.forward_lanes.into())
            .put("backward_lanes", self.backward_lanes.into())
            .flag("turn_channel", self.turn_channel)
            .flag("wheelchair", self.wheelchair)
            .flag("wheelchair_tag", self.wheelchair_tag)
            .flag("has_user_tags", self.has_user_tags)
            .flag("has_pronunciation_tags", self.has_pronunciation_tags)
            .flag("internal", self.internal)
            .flag("hov_type", self.hov_type)
            .flag("indoor", self.indoor)
            .flag("pedestrian_forward", self.pedestrian_forward)
            .flag("pedestrian_backward", self.pedestrian_backward)
            .finish() as u32
    }

    pub fn unpack(word: u32) -> Self {
        let mut r = WAY_CLASSIFICATION_LAYOUT.reader(word.into());
        Self {
            road_class: r.take("road_class") as u8,
            link: r.flag("link"),
            use_code: r.take("use") as u8,
            lanes: r.take("lanes") as u8,
            forward_lanes: r.take("forward_lanes") as u8,
            backward_lanes: r.take("backward_lanes") as u8,
            turn_channel: r.flag("turn_channel"),
            wheelchair: r.flag("wheelchair"),
            wheelchair_tag: r.flag("wheelchair_tag"),
            has_user_tags: r.flag("has_user_tags"),
            has_pronunciation_tags: r.flag("has_pronunciation_tags"),
            internal: r.flag("internal"),
            hov_type: r.flag("hov_type"),
            indoor: r.flag("indoor"),
            pedestrian_forward: r.flag("pedestrian_forward"),
            pedestrian_backward: r.flag("pedestrian_backward"),
        }
    }
}

/// Motorised access for one direction of travel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehicleAccess {
    pub auto: bool,
    pub bus: bool,
    pub taxi: bool,
    pub truck: bool,
    pub motorcycle: bool,
    pub emergency: bool,
    pub hov: bool,
    pub moped: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayAccess {
    pub forward: VehicleAccess,
    pub backward: VehicleAccess,
}

impl WayAccess {
    pub fn pack(&self) -> u16 {
        let (f, b) = (&self.forward, &self.backward);
        WAY_ACCESS_LAYOUT
            .writer()
            .flag("auto_forward", f.auto)
            .flag("bus_forward", f.bus)
            .flag("taxi_forward", f.taxi)
            .flag("truck_forward", f.truck)
            .flag("motorcycle_forward", f.motorcycle)
            .flag("emergency_forward", f.emergency)
            .flag("hov_forward", f.hov)
            .flag("moped_forward", f.moped)
            .flag("auto_backward", b.auto)
            .flag("bus_backward", b.bus)
            .flag("taxi_backward", b.taxi)
            .flag("truck_backward", b.truck)
            .flag("motorcycle_backward", b.motorcycle)
            .flag("emergency_backward", b.emergency)
            .flag("hov_backward", b.hov)
            .flag("moped_backward", b.moped)
            .finish() as u16
    }

    pub fn unpack(word: u16) -> Self {
        let mut r = WAY_ACCESS_LAYOUT.reader(word.into());
        let forward = VehicleAccess {
            auto: r.flag("auto_forward"),
            bus: r.flag("bus_forward"),
            taxi: r.flag("taxi_forward"),
            truck: r.flag("truck_forward"),
            motorcycle: r.flag("motorcycle_forward"),
            emergency: r.flag("emergency_forward"),
            hov: r.flag("hov_forward"),
            moped: r.flag("moped_forward"),
        };
        let backward = VehicleAccess {
            auto: r.flag("auto_backward"),
            bus: r.flag("bus_backward"),
            taxi: r.flag("taxi_backward"),
            truck: r.flag("truck_backward"),
            motorcycle: r.flag("motorcycle_backward"),
            emergency: r.flag("emergency_backward"),
            hov: r.flag("hov_backward"),
            moped: r.flag("moped_backward"),
        };
        Self { forward, backward }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayBikeAttributes {
    /// 2 bits each
    pub cycle_lane_right: u8,
    pub cycle_lane_left: u8,
    pub cycle_lane_right_opposite: bool,
    pub cycle_lane_left_opposite: bool,
    pub shoulder_right: bool,
    pub shoulder_left: bool,
    pub dismount: bool,
    pub use_sidepath: bool,
    pub bike_forward: bool,
    pub bike_backward: bool,
    pub lit: bool,
    pub destination_only_hgv: bool,
}

impl WayBikeAttributes {
    pub fn pack(&self) -> u16 {
        WAY_BIKE_LAYOUT
            .writer()
            .put("cycle_lane_right", self.cycle_lane_right.into())
            .put("cycle_lane_left", self.cycle_lane_left.into())
            .flag("cycle_lane_right_opposite", self.cycle_lane_right_opposite)
            .flag("cycle_lane_left_opposite", self.cycle_lane_left_opposite)
            .flag("shoulder_right", self.shoulder_right)
            .flag("shoulder_left", self.shoulder_left)
            .flag("dismount", self.dismount)
            .flag("use_sidepath", self.use_sidepath)
            .flag("bike_forward", self.bike_forward)
            .flag("bike_backward", self.bike_backward)
            .flag("lit", self.lit)
            .flag("destination_only_hgv", self.destination_only_hgv)
            .put("spare", 0)
            .finish() as u16
    }

    pub fn unpack(word: u16) -> Self {
        let mut r = WAY_BIKE_LAYOUT.reader(word.into());
        let out = Self {
            cycle_lane_right: r.take("cycle_lane_right") as u8,
            cycle_lane_left: r.take("cycle_lane_left") as u8,
            cycle_lane_right_opposite: r.flag("cycle_lane_right_opposite"),
            cycle_lane_left_opposite: r.flag("cycle_lane_left_opposite"),
            shoulder_right: r.flag("shoulder_right"),
            shoulder_left: r.flag("shoulder_left"),
            dismount: r.flag("dismount"),
            use_sidepath: r.flag("use_sidepath"),
            bike_forward: r.flag("bike_forward"),
            bike_backward: r.flag("bike_backward"),
            lit: r.flag("lit"),
            destination_only_hgv: r.flag("destination_only_hgv"),
        };
        r.skip("spare");
        out
    }
}

/// Per-way speeds in km/h
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaySpeeds {
    pub speed_limit: u8,
    pub speed: u8,
    pub backward_speed: u8,
    pub forward_speed: u8,
    pub truck_speed: u8,
    pub truck_speed_forward: u8,
    pub truck_speed_backward: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayRecord {
    pub way_id: u64,
    pub string_refs: WayStringRefs,
    pub duration: u32,
    pub attributes: WayAttributes,
    pub classification: WayClassification,
    pub access: WayAccess,
    pub bike: WayBikeAttributes,
    pub node_count: u16,
    pub speeds: WaySpeeds,
    pub layer: i8,
}

impl Record for WayRecord {
    const SIZE: usize = WAY_RECORD_SIZE;
    const NAME: &'static str = "OSMWay";

    fn encode_into(&self, out: &mut [u8]) {
        let mut w = ByteWriter::new(out);
        w.u64(self.way_id);
        for slot in self.string_refs.0 {
            w.u32(slot);
        }
        w.u32(self.duration);
        w.u32(self.attributes.pack());
        w.u32(self.classification.pack());
        w.u16(self.access.pack());
        w.u16(self.bike.pack());
        w.u16(self.node_count);
        let s = &self.speeds;
        w.u8(s.speed_limit);
        w.u8(s.speed);
        w.u8(s.backward_speed);
        w.u8(s.forward_speed);
        w.u8(s.truck_speed);
        w.u8(s.truck_speed_forward);
        w.u8(s.truck_speed_backward);
        w.i8(self.layer);
        debug_assert_eq!(w.position(), 314);
        w.pad_to(WAY_RECORD_SIZE);
    }

    fn decode_unchecked(bytes: &[u8]) -> Self {
        let mut r = ByteReader::new(bytes);
        let way_id = r.u64();
        let mut refs = [0u32; WAY_STRING_REF_COUNT];
        for slot in refs.iter_mut() {
            *slot = r.u32();
        }
        let duration = r.u32();
        let attributes = WayAttributes::unpack(r.u32());
        let classification = WayClassification::unpack(r.u32());
        let access = WayAccess::unpack(r.u16());
        let bike = WayBikeAttributes::unpack(r.u16());
        let node_count = r.u16();
        let speeds = WaySpeeds {
            speed_limit: r.u8(),
            speed: r.u8(),
            backward_speed: r.u8(),
            forward_speed: r.u8(),
            truck_speed: r.u8(),
            truck_speed_forward: r.u8(),
            truck_speed_backward: r.u8(),
        };
        let layer = r.i8();
        r.skip_to(WAY_RECORD_SIZE);

        Self {
            way_id,
            string_refs: WayStringRefs(refs),
            duration,
            attributes,
            classification,
            access,
            bike,
            node_count,
            speeds,
            layer,
        }
    }
}
