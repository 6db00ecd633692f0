//! Speed resolution in whole km/h
//!
//! No urban/rural refinement: absent limits fall back to the road-class table.

use crate::model::{Heading, SpeedLimit, SpeedUnit};
use crate::profiles::classification::RoadClass;

const KMH_PER_MPH: f64 = 1.609344;

/// Convert to km/h, rounded and saturated to the byte the engine stores.
/// `None` for NaN or negative values.
pub fn to_kmh(value: f64, unit: SpeedUnit) -> Option<u8> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let kmh = match unit {
        SpeedUnit::Kmh => value,
        SpeedUnit::Mph => value * KMH_PER_MPH,
    };
    Some(kmh.round().min(u8::MAX as f64) as u8)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedSpeed {
    /// Average/default speed
    pub speed: u8,
    /// Posted limit, 0 when untagged
    pub speed_limit: u8,
    pub forward_speed: u8,
    pub backward_speed: u8,
    pub tagged: bool,
    pub forward_tagged: bool,
    pub backward_tagged: bool,
}

pub fn resolve_speed(limits: &[SpeedLimit], road_class: RoadClass) -> ResolvedSpeed {
    let mut out = ResolvedSpeed::default();

    let first = |heading: Option<Heading>| {
        limits
            .iter()
            .filter(|l| l.heading == heading)
            .find_map(|l| to_kmh(l.value, l.unit))
    };

    match first(None) {
        Some(kmh) => {
            out.speed = kmh;
            out.speed_limit = kmh;
            out.tagged = true;
        }
        None => out.speed = road_class.default_speed_kmh(),
    }
    if let Some(kmh) = first(Some(Heading::Forward)) {
        out.forward_speed = kmh;
        out.forward_tagged = true;
    }
    if let Some(kmh) = first(Some(Heading::Backward)) {
        out.backward_speed = kmh;
        out.backward_tagged = true;
    }
    out
}
