//! Tie connector references to polyline vertices
//!
//! Each vertex gets a linear-reference fraction from cumulative haversine
//! length. A reference lands on the vertex whose fraction is nearest its `at`
//! when within `at_tolerance`, otherwise on a vertex within
//! `coordinate_tolerance_deg` of the connector's own coordinate (if known).

use geo::Point;
#[allow(deprecated)]
use geo::HaversineDistance;
use rustc_hash::FxHashMap;

use crate::error::{SegmentError, UnresolvedReason};
use crate::model::{ConnectorRef, Coordinate};

/// Great-circle distance in meters
#[allow(deprecated)]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let p1 = Point::new(a.lon, a.lat);
    let p2 = Point::new(b.lon, b.lat);
    p1.haversine_distance(&p2)
}

/// Fraction of total length at each vertex. First is 0.0, last is 1.0;
/// a zero-length line puts every vertex at 0.0.
pub fn vertex_fractions(geometry: &[Coordinate]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(geometry.len());
    let mut total = 0.0;
    for (i, c) in geometry.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(geometry[i - 1], *c);
        }
        cumulative.push(total);
    }

    if total <= 0.0 {
        return vec![0.0; geometry.len()];
    }
    let mut fractions: Vec<f64> = cumulative.into_iter().map(|d| d / total).collect();
    if let Some(last) = fractions.last_mut() {
        *last = 1.0;
    }
    fractions
}

/// Tolerances used by `place_connectors`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementTolerance {
    pub at: f64,
    pub coordinate_deg: f64,
}

fn nearest_by_fraction(fractions: &[f64], at: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, f) in fractions.iter().enumerate() {
        let d = (f - at).abs();
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best
}

fn nearest_by_coordinate(
    geometry: &[Coordinate],
    target: Coordinate,
    tolerance_deg: f64,
) -> Option<usize> {
    geometry
        .iter()
        .enumerate()
        .map(|(i, c)| (i, (c.lon - target.lon).abs().max((c.lat - target.lat).abs())))
        .filter(|(_, d)| *d <= tolerance_deg)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Map each vertex to the connector placed on it.
///
/// Returns one slot per vertex holding the index into `refs` of the
/// connector placed there.
pub fn place_connectors(
    segment_id: &str,
    geometry: &[Coordinate],
    refs: &[ConnectorRef],
    connector_positions: &FxHashMap<String, Coordinate>,
    tolerance: PlacementTolerance,
) -> Result<Vec<Option<usize>>, SegmentError> {
    let mut slots = vec![None; geometry.len()];
    if refs.is_empty() {
        return Ok(slots);
    }
    let fractions = vertex_fractions(geometry);

    for (ref_index, r) in refs.iter().enumerate() {
        let unresolved = |reason| SegmentError::UnresolvedConnector {
            segment_id: segment_id.to_string(),
            connector_id: r.connector_id.clone(),
            at: r.at,
            reason,
        };

        // also false for NaN
        if !(0.0..=1.0).contains(&r.at) {
            return Err(unresolved(UnresolvedReason::InvalidFraction));
        }

        let by_fraction = nearest_by_fraction(&fractions, r.at)
            .filter(|(_, d)| *d <= tolerance.at)
            .map(|(i, _)| i);
        let vertex = by_fraction
            .or_else(|| {
                connector_positions
                    .get(&r.connector_id)
                    .and_then(|p| nearest_by_coordinate(geometry, *p, tolerance.coordinate_deg))
            })
            .ok_or_else(|| unresolved(UnresolvedReason::NoMatchingVertex))?;

        if slots[vertex].is_some() {
            return Err(unresolved(UnresolvedReason::VertexAlreadyClaimed));
        }
        slots[vertex] = Some(ref_index);
    }

    Ok(slots)
}
