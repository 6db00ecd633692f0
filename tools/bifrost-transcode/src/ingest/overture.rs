//! Serde shapes of Overture transportation features (one JSON object per line)
//!
//! Segment:
//! ```json
//! {"id": "s1", "geometry": [[lon, lat], ...], "subtype": "road", "class": "primary",
//!  "subclass": "link", "connectors": [{"connector_id": "c1", "at": 0.0}],
//!  "access_restrictions": [{"access_type": "denied", "when": {"heading": "forward", "mode": ["car"]}}],
//!  "road_surface": "paved", "speed_limits": [{"max_speed": {"value": 50, "unit": "km/h"}}],
//!  "lanes": {"total": 2}}
//! ```
//!
//! Connector: `{"id": "c1", "geometry": [lon, lat]}`

use serde::Deserialize;

use crate::model::{
    AccessAssignment, Connector, ConnectorRef, Coordinate, Disposition, Heading, Lanes, Mode,
    Segment, SpeedLimit, SpeedUnit,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentFeature {
    pub id: String,
    pub geometry: Vec<[f64; 2]>,
    pub subtype: Option<String>,
    pub class: Option<String>,
    pub subclass: Option<String>,
    #[serde(default)]
    pub connectors: Vec<ConnectorRefFeature>,
    #[serde(default)]
    pub access_restrictions: Vec<AccessRestrictionFeature>,
    pub road_surface: Option<String>,
    #[serde(default)]
    pub speed_limits: Vec<SpeedLimitFeature>,
    pub lanes: Option<LanesFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorRefFeature {
    pub connector_id: String,
    pub at: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessRestrictionFeature {
    pub access_type: String,
    pub when: Option<AccessWhen>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessWhen {
    pub heading: Option<String>,
    #[serde(default)]
    pub mode: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeedLimitFeature {
    pub max_speed: Option<SpeedValue>,
    pub when: Option<SpeedWhen>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeedValue {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeedWhen {
    pub heading: Option<String>,
}

/// Wider than the 4-bit record fields; oversized counts wrap instead of failing the line
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LanesFeature {
    pub total: Option<u64>,
    pub forward: Option<u64>,
    pub backward: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorFeature {
    pub id: String,
    pub geometry: [f64; 2],
}

fn parse_heading(heading: Option<&str>) -> Result<Option<Heading>, String> {
    match heading {
        None => Ok(None),
        Some(h) => Heading::parse(h)
            .map(Some)
            .ok_or_else(|| format!("unknown heading {h:?}")),
    }
}

impl AccessRestrictionFeature {
    /// One assignment per listed mode; a rule without modes applies to
    /// everything and becomes `vehicle` + `foot`.
    fn assignments(&self) -> Result<Vec<AccessAssignment>, String> {
        let disposition = Disposition::parse(&self.access_type)
            .ok_or_else(|| format!("unknown access_type {:?}", self.access_type))?;
        let when = self.when.clone().unwrap_or_default();
        let heading = parse_heading(when.heading.as_deref())?;

        let modes: Vec<Mode> = if when.mode.is_empty() {
            vec![Mode::Vehicle, Mode::Foot]
        } else {
            when.mode.iter().map(|m| Mode::parse(m)).collect()
        };

        Ok(modes
            .into_iter()
            .map(|mode| AccessAssignment {
                disposition,
                mode,
                heading,
            })
            .collect())
    }
}

impl TryFrom<SegmentFeature> for Segment {
    type Error = String;

    fn try_from(f: SegmentFeature) -> Result<Self, Self::Error> {
        let mut access = Vec::new();
        for rule in &f.access_restrictions {
            access.extend(rule.assignments()?);
        }

        let mut speed_limits = Vec::new();
        for limit in &f.speed_limits {
            // min_speed-only entries carry nothing for us
            let Some(max) = &limit.max_speed else {
                continue;
            };
            let unit = SpeedUnit::parse(&max.unit)
                .ok_or_else(|| format!("unknown speed unit {:?}", max.unit))?;
            let heading = parse_heading(limit.when.as_ref().and_then(|w| w.heading.as_deref()))?;
            speed_limits.push(SpeedLimit {
                value: max.value,
                unit,
                heading,
            });
        }

        let lanes = f
            .lanes
            .map(|l| Lanes {
                // keeps the low bits; the codec masks to 4
                total: l.total.map(|n| n as u8),
                forward: l.forward.map(|n| n as u8),
                backward: l.backward.map(|n| n as u8),
            })
            .unwrap_or_default();

        Ok(Segment {
            id: f.id,
            geometry: f
                .geometry
                .into_iter()
                .map(|[lon, lat]| Coordinate::new(lon, lat))
                .collect(),
            subtype: f.subtype,
            class: f.class,
            subclass: f.subclass,
            connectors: f
                .connectors
                .into_iter()
                .map(|c| ConnectorRef {
                    connector_id: c.connector_id,
                    at: c.at,
                })
                .collect(),
            access,
            surface: f.road_surface,
            speed_limits,
            lanes,
        })
    }
}

impl From<ConnectorFeature> for Connector {
    fn from(f: ConnectorFeature) -> Self {
        Connector {
            id: f.id,
            position: Coordinate::new(f.geometry[0], f.geometry[1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Segment, String> {
        let feature: SegmentFeature = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Segment::try_from(feature)
    }

    #[test]
    fn test_minimal_segment() {
        let s = parse(r#"{"id":"a","geometry":[[1.0,2.0],[3.0,4.0]]}"#).unwrap();
        assert_eq!(s.id, "a");
        assert_eq!(s.geometry[1], Coordinate::new(3.0, 4.0));
        assert!(s.access.is_empty());
        assert!(s.connectors.is_empty());
        assert_eq!(s.lanes, Lanes::default());
    }

    #[test]
    fn test_unmoded_rule_expands() {
        let s = parse(
            r#"{"id":"a","geometry":[[0,0],[1,1]],
                "access_restrictions":[{"access_type":"denied","when":{"heading":"backward"}}]}"#,
        )
        .unwrap();
        assert_eq!(s.access.len(), 2);
        assert_eq!(s.access[0].mode, Mode::Vehicle);
        assert_eq!(s.access[1].mode, Mode::Foot);
        assert!(s
            .access
            .iter()
            .all(|a| a.heading == Some(Heading::Backward) && a.disposition == Disposition::Denied));
    }

    #[test]
    fn test_multi_mode_rule() {
        let s = parse(
            r#"{"id":"a","geometry":[[0,0],[1,1]],
                "access_restrictions":[{"access_type":"designated","when":{"mode":["bicycle","foot"]}}]}"#,
        )
        .unwrap();
        let modes: Vec<_> = s.access.iter().map(|a| a.mode.clone()).collect();
        assert_eq!(modes, vec![Mode::Bicycle, Mode::Foot]);
    }

    #[test]
    fn test_speed_limits() {
        let s = parse(
            r#"{"id":"a","geometry":[[0,0],[1,1]],
                "speed_limits":[{"max_speed":{"value":30,"unit":"mph"},"when":{"heading":"forward"}},
                                {"when":{"heading":"backward"}}]}"#,
        )
        .unwrap();
        assert_eq!(s.speed_limits.len(), 1);
        assert_eq!(s.speed_limits[0].unit, SpeedUnit::Mph);
        assert_eq!(s.speed_limits[0].heading, Some(Heading::Forward));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse(
            r#"{"id":"a","geometry":[],"access_restrictions":[{"access_type":"maybe"}]}"#
        )
        .unwrap_err()
        .contains("access_type"));
        assert!(parse(
            r#"{"id":"a","geometry":[],"speed_limits":[{"max_speed":{"value":1,"unit":"knots"}}]}"#
        )
        .is_err());
        assert!(parse(
            r#"{"id":"a","geometry":[],"access_restrictions":[{"access_type":"denied","when":{"heading":"up"}}]}"#
        )
        .is_err());
    }
}
