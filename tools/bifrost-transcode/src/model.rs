//! Decoded Overture transportation features
//!
//! These are the already-parsed inputs of the transcoder. `ingest` builds them
//! from JSON lines; tests build them directly with the `with_*` helpers.

use std::fmt;

/// WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A connector id and its linear-reference position along the segment
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorRef {
    pub connector_id: String,
    pub at: f64,
}

/// A junction feature; its coordinate is optional input for placement
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: String,
    pub position: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    Designated,
    Allowed,
    Denied,
}

impl Disposition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "designated" => Some(Self::Designated),
            "allowed" => Some(Self::Allowed),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    /// Precedence among dispositions (higher wins)
    pub fn rank(self) -> u8 {
        match self {
            Self::Designated => 2,
            Self::Denied => 1,
            Self::Allowed => 0,
        }
    }

    pub fn permits(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// Transport mode named by an access assignment. Unknown modes are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    MotorVehicle,
    Car,
    Bicycle,
    Bus,
    Hgv,
    Foot,
    Vehicle,
    Other(String),
}

impl Mode {
    pub fn parse(s: &str) -> Self {
        match s {
            "motor_vehicle" => Self::MotorVehicle,
            "car" => Self::Car,
            "bicycle" => Self::Bicycle,
            "bus" => Self::Bus,
            "hgv" => Self::Hgv,
            "foot" => Self::Foot,
            "vehicle" => Self::Vehicle,
            other => Self::Other(other.to_string()),
        }
    }

    /// Tie-break rank among assignments of equal disposition (higher wins)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Foot => 5,
            Self::Bicycle => 4,
            Self::Bus => 3,
            Self::Hgv => 2,
            Self::Car | Self::MotorVehicle | Self::Vehicle => 1,
            Self::Other(_) => 0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MotorVehicle => "motor_vehicle",
            Self::Car => "car",
            Self::Bicycle => "bicycle",
            Self::Bus => "bus",
            Self::Hgv => "hgv",
            Self::Foot => "foot",
            Self::Vehicle => "vehicle",
            Self::Other(s) => s,
        };
        f.write_str(s)
    }
}

/// Direction of travel relative to the segment's coordinate order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Forward,
    Backward,
}

impl Heading {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessAssignment {
    pub disposition: Disposition,
    pub mode: Mode,
    /// `None` applies to both directions
    pub heading: Option<Heading>,
}

impl AccessAssignment {
    pub fn new(disposition: Disposition, mode: Mode) -> Self {
        Self {
            disposition,
            mode,
            heading: None,
        }
    }

    pub fn heading(mut self, heading: Heading) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn applies_to(&self, heading: Heading) -> bool {
        match self.heading {
            Some(h) => h == heading,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    Kmh,
    Mph,
}

impl SpeedUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "km/h" | "kmh" | "kph" => Some(Self::Kmh),
            "mph" => Some(Self::Mph),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimit {
    pub value: f64,
    pub unit: SpeedUnit,
    pub heading: Option<Heading>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lanes {
    pub total: Option<u8>,
    pub forward: Option<u8>,
    pub backward: Option<u8>,
}

/// One traversable road piece
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: String,
    pub geometry: Vec<Coordinate>,
    pub subtype: Option<String>,
    pub class: Option<String>,
    pub subclass: Option<String>,
    pub connectors: Vec<ConnectorRef>,
    pub access: Vec<AccessAssignment>,
    pub surface: Option<String>,
    pub speed_limits: Vec<SpeedLimit>,
    pub lanes: Lanes,
}

impl Segment {
    /// A road segment with no classification, connectors or properties
    pub fn new(id: impl Into<String>, geometry: Vec<Coordinate>) -> Self {
        Self {
            id: id.into(),
            geometry,
            subtype: Some("road".to_string()),
            class: None,
            subclass: None,
            connectors: Vec::new(),
            access: Vec::new(),
            surface: None,
            speed_limits: Vec::new(),
            lanes: Lanes::default(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_subclass(mut self, subclass: &str) -> Self {
        self.subclass = Some(subclass.to_string());
        self
    }

    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.subtype = Some(subtype.to_string());
        self
    }

    pub fn with_connector(mut self, connector_id: &str, at: f64) -> Self {
        self.connectors.push(ConnectorRef {
            connector_id: connector_id.to_string(),
            at,
        });
        self
    }

    pub fn with_access(mut self, assignment: AccessAssignment) -> Self {
        self.access.push(assignment);
        self
    }

    pub fn with_surface(mut self, surface: &str) -> Self {
        self.surface = Some(surface.to_string());
        self
    }

    pub fn with_speed_limit(mut self, limit: SpeedLimit) -> Self {
        self.speed_limits.push(limit);
        self
    }
}
