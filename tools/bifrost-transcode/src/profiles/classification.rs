//! Overture class/subclass/subtype -> engine road class and use

/// Engine `RoadClass` (3 bits)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadClass {
    Motorway = 0,
    Trunk = 1,
    Primary = 2,
    Secondary = 3,
    Tertiary = 4,
    Unclassified = 5,
    Residential = 6,
    ServiceOther = 7,
}

impl RoadClass {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Default speed in km/h when no limit is tagged
    pub fn default_speed_kmh(self) -> u8 {
        match self {
            Self::Motorway => 120,
            Self::Trunk => 100,
            Self::Primary => 80,
            Self::Secondary => 60,
            Self::Tertiary => 50,
            Self::Unclassified => 50,
            Self::Residential => 30,
            Self::ServiceOther => 20,
        }
    }
}

/// Engine `Use` (6 bits). Only the codes this transcoder can produce or
/// that tests refer to are listed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Use {
    Road = 0,
    Ramp = 1,
    TurnChannel = 2,
    Track = 3,
    Driveway = 4,
    Alley = 5,
    ParkingAisle = 6,
    EmergencyAccess = 7,
    DriveThrough = 8,
    Culdesac = 9,
    LivingStreet = 10,
    ServiceRoad = 11,
    Cycleway = 20,
    MountainBike = 21,
    Sidewalk = 24,
    Footway = 25,
    Steps = 26,
    Path = 27,
    Pedestrian = 28,
    Bridleway = 29,
    PedestrianCrossing = 32,
    Elevator = 33,
    Escalator = 34,
    Platform = 35,
    Other = 40,
    Ferry = 41,
    RailFerry = 42,
    Construction = 43,
    Rail = 50,
}

impl Use {
    pub fn code(self) -> u8 {
        self as u8
    }
}

pub fn road_class(class: Option<&str>) -> RoadClass {
    match class {
        Some("motorway") => RoadClass::Motorway,
        Some("trunk") => RoadClass::Trunk,
        Some("primary") => RoadClass::Primary,
        Some("secondary") => RoadClass::Secondary,
        Some("tertiary") => RoadClass::Tertiary,
        Some("residential") | Some("living_street") => RoadClass::Residential,
        Some("unclassified") => RoadClass::Unclassified,
        Some(
            "service" | "driveway" | "alley" | "parking_aisle" | "track" | "cycleway" | "footway"
            | "sidewalk" | "crosswalk" | "pedestrian" | "path" | "steps" | "bridleway",
        ) => RoadClass::ServiceOther,
        _ => RoadClass::Unclassified,
    }
}

/// Classification fields that go into the way's classification word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub road_class: RoadClass,
    pub usage: Use,
    pub link: bool,
    pub turn_channel: bool,
    pub ferry: bool,
    pub rail: bool,
}

pub fn classify(subtype: Option<&str>, class: Option<&str>, subclass: Option<&str>) -> Classification {
    let road_class = road_class(class);
    let link = subclass == Some("link");

    let mut out = Classification {
        road_class,
        usage: Use::Road,
        link,
        turn_channel: false,
        ferry: false,
        rail: false,
    };

    match subtype {
        Some("rail") => {
            out.usage = Use::Rail;
            out.rail = true;
            return out;
        }
        Some("water") => {
            out.usage = Use::Ferry;
            out.ferry = true;
            return out;
        }
        _ => {}
    }

    if link {
        if matches!(
            road_class,
            RoadClass::Motorway | RoadClass::Trunk | RoadClass::Primary
        ) {
            out.usage = Use::Ramp;
        } else {
            out.usage = Use::TurnChannel;
            out.turn_channel = true;
        }
        return out;
    }

    out.usage = match class {
        Some("living_street") => Use::LivingStreet,
        Some("track") => Use::Track,
        Some("driveway") => Use::Driveway,
        Some("alley") => Use::Alley,
        Some("parking_aisle") => Use::ParkingAisle,
        Some("service") => Use::ServiceRoad,
        Some("cycleway") => Use::Cycleway,
        Some("footway") => Use::Footway,
        Some("sidewalk") => Use::Sidewalk,
        Some("crosswalk") => Use::PedestrianCrossing,
        Some("pedestrian") => Use::Pedestrian,
        Some("path") => Use::Path,
        Some("steps") => Use::Steps,
        Some("bridleway") => Use::Bridleway,
        _ => Use::Road,
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_class_table() {
        assert_eq!(road_class(Some("motorway")), RoadClass::Motorway);
        assert_eq!(road_class(Some("living_street")), RoadClass::Residential);
        assert_eq!(road_class(Some("footway")), RoadClass::ServiceOther);
        assert_eq!(road_class(Some("unknown")), RoadClass::Unclassified);
        assert_eq!(road_class(None), RoadClass::Unclassified);
        assert_eq!(RoadClass::ServiceOther.code(), 7);
    }

    #[test]
    fn test_link_becomes_ramp_or_turn_channel() {
        let ramp = classify(Some("road"), Some("motorway"), Some("link"));
        assert!(ramp.link);
        assert_eq!(ramp.usage, Use::Ramp);
        assert!(!ramp.turn_channel);

        let channel = classify(Some("road"), Some("secondary"), Some("link"));
        assert_eq!(channel.usage, Use::TurnChannel);
        assert!(channel.turn_channel);
    }

    #[test]
    fn test_use_table() {
        assert_eq!(classify(None, Some("footway"), None).usage, Use::Footway);
        assert_eq!(
            classify(None, Some("crosswalk"), Some("crosswalk")).usage,
            Use::PedestrianCrossing
        );
        assert_eq!(classify(None, Some("primary"), None).usage, Use::Road);
        assert_eq!(Use::Footway.code(), 25);
    }

    #[test]
    fn test_non_road_subtypes() {
        let ferry = classify(Some("water"), None, None);
        assert!(ferry.ferry);
        assert_eq!(ferry.usage, Use::Ferry);

        let rail = classify(Some("rail"), Some("standard_gauge"), None);
        assert!(rail.rail);
        assert_eq!(rail.usage.code(), 50);
    }
}
