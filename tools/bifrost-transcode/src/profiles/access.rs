//! Access resolution: many Overture access assignments -> one boolean per
//! (capability, direction)
//!
//! For each capability and direction the compatible assignments are collected.
//! An empty set means allowed. Otherwise the winner has the highest
//! disposition (designated > denied > allowed), then the highest mode rank
//! (foot > bicycle > bus > hgv > car/motor_vehicle/vehicle > other), then the
//! earliest position in the input.

use crate::model::{AccessAssignment, Heading, Mode};

/// Engine-side travel capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Auto,
    Bicycle,
    Bus,
    Truck,
    Pedestrian,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Auto,
        Capability::Bicycle,
        Capability::Bus,
        Capability::Truck,
        Capability::Pedestrian,
    ];

    /// Whether an assignment for `mode` speaks for this capability
    pub fn accepts(self, mode: &Mode) -> bool {
        match self {
            Self::Auto => matches!(mode, Mode::Car | Mode::MotorVehicle | Mode::Vehicle),
            Self::Truck => matches!(mode, Mode::Hgv | Mode::MotorVehicle | Mode::Vehicle),
            Self::Bus => matches!(mode, Mode::Bus | Mode::MotorVehicle | Mode::Vehicle),
            Self::Bicycle => matches!(mode, Mode::Bicycle | Mode::Vehicle),
            Self::Pedestrian => matches!(mode, Mode::Foot),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Result of resolving one (capability, direction) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessDecision<'a> {
    pub permitted: bool,
    /// The assignment that decided; `None` when nothing applied
    pub decider: Option<&'a AccessAssignment>,
}

pub fn resolve_access(
    assignments: &[AccessAssignment],
    capability: Capability,
    heading: Heading,
) -> AccessDecision<'_> {
    let mut winner: Option<&AccessAssignment> = None;

    for candidate in assignments
        .iter()
        .filter(|a| capability.accepts(&a.mode) && a.applies_to(heading))
    {
        let beats = match winner {
            None => true,
            // strictly greater keeps the earliest on a full tie
            Some(w) => {
                (candidate.disposition.rank(), candidate.mode.rank())
                    > (w.disposition.rank(), w.mode.rank())
            }
        };
        if beats {
            winner = Some(candidate);
        }
    }

    AccessDecision {
        permitted: match winner {
            Some(w) => w.disposition.permits(),
            None => true,
        },
        decider: winner,
    }
}

/// Resolved access for every capability in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessTable {
    forward: [bool; 5],
    backward: [bool; 5],
}

impl Default for AccessTable {
    /// Everything allowed
    fn default() -> Self {
        Self {
            forward: [true; 5],
            backward: [true; 5],
        }
    }
}

impl AccessTable {
    pub fn resolve(assignments: &[AccessAssignment]) -> Self {
        let mut table = Self::default();
        for capability in Capability::ALL {
            let i = capability.index();
            table.forward[i] = resolve_access(assignments, capability, Heading::Forward).permitted;
            table.backward[i] =
                resolve_access(assignments, capability, Heading::Backward).permitted;
        }
        table
    }

    pub fn permits(&self, capability: Capability, heading: Heading) -> bool {
        match heading {
            Heading::Forward => self.forward[capability.index()],
            Heading::Backward => self.backward[capability.index()],
        }
    }

    /// Auto may only travel forward
    pub fn oneway(&self) -> bool {
        self.permits(Capability::Auto, Heading::Forward)
            && !self.permits(Capability::Auto, Heading::Backward)
    }

    /// Auto may only travel backward
    pub fn oneway_reverse(&self) -> bool {
        self.permits(Capability::Auto, Heading::Backward)
            && !self.permits(Capability::Auto, Heading::Forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Disposition::*;

    fn a(disposition: crate::model::Disposition, mode: &str) -> AccessAssignment {
        AccessAssignment::new(disposition, Mode::parse(mode))
    }

    #[test]
    fn test_empty_defaults_to_allowed() {
        for capability in Capability::ALL {
            let d = resolve_access(&[], capability, Heading::Forward);
            assert!(d.permitted);
            assert!(d.decider.is_none());
        }
        assert_eq!(AccessTable::resolve(&[]), AccessTable::default());
    }

    #[test]
    fn test_designated_beats_denied() {
        let rules = [a(Denied, "foot"), a(Designated, "bicycle")];
        let bicycle = resolve_access(&rules, Capability::Bicycle, Heading::Forward);
        assert!(bicycle.permitted);
        assert_eq!(bicycle.decider, Some(&rules[1]));

        let foot = resolve_access(&rules, Capability::Pedestrian, Heading::Forward);
        assert!(!foot.permitted);
        assert_eq!(foot.decider, Some(&rules[0]));
    }

    #[test]
    fn test_denied_beats_allowed_regardless_of_order() {
        let rules = [a(Allowed, "car"), a(Denied, "motor_vehicle")];
        assert!(!resolve_access(&rules, Capability::Auto, Heading::Forward).permitted);

        let rules = [a(Denied, "motor_vehicle"), a(Allowed, "car")];
        assert!(!resolve_access(&rules, Capability::Auto, Heading::Forward).permitted);
    }

    #[test]
    fn test_mode_rank_breaks_disposition_tie() {
        // both denied for truck; hgv outranks vehicle
        let rules = [a(Denied, "vehicle"), a(Denied, "hgv")];
        let d = resolve_access(&rules, Capability::Truck, Heading::Forward);
        assert_eq!(d.decider, Some(&rules[1]));
    }

    #[test]
    fn test_full_tie_keeps_earliest() {
        let rules = [a(Allowed, "car"), a(Allowed, "motor_vehicle")];
        let d = resolve_access(&rules, Capability::Auto, Heading::Forward);
        assert_eq!(d.decider, Some(&rules[0]));
    }

    #[test]
    fn test_unknown_mode_implies_nothing() {
        let rules = [a(Denied, "hov")];
        let table = AccessTable::resolve(&rules);
        assert_eq!(table, AccessTable::default());
    }

    #[test]
    fn test_scoped_assignment_and_oneway() {
        let rules = [a(Denied, "car").heading(Heading::Backward)];
        let table = AccessTable::resolve(&rules);
        assert!(table.permits(Capability::Auto, Heading::Forward));
        assert!(!table.permits(Capability::Auto, Heading::Backward));
        assert!(table.permits(Capability::Truck, Heading::Backward));
        assert!(table.oneway());
        assert!(!table.oneway_reverse());
    }

    #[test]
    fn test_vehicle_covers_bicycle_not_foot() {
        let rules = [a(Denied, "vehicle")];
        let table = AccessTable::resolve(&rules);
        assert!(!table.permits(Capability::Bicycle, Heading::Forward));
        assert!(!table.permits(Capability::Bus, Heading::Backward));
        assert!(table.permits(Capability::Pedestrian, Heading::Forward));
    }
}
