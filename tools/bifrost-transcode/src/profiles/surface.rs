//! Overture `road_surface` -> engine `Surface`

/// Engine `Surface` (3 bits), smoothest first
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    PavedSmooth = 0,
    Paved = 1,
    PavedRough = 2,
    Compacted = 3,
    Dirt = 4,
    Gravel = 5,
    Path = 6,
    Impassable = 7,
}

impl Surface {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Absent or unrecognised values resolve to `Path`
pub fn resolve_surface(surface: Option<&str>) -> Surface {
    match surface {
        Some("metal" | "rubber") => Surface::PavedSmooth,
        Some("paved" | "asphalt" | "concrete") => Surface::Paved,
        Some("bricks" | "wood" | "sett") => Surface::PavedRough,
        Some("paving_stones" | "cobblestone" | "tiles" | "compacted") => Surface::Compacted,
        Some("dirt" | "unpaved" | "ground") => Surface::Dirt,
        Some("gravel" | "fine_gravel" | "shells" | "rock" | "pebblestone") => Surface::Gravel,
        _ => Surface::Path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_table() {
        assert_eq!(resolve_surface(Some("metal")), Surface::PavedSmooth);
        assert_eq!(resolve_surface(Some("asphalt")), Surface::Paved);
        assert_eq!(resolve_surface(Some("sett")), Surface::PavedRough);
        assert_eq!(resolve_surface(Some("cobblestone")), Surface::Compacted);
        assert_eq!(resolve_surface(Some("unpaved")), Surface::Dirt);
        assert_eq!(resolve_surface(Some("gravel")), Surface::Gravel);
    }

    #[test]
    fn test_surface_default_is_path() {
        assert_eq!(resolve_surface(None), Surface::Path);
        assert_eq!(resolve_surface(Some("lava")), Surface::Path);
        assert_eq!(Surface::Path.code(), 6);
    }
}
