//! Transcoder configuration, loadable from TOML
//!
//! ```toml
//! node_id_base = 1
//! way_id_base = 1
//! drive_on_right = true
//! at_tolerance = 1e-4
//! coordinate_tolerance_deg = 1e-6
//! batch_size = 4096
//! threads = 8
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranscodeError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscodeConfig {
    /// First node identifier handed out
    pub node_id_base: u64,
    /// `way_id = way_id_base + way_index`
    pub way_id_base: u64,
    pub drive_on_right: bool,
    /// Max distance between a connector's `at` and a vertex's length fraction
    pub at_tolerance: f64,
    /// Per-axis distance (degrees) for placing a connector by its own coordinate
    pub coordinate_tolerance_deg: f64,
    /// Segments prepared in parallel per batch
    pub batch_size: usize,
    /// Worker threads for the prepare stage (rayon global pool when unset)
    pub threads: Option<usize>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            node_id_base: 1,
            way_id_base: 1,
            drive_on_right: true,
            at_tolerance: 1e-4,
            coordinate_tolerance_deg: 1e-6,
            batch_size: 4096,
            threads: None,
        }
    }
}

impl TranscodeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| TranscodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TranscodeError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TranscodeError::Config("batch_size must be > 0".into()));
        }
        if self.threads == Some(0) {
            return Err(TranscodeError::Config("threads must be > 0".into()));
        }
        for (name, value) in [
            ("at_tolerance", self.at_tolerance),
            ("coordinate_tolerance_deg", self.coordinate_tolerance_deg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TranscodeError::Config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            TranscodeConfig::from_toml_str("").unwrap(),
            TranscodeConfig::default()
        );
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = TranscodeConfig::from_toml_str(
            "node_id_base = 1000\ndrive_on_right = false\nthreads = 2\n",
        )
        .unwrap();
        assert_eq!(config.node_id_base, 1000);
        assert!(!config.drive_on_right);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.batch_size, 4096);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            TranscodeConfig::from_toml_str("batchsize = 10"),
            Err(TranscodeError::Config(_))
        ));
    }

    #[test]
    fn test_validation() {
        assert!(TranscodeConfig::from_toml_str("batch_size = 0").is_err());
        assert!(TranscodeConfig::from_toml_str("at_tolerance = -0.5").is_err());
        assert!(TranscodeConfig::from_toml_str("threads = 0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "way_id_base = 500").unwrap();
        file.flush().unwrap();

        let config = TranscodeConfig::load(file.path()).unwrap();
        assert_eq!(config.way_id_base, 500);
    }
}
