//! Tunable parameters for recovery, refinement and integration.

/// Settings for one measurement run.
///
/// Missing fields in a JSON file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Ratio between a sampled height and the linearly interpolated height
    /// above which an edge is subdivided.
    pub height_diff: f64,
    /// Maximum number of refinement passes.
    pub max_attempts: usize,
    /// Refinement stops once the fine meshes hold this many points.
    pub max_points: usize,
    /// Minimum triangle angle in degrees for the sleekness check.
    pub min_angle: f64,
    /// Maximum number of triangulations spent on boundary edge recovery.
    pub recovery_attempts: usize,
    /// Intersections closer than this fraction of an edge to either of its
    /// endpoints are ignored during recovery.
    pub recovery_safety: f64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            height_diff: 1.002,
            max_attempts: 10,
            max_points: 1000,
            min_angle: 15.0,
            recovery_attempts: 5,
            recovery_safety: 0.01,
        }
    }
}

impl MeasureConfig {
    /// Saves this configuration to a JSON file.
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: &str) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: MeasureConfig = serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("measure.json");
        let path = path.to_str().unwrap();
        let config = MeasureConfig {
            max_points: 250,
            min_angle: 20.0,
            ..MeasureConfig::default()
        };
        config.save(path).unwrap();
        assert_eq!(MeasureConfig::load(path).unwrap(), config);
    }

    #[test]
    fn partial_files_use_defaults() {
        let config: MeasureConfig = serde_json::from_str(r#"{ "max_attempts": 3 }"#).unwrap();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_points, 1000);
        assert!((config.height_diff - 1.002).abs() < 1e-12);
    }

    #[test]
    fn malformed_files_are_invalid_data() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        let err = MeasureConfig::load(file.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
