use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::layout::DEFAULT_PALETTE_SIZE;

/// Tunables for the lane layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Number of distinct colors the renderer cycles through
    pub palette_size: usize,
}

impl GraphConfig {
    pub fn with_palette_size(palette_size: usize) -> Self {
        Self { palette_size }
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette_size == 0 {
            return Err(GraphError::InvalidConfig {
                reason: "palette_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_eight_colors() {
        assert_eq!(GraphConfig::default().palette_size, 8);
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_palette_is_rejected() {
        let err = GraphConfig::with_palette_size(0).validate().unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig { .. }));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: GraphConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, GraphConfig::default());

        let cfg: GraphConfig = serde_json::from_str(r#"{"palette_size": 12}"#).unwrap();
        assert_eq!(cfg.palette_size, 12);
    }
}
