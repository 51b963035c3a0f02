//! Configuration management for objective functions.
//!
//! The only configuration this crate owns is [`ObjectiveConfig`]. It can be
//! built programmatically, parsed from LightGBM-style `key=value` parameters,
//! loaded from TOML or JSON files, and overridden from the environment.

pub mod objective;

pub use objective::ObjectiveConfig;

/// Utility functions for configuration management
pub mod utils {
    use super::*;
    use crate::core::error::Result;
    use std::collections::HashMap;

    /// Parse configuration from key-value pairs. Unknown keys are logged and ignored.
    pub fn parse_config_from_map(map: &HashMap<String, String>) -> Result<ObjectiveConfig> {
        let mut config = ObjectiveConfig::default();
        // deterministic order, so the first bad key is always the one reported
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        for key in keys {
            if !config.set_parameter(key, &map[key])? {
                log::warn!("Unknown objective parameter: {}", key);
            }
        }
        Ok(config)
    }

    /// Convert configuration to key-value pairs
    pub fn config_to_map(config: &ObjectiveConfig) -> HashMap<String, String> {
        config.as_parameter_map()
    }
}
