use serde::Deserialize;

use crate::error::EngineError;

/// Host configuration, parsed from TOML.
///
/// ```toml
/// [[functions]]
/// plugin = "target/release/libducktaped_js_eval.so"
/// config = { loop_iteration_limit = 1000000 }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Function plugin definitions, registered in order.
    #[serde(default)]
    pub functions: Vec<FunctionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionConfig {
    /// Path to the function .so plugin.
    pub plugin: String,
    /// Plugin-specific settings, handed to the plugin as JSON.
    #[serde(default)]
    pub config: Option<toml::Value>,
}

impl FunctionConfig {
    /// Plugin config serialized for the FFI boundary. `None` when absent.
    pub fn config_json(&self) -> Result<Option<String>, EngineError> {
        self.config
            .as_ref()
            .map(|value| {
                serde_json::to_string(value)
                    .map_err(|e| EngineError::Config(format!("plugin '{}': {e}", self.plugin)))
            })
            .transpose()
    }
}

impl HostConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}
