use std::path::Path;
use std::sync::Arc;

use ducktaped_api::function::ScalarFunction;

use crate::config::{FunctionConfig, HostConfig};
use crate::error::EngineError;
use crate::plugin_host;
use crate::registry::FunctionRegistry;

/// The running host: every configured function plugin, loaded and registered.
#[derive(Debug)]
pub struct Host {
    registry: FunctionRegistry,
}

impl Host {
    /// Load every function plugin named in `config`, in order.
    ///
    /// The first plugin that fails to load or register aborts the bootstrap;
    /// functions loaded before it are dropped (and destroyed) with the registry.
    pub fn bootstrap(config: &HostConfig) -> Result<Self, EngineError> {
        let mut registry = FunctionRegistry::new();
        for function_cfg in &config.functions {
            let ctx = format!("function plugin '{}'", function_cfg.plugin);
            let function = load(function_cfg).map_err(|e| e.with_context(&ctx))?;
            registry.register(function).map_err(|e| e.with_context(&ctx))?;
        }
        tracing::info!(functions = ?registry.names(), "host ready");
        Ok(Self { registry })
    }

    /// Start from functions linked into the binary instead of plugins.
    pub fn with_functions(
        functions: impl IntoIterator<Item = Arc<dyn ScalarFunction>>,
    ) -> Result<Self, EngineError> {
        let mut registry = FunctionRegistry::new();
        for function in functions {
            registry.register(function)?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }
}

fn load(function_cfg: &FunctionConfig) -> Result<Arc<dyn ScalarFunction>, EngineError> {
    let config_json = function_cfg.config_json()?;
    let function =
        plugin_host::load_function(Path::new(&function_cfg.plugin), config_json.as_deref())?;
    Ok(Arc::new(function))
}
