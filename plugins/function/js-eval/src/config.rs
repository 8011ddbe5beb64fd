use ducktaped_api::error::PluginError;

use crate::boa::BoaOptions;

fn default_function_name() -> String {
    "js_eval".to_string()
}

/// Plugin configuration, passed by the host as JSON.
///
/// Limits are `0` (off) by default: a script runs until it returns.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsEvalConfig {
    /// Name the function is registered under.
    pub function_name: String,
    /// Abort a script after this many loop iterations.
    pub loop_iteration_limit: u64,
    /// Maximum JS call depth.
    pub recursion_limit: usize,
    /// Maximum interpreter value-stack size.
    pub stack_size_limit: usize,
}

impl Default for JsEvalConfig {
    fn default() -> Self {
        Self {
            function_name: default_function_name(),
            loop_iteration_limit: 0,
            recursion_limit: 0,
            stack_size_limit: 0,
        }
    }
}

impl JsEvalConfig {
    pub fn validate(&self) -> Result<(), PluginError> {
        if self.function_name.trim().is_empty() {
            return Err(PluginError::config("function_name must not be empty"));
        }
        Ok(())
    }

    pub fn interpreter_options(&self) -> BoaOptions {
        BoaOptions {
            loop_iteration_limit: self.loop_iteration_limit,
            recursion_limit: self.recursion_limit,
            stack_size_limit: self.stack_size_limit,
        }
    }
}
