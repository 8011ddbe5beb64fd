//! `js_eval(code, args...)`: evaluate a JavaScript function per row.
//!
//! The first argument is the source of a function expression, e.g.
//! `function(a, b) { return a + b; }`; the remaining arguments are passed to
//! it positionally. Every row gets a fresh interpreter that is destroyed
//! before the next row starts. The result is always text: the stringified
//! return value, or a diagnostic starting with one of
//! `js_eval error:`, `JS compile error:`, `JS runtime error:`,
//! `js_eval internal error:` or `js_eval unknown internal error`.

pub mod boa;
pub mod config;
pub mod evaluator;
pub mod interpreter;
pub mod marshal;

use ducktaped_api::batch::{OutputColumn, RowBatch};
use ducktaped_api::error::PluginError;
use ducktaped_api::ffi;
use ducktaped_api::function::{ArgType, FunctionSignature, ScalarFunction};
use ducktaped_api::value::CellType;

use crate::boa::BoaInterpreter;
use crate::config::JsEvalConfig;
use crate::evaluator::RowEvaluator;

/// The `js_eval` scalar function.
pub struct JsEvalFunction {
    signature: FunctionSignature,
    evaluator: RowEvaluator<BoaInterpreter>,
}

impl JsEvalFunction {
    pub fn new(config: JsEvalConfig) -> Result<Self, PluginError> {
        config.validate()?;
        let signature = FunctionSignature {
            name: config.function_name.clone(),
            // Zero fixed params: a call without the code argument still
            // reaches the evaluator and gets a per-row diagnostic.
            params: Vec::new(),
            varargs: Some(ArgType::Any),
            return_type: ArgType::Exact(CellType::Varchar),
        };
        Ok(Self {
            signature,
            evaluator: RowEvaluator::new(config.interpreter_options()),
        })
    }

    pub fn evaluator(&self) -> &RowEvaluator<BoaInterpreter> {
        &self.evaluator
    }
}

impl ScalarFunction for JsEvalFunction {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn invoke(
        &self,
        input: &dyn RowBatch,
        output: &mut dyn OutputColumn,
    ) -> Result<(), PluginError> {
        tracing::trace!(
            function = %self.signature.name,
            rows = input.row_count(),
            columns = input.column_count(),
            "evaluating batch"
        );
        self.evaluator.evaluate_into(input, output);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FFI exports for dynamic (.so) loading
// ---------------------------------------------------------------------------

ducktaped_api::dt_abi_version_fn!();
ducktaped_api::dt_destroy_fn!();

/// # Safety
///
/// `config_json_ptr` must be null or point to `config_json_len` valid bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dt_create_function(
    config_json_ptr: *const u8,
    config_json_len: usize,
) -> ffi::PluginCreateResult {
    let config: JsEvalConfig =
        match unsafe { ffi::parse_plugin_config(config_json_ptr, config_json_len) } {
            Ok(c) => c,
            Err(e) => return ffi::plugin_err(&e.to_string()),
        };
    match JsEvalFunction::new(config) {
        Ok(function) => ffi::plugin_ok(Box::new(function) as Box<dyn ScalarFunction>),
        Err(e) => ffi::plugin_err(&e.to_string()),
    }
}
