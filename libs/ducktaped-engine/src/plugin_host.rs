use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use ducktaped_api::batch::{OutputColumn, RowBatch};
use ducktaped_api::error::PluginError;
use ducktaped_api::ffi::{
    AbiVersionFn, CreateFunctionFn, DestroyFunctionFn, DT_ABI_VERSION, PluginCreateResult,
    take_create_error,
};
use ducktaped_api::function::{FunctionSignature, ScalarFunction};

use crate::error::EngineError;

/// A loaded .so plugin library with ABI version already verified.
pub struct PluginLib {
    path: PathBuf,
    lib: Library,
    create_fn: CreateFunctionFn,
    destroy_fn: DestroyFunctionFn,
}

impl PluginLib {
    /// Load a function plugin .so from `path`, verify ABI version, resolve symbols.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let lib = unsafe { Library::new(path) }.map_err(|e| {
            EngineError::Config(format!("failed to load plugin '{}': {e}", path.display()))
        })?;

        let abi_fn: Symbol<AbiVersionFn> =
            unsafe { lib.get(b"dt_abi_version") }.map_err(|e| {
                EngineError::Config(format!(
                    "plugin '{}' missing dt_abi_version symbol: {e}",
                    path.display()
                ))
            })?;

        let plugin_abi = unsafe { abi_fn() };
        if plugin_abi != DT_ABI_VERSION {
            return Err(EngineError::Config(format!(
                "plugin '{}' ABI version mismatch: plugin={plugin_abi}, host={DT_ABI_VERSION}",
                path.display()
            )));
        }

        let create_fn: CreateFunctionFn =
            *unsafe { lib.get::<CreateFunctionFn>(b"dt_create_function") }.map_err(|e| {
                EngineError::Config(format!(
                    "plugin '{}' missing create symbol: {e}",
                    path.display()
                ))
            })?;

        let destroy_fn: DestroyFunctionFn =
            *unsafe { lib.get::<DestroyFunctionFn>(b"dt_destroy_function") }.map_err(|e| {
                EngineError::Config(format!(
                    "plugin '{}' missing destroy symbol: {e}",
                    path.display()
                ))
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            lib,
            create_fn,
            destroy_fn,
        })
    }

    /// Call the plugin's create function with its JSON config (`None` → defaults).
    pub fn create(self, config_json: Option<&str>) -> Result<LoadedFunction, EngineError> {
        let bytes = config_json.unwrap_or_default().as_bytes();
        let result: PluginCreateResult = unsafe { (self.create_fn)(bytes.as_ptr(), bytes.len()) };

        if result.plugin_ptr.is_null() {
            let msg = unsafe { take_create_error(&result) };
            return Err(EngineError::Config(format!(
                "plugin '{}' create failed: {msg}",
                self.path.display()
            )));
        }

        Ok(LoadedFunction {
            ptr: result.plugin_ptr,
            destroy_fn: self.destroy_fn,
            _lib: self.lib,
        })
    }
}

/// A function created by a plugin library.
///
/// Owns the library, so the code stays mapped for as long as the function
/// lives; dropping it calls the plugin's destroy symbol first.
pub struct LoadedFunction {
    ptr: *mut (),
    destroy_fn: DestroyFunctionFn,
    _lib: Library,
}

// Safety: `ptr` is a `Box<Box<dyn ScalarFunction>>`, and `ScalarFunction: Send + Sync`.
unsafe impl Send for LoadedFunction {}
unsafe impl Sync for LoadedFunction {}

impl LoadedFunction {
    fn function(&self) -> &dyn ScalarFunction {
        unsafe { &**(self.ptr as *const Box<dyn ScalarFunction>) }
    }
}

impl ScalarFunction for LoadedFunction {
    fn signature(&self) -> &FunctionSignature {
        self.function().signature()
    }

    fn invoke(
        &self,
        input: &dyn RowBatch,
        output: &mut dyn OutputColumn,
    ) -> Result<(), PluginError> {
        self.function().invoke(input, output)
    }
}

impl Drop for LoadedFunction {
    fn drop(&mut self) {
        unsafe { (self.destroy_fn)(self.ptr) };
    }
}

/// Load a `ScalarFunction` plugin from a .so file.
///
/// 1. Load .so, verify ABI version.
/// 2. Call `dt_create_function(config_json)`.
pub fn load_function(
    path: &Path,
    config_json: Option<&str>,
) -> Result<LoadedFunction, EngineError> {
    let function = PluginLib::load(path)?.create(config_json)?;
    tracing::info!(
        plugin = %path.display(),
        function = %function.signature().name,
        "loaded function plugin"
    );
    Ok(function)
}
