use crate::error::PluginError;

/// Current ABI version. Host checks this against plugin's `dt_abi_version()`.
///
/// Bump whenever `ScalarFunction`, `RowBatch`, `OutputColumn`, `Cell` or the
/// `#[repr(C)]` structs below change in a binary-incompatible way. Host and
/// plugins are built by the same compiler from one workspace, so trait
/// objects cross the boundary with the Rust ABI.
pub const DT_ABI_VERSION: u32 = 1;

/// FFI return struct from `dt_create_function`.
#[repr(C)]
pub struct PluginCreateResult {
    /// Pointer to the created plugin object (`Box<Box<dyn ScalarFunction>>`).
    /// Null if creation failed.
    pub plugin_ptr: *mut (),
    /// Pointer to a heap-allocated UTF-8 error string.
    /// Null if creation succeeded.
    pub error_ptr: *mut u8,
    /// Length of the error string.
    pub error_len: usize,
}

/// Type signature for `dt_abi_version` symbol.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

/// Type signature for `dt_create_function`.
/// Takes the plugin config as JSON bytes (borrowed for the duration of the call).
pub type CreateFunctionFn =
    unsafe extern "C" fn(config_json_ptr: *const u8, config_json_len: usize) -> PluginCreateResult;

/// Type signature for `dt_destroy_function`.
pub type DestroyFunctionFn = unsafe extern "C" fn(plugin_ptr: *mut ());

/// Helper: create a successful `PluginCreateResult` from a trait object.
///
/// Double-box: `Box<dyn Trait>` is a fat pointer, `Box<Box<dyn Trait>>` is thin
/// and fits in `*mut ()`.
pub fn plugin_ok<T: ?Sized>(plugin: Box<T>) -> PluginCreateResult {
    let boxed: Box<Box<T>> = Box::new(plugin);
    PluginCreateResult {
        plugin_ptr: Box::into_raw(boxed) as *mut (),
        error_ptr: std::ptr::null_mut(),
        error_len: 0,
    }
}

/// Helper: create a failed `PluginCreateResult` from an error message.
pub fn plugin_err(msg: &str) -> PluginCreateResult {
    let bytes = msg.as_bytes().to_vec().into_boxed_slice();
    let len = bytes.len();
    PluginCreateResult {
        plugin_ptr: std::ptr::null_mut(),
        error_ptr: Box::into_raw(bytes) as *mut u8,
        error_len: len,
    }
}

/// Take ownership of the error string inside a failed `PluginCreateResult`.
///
/// # Safety
///
/// `result` must come from `plugin_err` (or carry a null `error_ptr`), and
/// must not be read again afterwards.
pub unsafe fn take_create_error(result: &PluginCreateResult) -> String {
    if result.error_ptr.is_null() || result.error_len == 0 {
        return "unknown error".to_string();
    }
    let bytes = unsafe {
        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            result.error_ptr,
            result.error_len,
        ))
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Deserialize plugin config from FFI raw pointer + length.
///
/// Returns `T::default()` if the pointer is null or the length is 0.
///
/// # Safety
///
/// If `config_json_ptr` is not null it must point to `config_json_len` valid bytes.
pub unsafe fn parse_plugin_config<T: Default + serde::de::DeserializeOwned>(
    config_json_ptr: *const u8,
    config_json_len: usize,
) -> Result<T, PluginError> {
    if config_json_ptr.is_null() || config_json_len == 0 {
        return Ok(T::default());
    }
    let json_bytes = unsafe { std::slice::from_raw_parts(config_json_ptr, config_json_len) };
    let json_str = std::str::from_utf8(json_bytes)
        .map_err(|e| PluginError::config(format!("invalid UTF-8 config: {e}")))?;
    serde_json::from_str(json_str)
        .map_err(|e| PluginError::config(format!("invalid config JSON: {e}")))
}

/// Macro: export `dt_abi_version` function.
///
/// Every plugin crate must call this exactly once at crate root.
#[macro_export]
macro_rules! dt_abi_version_fn {
    () => {
        #[unsafe(no_mangle)]
        pub extern "C" fn dt_abi_version() -> u32 {
            $crate::ffi::DT_ABI_VERSION
        }
    };
}

/// Macro: export `dt_destroy_function` for a `ScalarFunction` plugin.
#[macro_export]
macro_rules! dt_destroy_fn {
    () => {
        /// # Safety
        ///
        /// `ptr` must come from `dt_create_function` of this library and must
        /// not be used afterwards.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn dt_destroy_function(ptr: *mut ()) {
            if !ptr.is_null() {
                let _ = unsafe {
                    Box::from_raw(ptr as *mut Box<dyn $crate::function::ScalarFunction>)
                };
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        limit: u64,
    }

    #[test]
    fn empty_config_is_default() {
        let cfg: Sample = unsafe { parse_plugin_config(std::ptr::null(), 0) }.unwrap();
        assert_eq!(cfg, Sample::default());
    }

    #[test]
    fn config_is_parsed_from_json() {
        let json = br#"{"limit": 10}"#;
        let cfg: Sample = unsafe { parse_plugin_config(json.as_ptr(), json.len()) }.unwrap();
        assert_eq!(cfg, Sample { name: String::new(), limit: 10 });

        let bad = b"{";
        let err = unsafe { parse_plugin_config::<Sample>(bad.as_ptr(), bad.len()) }.unwrap_err();
        assert!(err.message.starts_with("invalid config JSON"));
    }

    #[test]
    fn create_error_round_trips() {
        let result = plugin_err("bad limit");
        assert!(result.plugin_ptr.is_null());
        assert_eq!(unsafe { take_create_error(&result) }, "bad limit");
    }
}
