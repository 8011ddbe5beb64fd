//! Host side of ducktaped: loads scalar function plugins, registers them by
//! name and dispatches column batches to them.

pub mod bootstrap;
pub mod columnar;
pub mod config;
pub mod error;
pub mod plugin_host;
pub mod registry;

pub use bootstrap::Host;
pub use error::EngineError;
pub use registry::FunctionRegistry;
