pub mod batch;
pub mod error;
pub mod ffi;
pub mod function;
pub mod value;
