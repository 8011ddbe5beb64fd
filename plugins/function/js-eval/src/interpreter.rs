use std::fmt;

/// Interpreter-neutral value handed to a script as a call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Null,
    /// Native small integer.
    Integer(i32),
    /// Native double.
    Number(f64),
    String(String),
}

/// Error raised by the interpreter while compiling or running a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// Safe string rendering of the thrown value.
    pub message: String,
    /// The thrown value's `stack` property, when it has one.
    pub stack: Option<String>,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stack: None }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(stack) = &self.stack {
            write!(f, "\nJS stack:\n{stack}")?;
        }
        Ok(())
    }
}

/// An isolated, single-use embedded interpreter instance.
///
/// Dropping the instance destroys it and releases all of its memory; nothing
/// created through one instance may outlive it.
pub trait Interpreter: Sized {
    /// Creation options (runtime limits etc.).
    type Options;
    /// A value living inside this instance.
    type Value;

    fn create(options: &Self::Options) -> Result<Self, String>;

    /// Evaluate `source` as a script and return its completion value.
    fn eval(&mut self, source: &str) -> Result<Self::Value, ScriptError>;

    fn is_callable(&self, value: &Self::Value) -> bool;

    /// Call `callable` with positional `args` and an undefined receiver.
    fn call(
        &mut self,
        callable: &Self::Value,
        args: &[ScriptValue],
    ) -> Result<Self::Value, ScriptError>;

    /// String conversion that never fails, even if the value's own
    /// conversion throws.
    fn safe_to_string(&mut self, value: &Self::Value) -> String;
}
