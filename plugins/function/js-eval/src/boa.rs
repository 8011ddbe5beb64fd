use boa_engine::{js_string, Context, JsError, JsString, JsValue, Source};

use crate::interpreter::{Interpreter, ScriptError, ScriptValue};

/// Runtime limits applied to every fresh context. `0` keeps Boa's default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoaOptions {
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
    pub stack_size_limit: usize,
}

/// JavaScript interpreter backed by a private Boa `Context`.
///
/// The context (realm, globals, heap) is dropped together with this value.
pub struct BoaInterpreter {
    context: Context,
}

impl Interpreter for BoaInterpreter {
    type Options = BoaOptions;
    type Value = JsValue;

    fn create(options: &BoaOptions) -> Result<Self, String> {
        let mut context = Context::builder().build().map_err(|e| e.to_string())?;

        let limits = context.runtime_limits_mut();
        if options.loop_iteration_limit > 0 {
            limits.set_loop_iteration_limit(options.loop_iteration_limit);
        }
        if options.recursion_limit > 0 {
            limits.set_recursion_limit(options.recursion_limit);
        }
        if options.stack_size_limit > 0 {
            limits.set_stack_size_limit(options.stack_size_limit);
        }

        Ok(Self { context })
    }

    fn eval(&mut self, source: &str) -> Result<JsValue, ScriptError> {
        match self.context.eval(Source::from_bytes(source)) {
            Ok(value) => Ok(value),
            Err(e) => Err(self.script_error(e)),
        }
    }

    fn is_callable(&self, value: &JsValue) -> bool {
        value.is_callable()
    }

    fn call(&mut self, callable: &JsValue, args: &[ScriptValue]) -> Result<JsValue, ScriptError> {
        let Some(function) = callable.as_callable() else {
            return Err(ScriptError::new("TypeError: value is not a function"));
        };
        let args: Vec<JsValue> = args.iter().map(to_js_value).collect();
        match function.call(&JsValue::undefined(), &args, &mut self.context) {
            Ok(value) => Ok(value),
            Err(e) => Err(self.script_error(e)),
        }
    }

    fn safe_to_string(&mut self, value: &JsValue) -> String {
        match value.to_string(&mut self.context) {
            Ok(s) => s.to_std_string_escaped(),
            // `toString` itself threw.
            Err(_) if value.is_object() => "[object Object]".to_string(),
            Err(_) => value.display().to_string(),
        }
    }
}

impl BoaInterpreter {
    /// Message and optional `stack` of a thrown value.
    fn script_error(&mut self, error: JsError) -> ScriptError {
        // Engine-native errors (syntax errors, runtime limits) are not JS objects yet.
        let Some(thrown) = error.as_opaque().cloned() else {
            return ScriptError::new(error.to_string());
        };

        let message = self.safe_to_string(&thrown);
        let stack = match thrown.as_object() {
            Some(object) => object.get(js_string!("stack"), &mut self.context).ok(),
            None => None,
        };
        let stack = match stack {
            Some(value) if !value.is_null_or_undefined() => Some(self.safe_to_string(&value)),
            _ => None,
        };

        ScriptError { message, stack }
    }
}

fn to_js_value(value: &ScriptValue) -> JsValue {
    match value {
        ScriptValue::Null => JsValue::null(),
        ScriptValue::Integer(i) => JsValue::new(*i),
        ScriptValue::Number(n) => JsValue::new(*n),
        ScriptValue::String(s) => JsValue::new(JsString::from(s.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> BoaInterpreter {
        BoaInterpreter::create(&BoaOptions::default()).unwrap()
    }

    #[test]
    fn eval_and_call() {
        let mut js = interpreter();
        let f = js.eval("(function(a, b) { return a * b; })").unwrap();
        assert!(js.is_callable(&f));

        let out = js
            .call(&f, &[ScriptValue::Integer(6), ScriptValue::Number(7.0)])
            .unwrap();
        assert_eq!(js.safe_to_string(&out), "42");
    }

    #[test]
    fn syntax_errors_carry_a_message() {
        let mut js = interpreter();
        let err = js.eval("(function( {)").unwrap_err();
        assert!(err.message.contains("SyntaxError"), "{}", err.message);
    }

    #[test]
    fn thrown_errors_are_stringified() {
        let mut js = interpreter();
        let f = js.eval("(function() { throw new Error('boom'); })").unwrap();
        let err = js.call(&f, &[]).unwrap_err();
        assert_eq!(err.message, "Error: boom");
    }

    #[test]
    fn thrown_primitives_are_stringified() {
        let mut js = interpreter();
        let f = js.eval("(function() { throw 42; })").unwrap();
        let err = js.call(&f, &[]).unwrap_err();
        assert_eq!(err.message, "42");
        assert_eq!(err.stack, None);
    }

    #[test]
    fn safe_to_string_survives_throwing_to_string() {
        let mut js = interpreter();
        let value = js
            .eval("({ toString: function() { throw new Error('nope'); } })")
            .unwrap();
        assert_eq!(js.safe_to_string(&value), "[object Object]");
    }

    #[test]
    fn null_and_strings_are_native() {
        let mut js = interpreter();
        let f = js
            .eval("(function(a, b) { return (a === null) + ':' + typeof b; })")
            .unwrap();
        let out = js
            .call(&f, &[ScriptValue::Null, ScriptValue::String("x".into())])
            .unwrap();
        assert_eq!(js.safe_to_string(&out), "true:string");
    }
}
