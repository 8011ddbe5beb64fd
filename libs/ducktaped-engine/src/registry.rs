use std::collections::HashMap;
use std::sync::Arc;

use ducktaped_api::batch::{OutputColumn, RowBatch};
use ducktaped_api::error::PluginError;
use ducktaped_api::function::{ArgType, ScalarFunction};

use crate::error::EngineError;

/// Registered scalar functions, looked up by (case-insensitive) name.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn ScalarFunction>>,
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its signature name.
    pub fn register(&mut self, function: Arc<dyn ScalarFunction>) -> Result<(), EngineError> {
        let name = function.signature().name.to_lowercase();
        if self.functions.contains_key(&name) {
            return Err(EngineError::DuplicateFunction(name));
        }
        tracing::debug!(function = %name, "registered scalar function");
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ScalarFunction>> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch one batch to `name`.
    ///
    /// Checks the argument count and the cell type of every typed argument
    /// against the declared signature, then checks the function produced
    /// exactly one value per row.
    pub fn invoke(
        &self,
        name: &str,
        input: &dyn RowBatch,
        output: &mut dyn OutputColumn,
    ) -> Result<(), EngineError> {
        let function = self
            .get(name)
            .ok_or_else(|| EngineError::FunctionNotFound(name.to_string()))?;
        let signature = function.signature();

        let arity = input.column_count();
        if !signature.accepts_arity(arity) {
            return Err(PluginError::signature(format!(
                "{} expects {}{} arguments, got {arity}",
                signature.name,
                if signature.varargs.is_some() { "at least " } else { "" },
                signature.params.len(),
            ))
            .into());
        }

        for column in 0..arity {
            let declared = match signature.param_type(column) {
                Some(ArgType::Any) | None => continue,
                Some(declared) => declared,
            };
            for row in 0..input.row_count() {
                let actual = input.cell(column, row).cell_type();
                if !declared.accepts(actual) {
                    return Err(PluginError::signature(format!(
                        "{}: argument {column} expects {declared:?}, got {actual:?} at row {row}",
                        signature.name
                    ))
                    .into());
                }
            }
        }

        let mut counted = CountingOutput { inner: output, pushed: 0 };
        function
            .invoke(input, &mut counted)
            .map_err(|e| EngineError::from(e.with_context(&signature.name)))?;

        if counted.pushed != input.row_count() {
            return Err(PluginError::logic(format!(
                "{} produced {} values for {} rows",
                signature.name,
                counted.pushed,
                input.row_count()
            ))
            .into());
        }
        Ok(())
    }
}

struct CountingOutput<'a> {
    inner: &'a mut dyn OutputColumn,
    pushed: usize,
}

impl OutputColumn for CountingOutput<'_> {
    fn push_str(&mut self, value: &str) {
        self.pushed += 1;
        self.inner.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use ducktaped_api::batch::MemoryBatch;
    use ducktaped_api::error::ErrorKind;
    use ducktaped_api::function::FunctionSignature;
    use ducktaped_api::value::{Cell, CellType};

    use super::*;

    /// `upper(text)`; pushes one value too few when `short` is set.
    struct Upper {
        signature: FunctionSignature,
        short: bool,
    }

    impl Upper {
        fn new(short: bool) -> Self {
            Self {
                signature: FunctionSignature {
                    name: "Upper".into(),
                    params: vec![ArgType::Exact(CellType::Varchar)],
                    varargs: None,
                    return_type: ArgType::Exact(CellType::Varchar),
                },
                short,
            }
        }
    }

    impl ScalarFunction for Upper {
        fn signature(&self) -> &FunctionSignature {
            &self.signature
        }

        fn invoke(
            &self,
            input: &dyn RowBatch,
            output: &mut dyn OutputColumn,
        ) -> Result<(), PluginError> {
            let rows = input.row_count() - usize::from(self.short);
            for row in 0..rows {
                output.push_str(&input.cell(0, row).to_string().to_uppercase());
            }
            Ok(())
        }
    }

    fn registry(short: bool) -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.register(Arc::new(Upper::new(short))).unwrap();
        registry
    }

    #[test]
    fn dispatches_by_case_insensitive_name() {
        let batch = MemoryBatch::from_rows(vec![
            vec![Cell::Varchar("a".into())],
            vec![Cell::Null],
        ])
        .unwrap();
        let mut out: Vec<String> = Vec::new();
        registry(false).invoke("UPPER", &batch, &mut out).unwrap();
        assert_eq!(out, vec!["A", "NULL"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry(false);
        let err = registry.register(Arc::new(Upper::new(false))).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateFunction(name) if name == "upper"));
    }

    #[test]
    fn unknown_function() {
        let mut out: Vec<String> = Vec::new();
        let err = registry(false)
            .invoke("lower", &MemoryBatch::empty(1), &mut out)
            .unwrap_err();
        assert!(matches!(err, EngineError::FunctionNotFound(_)));
    }

    #[test]
    fn arity_and_types_are_checked() {
        let registry = registry(false);
        let mut out: Vec<String> = Vec::new();

        let err = registry.invoke("upper", &MemoryBatch::empty(1), &mut out).unwrap_err();
        match err {
            EngineError::Plugin(e) => {
                assert_eq!(e.kind, ErrorKind::Signature);
                assert_eq!(e.message, "Upper expects 1 arguments, got 0");
            }
            other => panic!("unexpected error: {other}"),
        }

        let batch = MemoryBatch::from_rows(vec![vec![Cell::Integer(1)]]).unwrap();
        let err = registry.invoke("upper", &batch, &mut out).unwrap_err();
        assert!(matches!(err, EngineError::Plugin(e) if e.kind == ErrorKind::Signature));
        assert!(out.is_empty());
    }

    #[test]
    fn short_output_is_a_logic_error() {
        let batch = MemoryBatch::from_rows(vec![vec![Cell::Varchar("a".into())]]).unwrap();
        let mut out: Vec<String> = Vec::new();
        let err = registry(true).invoke("upper", &batch, &mut out).unwrap_err();
        assert!(matches!(err, EngineError::Plugin(e) if e.kind == ErrorKind::Logic));
    }
}
