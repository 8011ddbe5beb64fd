use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ducktaped_api::batch::{OutputColumn, RowBatch};

use crate::boa::BoaInterpreter;
use crate::interpreter::{Interpreter, ScriptError, ScriptValue};
use crate::marshal::{marshal, source_text};

/// Why a row produced a diagnostic instead of a value.
///
/// `Display` renders the exact text placed in the row's result slot; callers
/// tell failures apart from results only by these prefixes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("js_eval error: requires at least one argument (the JS function)")]
    MissingFunction,

    #[error("js_eval error: Failed to create Duktape context")]
    ContextCreation,

    #[error("JS compile error: {error}\nWhile compiling JS code: {code}")]
    Compile { error: ScriptError, code: String },

    #[error("JS runtime error: {0}")]
    Runtime(ScriptError),

    #[error("js_eval internal error: {0}")]
    Internal(String),

    #[error("js_eval unknown internal error")]
    UnknownInternal,
}

impl EvalError {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        if let Some(msg) = payload.downcast_ref::<&str>() {
            EvalError::Internal((*msg).to_string())
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            EvalError::Internal(msg.clone())
        } else {
            EvalError::UnknownInternal
        }
    }
}

/// Result of evaluating one row.
pub type Outcome = Result<String, EvalError>;

/// Flatten an outcome into the text stored in the result column.
pub fn outcome_text(outcome: &Outcome) -> String {
    match outcome {
        Ok(value) => value.clone(),
        Err(e) => e.to_string(),
    }
}

/// Evaluates `(code, args...)` rows, one fresh interpreter per row.
///
/// Holds only immutable options, so one evaluator may serve concurrent
/// batches from different threads.
pub struct RowEvaluator<I: Interpreter = BoaInterpreter> {
    options: I::Options,
}

impl<I: Interpreter> RowEvaluator<I> {
    pub fn new(options: I::Options) -> Self {
        Self { options }
    }

    /// One outcome per row, in row order.
    pub fn evaluate(&self, batch: &dyn RowBatch) -> Vec<Outcome> {
        (0..batch.row_count())
            .map(|row| self.evaluate_row(batch, row))
            .collect()
    }

    /// Evaluate every row and append its text to `output`.
    pub fn evaluate_into(&self, batch: &dyn RowBatch, output: &mut dyn OutputColumn) {
        for row in 0..batch.row_count() {
            let outcome = self.evaluate_row(batch, row);
            output.push_str(&outcome_text(&outcome));
        }
    }

    /// Evaluate a single row. Never panics.
    pub fn evaluate_row(&self, batch: &dyn RowBatch, row: usize) -> Outcome {
        if batch.column_count() < 1 {
            return Err(EvalError::MissingFunction);
        }

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.run(batch, row))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(EvalError::from_panic(payload)),
        };

        match &outcome {
            Ok(_) => tracing::trace!(row, "js_eval row succeeded"),
            Err(EvalError::Internal(_) | EvalError::UnknownInternal) => {
                tracing::warn!(row, error = %outcome_text(&outcome), "js_eval internal fault")
            }
            Err(e) => tracing::debug!(row, error = %e, "js_eval row failed"),
        }
        outcome
    }

    /// The interpreter is dropped on every return path, and during unwinding
    /// if anything in here panics.
    fn run(&self, batch: &dyn RowBatch, row: usize) -> Outcome {
        let code = source_text(&batch.cell(0, row));

        let mut interpreter = I::create(&self.options).map_err(|reason| {
            tracing::debug!(row, %reason, "interpreter creation failed");
            EvalError::ContextCreation
        })?;

        let callable = interpreter
            .eval(&format!("({code})"))
            .map_err(|error| EvalError::Compile { error, code: code.clone() })?;
        if !interpreter.is_callable(&callable) {
            return Err(EvalError::Internal("compiled JS value is not a function".into()));
        }

        let args: Vec<ScriptValue> = (1..batch.column_count())
            .map(|column| marshal(&batch.cell(column, row)))
            .collect();

        let value = interpreter.call(&callable, &args).map_err(EvalError::Runtime)?;
        Ok(interpreter.safe_to_string(&value))
    }
}
