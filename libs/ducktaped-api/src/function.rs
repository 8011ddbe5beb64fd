use crate::batch::{OutputColumn, RowBatch};
use crate::error::PluginError;
use crate::value::CellType;

/// Declared type of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// Accepts any cell type.
    Any,
    Exact(CellType),
}

impl ArgType {
    pub fn accepts(&self, ty: CellType) -> bool {
        match self {
            ArgType::Any => true,
            // NULL is accepted everywhere, like in SQL.
            ArgType::Exact(_) if ty == CellType::Null => true,
            ArgType::Exact(expected) => *expected == ty,
        }
    }
}

/// Name, arity and types a scalar function is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    /// Fixed leading parameters.
    pub params: Vec<ArgType>,
    /// Type of any number of trailing arguments; `None` means no varargs.
    pub varargs: Option<ArgType>,
    pub return_type: ArgType,
}

impl FunctionSignature {
    /// Check an argument count against the declaration.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.varargs.is_some() {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Declared type of the argument at `index`, if the index is valid.
    pub fn param_type(&self, index: usize) -> Option<ArgType> {
        self.params.get(index).copied().or(self.varargs)
    }
}

/// Scalar function plugin.
///
/// The host calls `invoke` once per batch, possibly from several threads at
/// once on different batches. Implementations must push exactly
/// `input.row_count()` values into `output`, in row order.
pub trait ScalarFunction: Send + Sync {
    fn signature(&self) -> &FunctionSignature;

    fn invoke(&self, input: &dyn RowBatch, output: &mut dyn OutputColumn)
        -> Result<(), PluginError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variadic() -> FunctionSignature {
        FunctionSignature {
            name: "f".into(),
            params: vec![ArgType::Exact(CellType::Varchar)],
            varargs: Some(ArgType::Any),
            return_type: ArgType::Exact(CellType::Varchar),
        }
    }

    #[test]
    fn variadic_arity() {
        let sig = variadic();
        assert!(!sig.accepts_arity(0));
        assert!(sig.accepts_arity(1));
        assert!(sig.accepts_arity(7));
        assert_eq!(sig.param_type(0), Some(ArgType::Exact(CellType::Varchar)));
        assert_eq!(sig.param_type(5), Some(ArgType::Any));
    }

    #[test]
    fn fixed_arity() {
        let sig = FunctionSignature { varargs: None, ..variadic() };
        assert!(sig.accepts_arity(1));
        assert!(!sig.accepts_arity(2));
        assert_eq!(sig.param_type(1), None);
    }

    #[test]
    fn null_matches_exact_types() {
        let ty = ArgType::Exact(CellType::Date);
        assert!(ty.accepts(CellType::Date));
        assert!(ty.accepts(CellType::Null));
        assert!(!ty.accepts(CellType::Varchar));
    }
}
