use crate::{error::LowerError, lambda::Lambda};

/// Lowers the introspectable form of a predicate into a query language.
pub trait FilterCompiler {
    /// The type of filter that this compiler produces.
    type Filter;

    fn compile(lambda: &Lambda) -> Result<Self::Filter, LowerError>;
}
