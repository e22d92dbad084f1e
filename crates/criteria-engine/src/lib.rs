pub mod compile;
pub mod context;
pub mod error;
pub mod filter;
pub mod lambda;
pub mod options;
pub mod predicate;
pub mod schema;

mod like;
mod resolve;

pub use compile::Compiler;
pub use context::{ContextValue, Navigable};
pub use error::{CompileError, EvalError, LowerError, Result};
pub use filter::{SqlFilter, compiler::FilterCompiler, sql::SqlFilterCompiler};
pub use lambda::{Expr, Lambda};
pub use options::{Clock, CompileOptions, LikeEvaluation};
pub use predicate::Predicate;
pub use schema::{Record, Schema};

use criteria_syntax::Node;
use tracing::debug;

/// Compile `node` into a predicate over `T` with the default options.
pub fn compile<T: Record>(node: &Node, context: Option<&ContextValue>) -> Result<Predicate<T>> {
    let compiler = match context {
        Some(context) => Compiler::default().with_context(context),
        None => Compiler::default(),
    };
    let predicate = compiler.compile::<T>(node)?;
    debug!(criteria = %node, lambda = %predicate.lambda(), "Compiled criteria");
    Ok(predicate)
}
