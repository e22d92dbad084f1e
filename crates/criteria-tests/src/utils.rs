use crate::fixtures::{Customer, customers};
use criteria_engine::{
    CompileOptions, Compiler, ContextValue, FilterCompiler, Predicate, SqlFilterCompiler,
};
use criteria_syntax::{Node, wire};

/// Compile with default options and no context.
pub fn compile(node: &Node) -> Predicate<Customer> {
    criteria_engine::compile::<Customer>(node, None).expect("criteria should compile")
}

pub fn compile_with(options: CompileOptions, context: Option<&ContextValue>, node: &Node) -> Predicate<Customer> {
    let compiler = Compiler::new(options);
    let compiler = match context {
        Some(context) => compiler.with_context(context),
        None => compiler,
    };
    compiler.compile::<Customer>(node).expect("criteria should compile")
}

pub fn compile_json(json: &str) -> Predicate<Customer> {
    let node = wire::from_str(json).expect("criteria document should parse");
    compile(&node)
}

/// Ids of the sample customers accepted by `predicate`, in input order.
pub fn matching_ids(predicate: &Predicate<Customer>) -> Vec<i64> {
    let all = customers();
    predicate
        .filter(&all)
        .expect("predicate should evaluate in memory")
        .into_iter()
        .map(|c| c.id)
        .collect()
}

pub fn where_clause(predicate: &Predicate<Customer>) -> String {
    SqlFilterCompiler::compile(predicate.lambda())
        .expect("predicate should lower to SQL")
        .to_sql()
}
