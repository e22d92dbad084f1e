pub mod ast;
pub mod error;
pub mod wire;

pub use ast::{node::Node, operator::Operator};
pub use error::SyntaxError;
