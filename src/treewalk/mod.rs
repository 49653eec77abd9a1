//! Tree-walking evaluator.

pub mod context;
pub mod expr;
pub mod interpreter;
pub mod scope;
pub mod statement;
pub mod value;
