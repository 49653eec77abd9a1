mod arith;
pub mod ast;
pub mod error;
pub mod format;
pub mod parser;
pub mod resolver;
pub mod scanner;
mod stack;
pub mod token;
pub mod treewalk;
pub mod vm;
