//! A small stack machine and a compiler for the numeric subset of the
//! language. Not used by the tree-walking interpreter.

pub mod chunk;
pub mod compiler;
pub mod machine;
