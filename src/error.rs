use std::fmt;

/// Coarse classification of every failure the toolchain can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LexError,
    ParseError,
    NameError,
    TypeError,
    ControlFlowError,
    ArithmeticError,
    /// A host limit was hit (call depth). Not part of the language proper.
    ResourceError,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
