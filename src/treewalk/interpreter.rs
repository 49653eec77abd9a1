use std::io::{stdout, Stdout, Write};

use thiserror::Error;

use crate::ast::{Expr, Stmt};
use crate::error::ErrorKind;
use crate::parser::{ParseErr, Parser};
use crate::resolver::{Resolver, ResolverErr};
use crate::scanner::{self, LexErr};

use super::context::Context;
use super::expr::EvalErr;
use super::scope::Scope;
use super::statement::Signal;
use super::value::Val;

#[derive(Debug, Error)]
pub enum InterpretErr {
    #[error(transparent)]
    Lex(#[from] LexErr),
    #[error(transparent)]
    Parse(#[from] ParseErr),
    #[error("{}", join_lines(.0))]
    ResolverErrs(Vec<ResolverErr>),
    #[error(transparent)]
    Eval(#[from] EvalErr),
}

fn join_lines(errs: &[ResolverErr]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl InterpretErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lex(_) => ErrorKind::LexError,
            Self::Parse(_) => ErrorKind::ParseError,
            Self::ResolverErrs(errs) => errs
                .first()
                .map_or(ErrorKind::ParseError, ResolverErr::kind),
            Self::Eval(err) => err.kind(),
        }
    }
}

/// Owns the global scope, so state persists across `run` calls (as in
/// the interactive prompt). Output of `print` goes to `W`.
pub struct Interpreter<W: Write = Stdout> {
    global_scope: Scope<'static>,
    out: W,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_writer(stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_writer(out: W) -> Self {
        Interpreter {
            global_scope: Scope::default(),
            out,
        }
    }

    /// Scans, parses, checks and executes `code`.
    pub fn run(&mut self, code: &str) -> Result<(), InterpretErr> {
        let tokens = scanner::scan(code);
        scanner::check(&tokens)?;
        let program = Parser::new(&tokens).parse()?;
        Resolver::new()
            .resolve(&program)
            .map_err(InterpretErr::ResolverErrs)?;
        self.interpret(&program)?;
        Ok(())
    }

    /// Executes an already built program against the global scope.
    pub fn interpret(&mut self, program: &[Stmt]) -> Result<(), EvalErr> {
        let mut ctx = Context::new(&mut self.out);
        let result = program.iter().try_for_each(|stmt| {
            match stmt.exec(&self.global_scope, &mut ctx)? {
                Signal::Normal => Ok(()),
                Signal::Break => Err(EvalErr::BreakOutsideLoop),
                Signal::Continue => Err(EvalErr::ContinueOutsideLoop),
                Signal::Return(_) => Err(EvalErr::ReturnOutsideFunction),
            }
        });
        // Flush even on failure so output printed before the error shows up.
        ctx.out().flush()?;
        result
    }

    /// Evaluates a single expression in the global scope.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Val, EvalErr> {
        let mut ctx = Context::new(&mut self.out);
        expr.eval(&self.global_scope, &mut ctx)
    }

    pub fn get_global(&self, id: &str) -> Option<Val> {
        self.global_scope.try_get_here(id)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}
