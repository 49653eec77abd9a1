use rustc_hash::FxHashMap;
use std::rc::Rc;
use thiserror::Error;

use crate::ast::{Expr, Stmt};
use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolverErr {
    #[error("`break` outside of a loop")]
    BreakOutsideLoop,
    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,
    #[error("`{name}` takes {expected} arguments but {found} were supplied")]
    WrongArgumentCount {
        name: Rc<str>,
        expected: usize,
        found: usize,
    },
    #[error("cannot assign to constant `{0}`")]
    ConstAssignment(Rc<str>),
    #[error("cannot assign to function `{0}`")]
    FunctionAssignment(Rc<str>),
}

impl ResolverErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BreakOutsideLoop | Self::ContinueOutsideLoop | Self::ReturnOutsideFunction => {
                ErrorKind::ControlFlowError
            }
            Self::WrongArgumentCount { .. } => ErrorKind::ParseError,
            Self::ConstAssignment(_) | Self::FunctionAssignment(_) => ErrorKind::NameError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Decl {
    Var,
    Const,
    Func(usize),
}

#[derive(Default)]
struct ResolverScope {
    vars: FxHashMap<Rc<str>, Decl>,
}

/// Static checks run before evaluation. Scopes mirror the evaluator's:
/// one per block, and function bodies see their own scopes plus the
/// globals only. Names that cannot be resolved here are left for runtime.
pub struct Resolver {
    stack: Vec<ResolverScope>,
    // Index of the innermost function's parameter scope.
    function_base: Option<usize>,
    loops: usize,
    errors: Vec<ResolverErr>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        // Just the global scope is present.
        Self {
            stack: vec![ResolverScope::default()],
            function_base: None,
            loops: 0,
            errors: vec![],
        }
    }

    /// Reports every problem found, not only the first.
    pub fn resolve(mut self, program: &[Stmt]) -> Result<(), Vec<ResolverErr>> {
        for stmt in program {
            self.resolve_stmt(stmt);
        }
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn resolve_block(&mut self, stmts: &[Stmt]) {
        self.stack.push(ResolverScope::default());
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
        self.stack.pop();
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Print(expr) | Stmt::Expr(expr) => self.resolve_expr(expr),
            Stmt::Break if self.loops == 0 => self.errors.push(ResolverErr::BreakOutsideLoop),
            Stmt::Continue if self.loops == 0 => {
                self.errors.push(ResolverErr::ContinueOutsideLoop)
            }
            Stmt::Break | Stmt::Continue => {}
            Stmt::Return(expr) => {
                if self.function_base.is_none() {
                    self.errors.push(ResolverErr::ReturnOutsideFunction);
                }
                self.resolve_expr(expr);
            }
            Stmt::Assign(id, value) => {
                self.resolve_expr(value);
                match self.lookup(id) {
                    Some(Decl::Const) => self.errors.push(ResolverErr::ConstAssignment(id.clone())),
                    Some(Decl::Func(_)) => {
                        self.errors.push(ResolverErr::FunctionAssignment(id.clone()))
                    }
                    Some(Decl::Var) | None => {}
                }
            }
            Stmt::Var(id, _, value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
                self.declare(id.clone(), Decl::Var);
            }
            Stmt::Const(id, _, value) => {
                self.resolve_expr(value);
                self.declare(id.clone(), Decl::Const);
            }
            Stmt::If(test, consequence, alternative) => {
                self.resolve_expr(test);
                self.resolve_block(consequence);
                if let Some(alternative) = alternative {
                    self.resolve_block(alternative);
                }
            }
            Stmt::While(test, body) => {
                self.resolve_expr(test);
                self.loops += 1;
                self.resolve_block(body);
                self.loops -= 1;
            }
            Stmt::Func(decl) => {
                // Declared before the body so it can call itself.
                self.declare(decl.name.clone(), Decl::Func(decl.params.len()));

                let outer = (self.function_base, self.loops);
                self.function_base = Some(self.stack.len());
                self.loops = 0;
                self.stack.push(ResolverScope::default());
                for param in decl.params.iter() {
                    self.declare(param.name.clone(), Decl::Var);
                }
                for inner in decl.body.iter() {
                    self.resolve_stmt(inner);
                }
                self.stack.pop();
                (self.function_base, self.loops) = outer;
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Integer(_) | Expr::Float(_) | Expr::Bool(_) | Expr::Char(_) | Expr::Name(_) => {}
            Expr::Unary(_, operand) | Expr::Grouping(operand) => self.resolve_expr(operand),
            Expr::Binary(_, l, r) => {
                self.resolve_expr(l);
                self.resolve_expr(r);
            }
            Expr::Call(id, args) => {
                if let Some(Decl::Func(expected)) = self.lookup(id) {
                    if expected != args.len() {
                        self.errors.push(ResolverErr::WrongArgumentCount {
                            name: id.clone(),
                            expected,
                            found: args.len(),
                        });
                    }
                }
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    fn lookup(&self, id: &str) -> Option<Decl> {
        let base = self.function_base.unwrap_or(0);
        self.stack[base..]
            .iter()
            .rev()
            .chain(self.stack.first().filter(|_| base > 0))
            .find_map(|scope| scope.vars.get(id).copied())
    }

    fn declare(&mut self, id: Rc<str>, decl: Decl) {
        if let Some(scope) = self.stack.last_mut() {
            scope.vars.insert(id, decl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use pretty_assertions::assert_eq;

    fn resolve(code: &str) -> Result<(), Vec<ResolverErr>> {
        Resolver::new().resolve(&parse_source(code).unwrap())
    }

    #[test]
    fn accepts_well_formed_programs() {
        assert_eq!(
            resolve(
                "func f(n int) int { while n > 0 { if n == 3 { break; } n = n - 1; continue; } return n; }
                 print f(5);"
            ),
            Ok(())
        );
    }

    #[test]
    fn control_flow_outside_its_construct() {
        assert_eq!(
            resolve("break; continue; return 1;"),
            Err(vec![
                ResolverErr::BreakOutsideLoop,
                ResolverErr::ContinueOutsideLoop,
                ResolverErr::ReturnOutsideFunction,
            ])
        );
        // A function body does not inherit the loop it is declared in.
        assert_eq!(
            resolve("while true { func g() void { break; } break; }"),
            Err(vec![ResolverErr::BreakOutsideLoop])
        );
    }

    #[test]
    fn arity_and_constants() {
        let errs = resolve(
            "func add(x int, y int) int { return x + y; }
             const k = 1;
             print add(1);
             k = 2;
             add = 3;",
        )
        .unwrap_err();
        assert_eq!(errs, vec![
            ResolverErr::WrongArgumentCount { name: "add".into(), expected: 2, found: 1 },
            ResolverErr::ConstAssignment("k".into()),
            ResolverErr::FunctionAssignment("add".into()),
        ]);
        assert_eq!(errs[0].kind(), ErrorKind::ParseError);
    }

    #[test]
    fn shadowing_hides_declarations() {
        // Inside the body, `k` is a parameter, not the global constant.
        assert_eq!(resolve("const k = 1; func f(k int) int { k = 2; return k; }"), Ok(()));
        // A function body cannot see the locals of the function it is nested in.
        assert_eq!(
            resolve("func outer() void { const c = 1; func inner() void { c = 2; } }"),
            Ok(())
        );
    }
}
