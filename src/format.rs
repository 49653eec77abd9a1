//! Renders a syntax tree back into canonical source text.

use crate::ast::*;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

/// Floats always show a fractional part so they never read as integers.
pub(crate) fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(text) | Self::Float(text) | Self::Name(text) => f.write_str(text),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Char(c) => match c {
                '\n' => f.write_str(r"'\n'"),
                '\t' => f.write_str(r"'\t'"),
                '\r' => f.write_str(r"'\r'"),
                '\0' => f.write_str(r"'\0'"),
                '\\' => f.write_str(r"'\\'"),
                '\'' => f.write_str(r"'\''"),
                c => write!(f, "'{c}'"),
            },
            Self::Unary(op, operand) => write!(f, "{op}{operand}"),
            Self::Binary(op, lhs, rhs) => write!(f, "{lhs} {op} {rhs}"),
            Self::Grouping(inner) => write!(f, "({inner})"),
            Self::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn block(&mut self, stmts: &[Stmt]) -> fmt::Result {
        self.out.push_str("{\n");
        self.depth += 1;
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        self.depth -= 1;
        self.indent();
        self.out.push('}');
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        self.indent();
        match stmt {
            Stmt::Print(value) => write!(self.out, "print {value};")?,
            Stmt::Break => self.out.push_str("break;"),
            Stmt::Continue => self.out.push_str("continue;"),
            Stmt::Return(value) => write!(self.out, "return {value};")?,
            Stmt::Assign(name, value) => write!(self.out, "{name} = {value};")?,
            Stmt::Expr(expr) => write!(self.out, "{expr};")?,
            Stmt::Var(name, ty, value) => {
                write!(self.out, "var {name}")?;
                if let Some(ty) = ty {
                    write!(self.out, " {ty}")?;
                }
                if let Some(value) = value {
                    write!(self.out, " = {value}")?;
                }
                self.out.push(';');
            }
            Stmt::Const(name, ty, value) => {
                write!(self.out, "const {name}")?;
                if let Some(ty) = ty {
                    write!(self.out, " {ty}")?;
                }
                write!(self.out, " = {value};")?;
            }
            Stmt::If(test, consequence, alternative) => {
                write!(self.out, "if {test} ")?;
                self.block(consequence)?;
                if let Some(alternative) = alternative {
                    self.out.push_str(" else ");
                    self.block(alternative)?;
                }
            }
            Stmt::While(test, body) => {
                write!(self.out, "while {test} ")?;
                self.block(body)?;
            }
            Stmt::Func(decl) => {
                write!(self.out, "func {}(", decl.name)?;
                for (i, param) in decl.params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    write!(self.out, "{} {}", param.name, param.ty)?;
                }
                write!(self.out, ") {} ", decl.ret)?;
                self.block(&decl.body)?;
            }
        }
        self.out.push('\n');
        Ok(())
    }
}

/// Pretty-prints a program, four spaces per nesting level.
pub fn format_program(program: &[Stmt]) -> String {
    let mut printer = Printer {
        out: String::new(),
        depth: 0,
    };
    for stmt in program {
        // Writing to a String cannot fail.
        let _ = printer.stmt(stmt);
    }
    printer.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_layout() {
        let src = "func  f(x int,y int) int{if x<y{return x;}else{while true{break;}}return -y;}
var a int;const b=f(1,2)*(3+4);a=b;print '\\n';";
        let expected = "\
func f(x int, y int) int {
    if x < y {
        return x;
    } else {
        while true {
            break;
        }
    }
    return -y;
}
var a int;
const b = f(1, 2) * (3 + 4);
a = b;
print '\\n';
";
        assert_eq!(format_program(&parse_source(src).unwrap()), expected);
    }

    #[test]
    fn formatting_is_stable() {
        let src = "var n int = 3; while n > 0 { if n == 2 { continue; } print n; n = n - 1; } print !false && 1.5 < .5;";
        let first = format_program(&parse_source(src).unwrap());
        let reparsed = parse_source(&first).unwrap();
        assert_eq!(reparsed, parse_source(src).unwrap());
        assert_eq!(format_program(&reparsed), first);
    }
}
