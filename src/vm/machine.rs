use std::io::Write;

use thiserror::Error;

use crate::arith::floor_div;
use crate::error::ErrorKind;

use super::chunk::{Chunk, OpCode, Value};

#[derive(Debug, Error)]
pub enum VmErr {
    #[error("invalid opcode {byte:#04x} at {at}")]
    InvalidOpcode { byte: u8, at: usize },
    #[error("missing operand at {0}")]
    MissingOperand(usize),
    #[error("no constant at index {0}")]
    BadConstant(u8),
    #[error("stack underflow at {0}")]
    StackUnderflow(usize),
    #[error("{0:?} applied to mismatched operands")]
    TypeMismatch(OpCode),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {0:?}")]
    Overflow(OpCode),
    #[error("cannot write output: {0}")]
    Io(#[from] std::io::Error),
}

impl VmErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // Malformed bytecode; the compiler never emits it.
            Self::InvalidOpcode { .. }
            | Self::MissingOperand(_)
            | Self::BadConstant(_)
            | Self::StackUnderflow(_) => ErrorKind::ParseError,
            Self::TypeMismatch(_) => ErrorKind::TypeError,
            Self::DivisionByZero | Self::Overflow(_) => ErrorKind::ArithmeticError,
            Self::Io(_) => ErrorKind::IoError,
        }
    }
}

pub struct Vm<'c> {
    chunk: &'c Chunk,
    ip: usize,
    stack: Vec<Value>,
}

impl<'c> Vm<'c> {
    pub fn new(chunk: &'c Chunk) -> Self {
        Vm {
            chunk,
            ip: 0,
            stack: vec![],
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let ret = self.chunk.read_byte(self.ip);
        self.ip += 1;
        ret
    }

    fn pop(&mut self) -> Result<Value, VmErr> {
        self.stack.pop().ok_or(VmErr::StackUnderflow(self.ip - 1))
    }

    /// Executes until `Return` or the end of the chunk.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<(), VmErr> {
        while let Some(byte) = self.read_byte() {
            let at = self.ip - 1;
            let instr = OpCode::decode(byte).ok_or(VmErr::InvalidOpcode { byte, at })?;

            match instr {
                OpCode::Const => {
                    let idx = self.read_byte().ok_or(VmErr::MissingOperand(at))?;
                    let konst = self
                        .chunk
                        .get_const(idx.into())
                        .ok_or(VmErr::BadConstant(idx))?;
                    self.stack.push(konst);
                }
                OpCode::Neg => {
                    let val = match self.pop()? {
                        Value::Int(x) => Value::Int(x.checked_neg().ok_or(VmErr::Overflow(instr))?),
                        Value::Float(x) => Value::Float(-x),
                    };
                    self.stack.push(val);
                }
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::IDiv | OpCode::FDiv => {
                    let right = self.pop()?;
                    let left = self.pop()?;
                    self.stack.push(arith(instr, left, right)?);
                }
                OpCode::Print => {
                    let val = self.pop()?;
                    writeln!(out, "{val}")?;
                }
                OpCode::Return => break,
            }
        }
        out.flush()?;
        Ok(())
    }
}

fn arith(op: OpCode, left: Value, right: Value) -> Result<Value, VmErr> {
    let res = match (op, left, right) {
        (OpCode::IDiv, Value::Int(_), Value::Int(0)) | (OpCode::FDiv, Value::Float(_), Value::Float(0.0)) => {
            return Err(VmErr::DivisionByZero)
        }
        (OpCode::Add, Value::Int(a), Value::Int(b)) => a.checked_add(b).map(Value::Int),
        (OpCode::Sub, Value::Int(a), Value::Int(b)) => a.checked_sub(b).map(Value::Int),
        (OpCode::Mul, Value::Int(a), Value::Int(b)) => a.checked_mul(b).map(Value::Int),
        (OpCode::IDiv, Value::Int(a), Value::Int(b)) => floor_div(a, b).map(Value::Int),
        (OpCode::Add, Value::Float(a), Value::Float(b)) => Some(Value::Float(a + b)),
        (OpCode::Sub, Value::Float(a), Value::Float(b)) => Some(Value::Float(a - b)),
        (OpCode::Mul, Value::Float(a), Value::Float(b)) => Some(Value::Float(a * b)),
        (OpCode::FDiv, Value::Float(a), Value::Float(b)) => Some(Value::Float(a / b)),
        _ => return Err(VmErr::TypeMismatch(op)),
    };
    res.ok_or(VmErr::Overflow(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::vm::compiler::compile;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Result<String, VmErr> {
        let chunk = compile(&parse_source(src).unwrap()).unwrap();
        let mut out = Vec::new();
        Vm::new(&chunk).run(&mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(run("print 2 + 3 * 4; print -(7 / 2); print 2.0 - 3.0 / 4.0;").unwrap(), "14\n-3\n1.25\n");
        assert_eq!(run("print -7 / 2; print 7 / -2;").unwrap(), "-4\n-4\n");
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(run("print 1 / 0;"), Err(VmErr::DivisionByZero)));
        assert!(matches!(run("print 1.0 / 0.0;"), Err(VmErr::DivisionByZero)));
    }

    #[test]
    fn malformed_code() {
        let mut chunk = Chunk::default();
        chunk.write_op(OpCode::Add);
        assert!(matches!(Vm::new(&chunk).run(&mut Vec::new()), Err(VmErr::StackUnderflow(0))));

        let mut chunk = Chunk::default();
        chunk.write_byte(0xff);
        assert!(matches!(
            Vm::new(&chunk).run(&mut Vec::new()),
            Err(VmErr::InvalidOpcode { byte: 0xff, at: 0 })
        ));
    }
}
