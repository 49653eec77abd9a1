use std::fmt::{self, Display, Write};

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::format::write_float;

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// Followed by a one-byte index into the constant pool.
    Const = 0x0,
    Add,
    Sub,
    Mul,
    IDiv,
    FDiv,
    Neg,
    Print,
    Return,
}

impl OpCode {
    pub fn decode(byte: u8) -> Option<OpCode> {
        OpCode::from_u8(byte)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => write!(f, "{x}"),
            Self::Float(x) => write_float(f, *x),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Chunk {
    consts: Vec<Value>,
    code: Vec<u8>,
}

impl Chunk {
    pub fn write_op(&mut self, op: OpCode) {
        self.code.push(op as u8);
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.code.push(byte);
    }

    pub fn add_const(&mut self, val: Value) -> usize {
        self.consts.push(val);
        self.consts.len() - 1
    }

    pub fn read_byte(&self, idx: usize) -> Option<u8> {
        self.code.get(idx).copied()
    }

    pub fn get_const(&self, idx: usize) -> Option<Value> {
        self.consts.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// One instruction per line: byte offset, mnemonic, operand.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut ip = 0;
        while let Some(byte) = self.read_byte(ip) {
            // Writing to a String cannot fail.
            let _ = write!(out, "{ip:04} ");
            match OpCode::decode(byte) {
                Some(OpCode::Const) => {
                    let operand = self.read_byte(ip + 1);
                    let _ = match operand.and_then(|idx| self.get_const(idx.into())) {
                        Some(val) => writeln!(out, "Const {} ({val})", operand.unwrap_or_default()),
                        None => writeln!(out, "Const <bad operand>"),
                    };
                    ip += 2;
                    continue;
                }
                Some(op) => {
                    let _ = writeln!(out, "{op:?}");
                }
                None => {
                    let _ = writeln!(out, "<invalid opcode {byte:#04x}>");
                }
            }
            ip += 1;
        }
        out
    }
}
