use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub data: TokenType,
    pub lexeme: Rc<str>,
    pub line: usize,
    pub offset: usize,
}

impl Token {
    pub fn new(data: TokenType, lexeme: impl Into<Rc<str>>, line: usize, offset: usize) -> Self {
        Token {
            data,
            lexeme: lexeme.into(),
            line,
            offset,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data {
            TokenType::Eof => return write!(f, "end of input [line {}]", self.line),
            data if data.symbol().is_some() => write!(f, "{data}")?,
            data => write!(f, "{data} '{}'", self.lexeme)?,
        }
        write!(f, " [line {}, offset {}]", self.line, self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Star,
    Slash,
    Semicolon,

    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    AndAnd,
    OrOr,

    Identifier,
    Integer,
    Float,
    Char,

    Break,
    Const,
    Continue,
    Else,
    False,
    Func,
    If,
    Print,
    Return,
    True,
    Var,
    While,

    Eof,
    Illegal,
    UnterminatedComment,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "identifier",
            Self::Integer => "integer literal",
            Self::Float => "float literal",
            Self::Char => "character literal",
            Self::Eof => "end of input",
            Self::Illegal => "illegal character",
            Self::UnterminatedComment => "unterminated comment",
            other => return match other.symbol() {
                Some(sym) => write!(f, "'{sym}'"),
                None => write!(f, "{other:?}"),
            },
        };
        f.write_str(name)
    }
}

impl TokenType {
    /// Fixed source text of keywords and punctuation.
    pub fn symbol(self) -> Option<&'static str> {
        let sym = match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Semicolon => ";",
            Self::Bang => "!",
            Self::BangEqual => "!=",
            Self::Equal => "=",
            Self::EqualEqual => "==",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Break => "break",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Else => "else",
            Self::False => "false",
            Self::Func => "func",
            Self::If => "if",
            Self::Print => "print",
            Self::Return => "return",
            Self::True => "true",
            Self::Var => "var",
            Self::While => "while",
            Self::Identifier
            | Self::Integer
            | Self::Float
            | Self::Char
            | Self::Eof
            | Self::Illegal
            | Self::UnterminatedComment => return None,
        };
        Some(sym)
    }
}

/// Reserved words. Anything else that scans as a name is an identifier.
pub fn keyword(name: &str) -> Option<TokenType> {
    let kw = match name {
        "break" => TokenType::Break,
        "const" => TokenType::Const,
        "continue" => TokenType::Continue,
        "else" => TokenType::Else,
        "false" => TokenType::False,
        "func" => TokenType::Func,
        "if" => TokenType::If,
        "print" => TokenType::Print,
        "return" => TokenType::Return,
        "true" => TokenType::True,
        "var" => TokenType::Var,
        "while" => TokenType::While,
        _ => return None,
    };
    Some(kw)
}
