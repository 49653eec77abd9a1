use crate::token::*;
use thiserror::Error;

struct Scanner<'a> {
    str: &'a [char],
    index: usize,
}

impl<'a> Scanner<'a> {
    fn advance(&mut self) -> Option<char> {
        self.index += 1;
        self.str.get(self.index - 1).copied()
    }

    // "match" is a keyword in the metalanguage already.
    fn match_next(&mut self, c: char) -> bool {
        let res = self.str.get(self.index).is_some_and(|d| c == *d);
        if res {
            self.index += 1;
        }
        res
    }

    fn peek(&self) -> Option<char> {
        self.str.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.str.get(self.index + 1).copied()
    }

    fn new(str: &'a [char]) -> Self {
        Self { index: 0, str }
    }

    fn index(&self) -> usize {
        self.index
    }

    fn text(&self, start: usize) -> String {
        self.str[start..self.index.min(self.str.len())].iter().collect()
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Body of a character literal, after the opening quote.
    fn char_literal(&mut self) -> Option<char> {
        let c = match self.advance()? {
            '\\' => match self.advance()? {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                '\\' => '\\',
                '\'' => '\'',
                _ => return None,
            },
            '\'' | '\n' => return None,
            c => c,
        };
        self.match_next('\'').then_some(c)
    }
}

/// Decodes the lexeme of a `Char` token produced by [`scan`].
pub fn char_value(lexeme: &str) -> Option<char> {
    let chars = lexeme.chars().collect::<Vec<_>>();
    let mut scanner = Scanner::new(&chars);
    if !scanner.match_next('\'') {
        return None;
    }
    scanner
        .char_literal()
        .filter(|_| scanner.peek().is_none())
}

/// Splits source text into tokens. Never fails: characters that do not
/// start a token become `Illegal` tokens and an unclosed `/*` becomes an
/// `UnterminatedComment` token. The result always ends with `Eof`.
pub fn scan(code: &str) -> Vec<Token> {
    let chars = code.chars().collect::<Vec<_>>();
    let mut scanner = Scanner::new(&chars);
    let mut result = vec![];
    let mut line: usize = 1;

    while let Some(c) = scanner.advance() {
        let start = scanner.index() - 1;
        let tok = match c {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            ',' => TokenType::Comma,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '*' => TokenType::Star,
            ';' => TokenType::Semicolon,
            '/' => {
                if scanner.match_next('/') {
                    while !matches!(scanner.peek(), Some('\n') | None) {
                        scanner.advance();
                    }
                    continue;
                }
                if scanner.match_next('*') {
                    let first_line = line;
                    loop {
                        match scanner.advance() {
                            Some('*') if scanner.match_next('/') => break,
                            Some('\n') => line += 1,
                            Some(_) => {}
                            None => {
                                result.push(Token::new(
                                    TokenType::UnterminatedComment,
                                    scanner.text(start),
                                    first_line,
                                    start,
                                ));
                                break;
                            }
                        }
                    }
                    continue;
                }
                TokenType::Slash
            }
            '>' => {
                if scanner.match_next('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                }
            }
            '=' => {
                if scanner.match_next('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                }
            }
            '<' => {
                if scanner.match_next('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                }
            }
            '!' => {
                if scanner.match_next('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                }
            }
            '&' => {
                if scanner.match_next('&') {
                    TokenType::AndAnd
                } else {
                    TokenType::Illegal
                }
            }
            '|' => {
                if scanner.match_next('|') {
                    TokenType::OrOr
                } else {
                    TokenType::Illegal
                }
            }
            '\n' => {
                line += 1;
                continue;
            }
            c if c.is_whitespace() => continue,
            '\'' => match scanner.char_literal() {
                Some(_) => TokenType::Char,
                None => {
                    // Only the quote is illegal; rescan whatever followed it.
                    scanner.index = start + 1;
                    TokenType::Illegal
                }
            },
            '0'..='9' => {
                scanner.skip_digits();
                if scanner.peek() == Some('.')
                    && scanner.peek_next().is_some_and(|c| c.is_ascii_digit())
                {
                    scanner.advance();
                    scanner.skip_digits();
                    TokenType::Float
                } else {
                    TokenType::Integer
                }
            }
            '.' => {
                if scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
                    scanner.skip_digits();
                    TokenType::Float
                } else {
                    TokenType::Dot
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                while scanner.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
                    scanner.advance();
                }
                keyword(&scanner.text(start)).unwrap_or(TokenType::Identifier)
            }
            _ => TokenType::Illegal,
        };

        result.push(Token::new(tok, scanner.text(start), line, start));
    }

    result.push(Token::new(TokenType::Eof, "", line, chars.len()));
    tracing::debug!(tokens = result.len(), lines = line, "scanned source");
    result
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErr {
    #[error("unrecognized input: {0}")]
    IllegalCharacter(Token),
    #[error("unterminated block comment starting at line {}, offset {}", .0.line, .0.offset)]
    UnterminatedComment(Token),
}

/// Reports the first token the scanner could not make sense of.
pub fn check(tokens: &[Token]) -> Result<(), LexErr> {
    for tok in tokens {
        match tok.data {
            TokenType::Illegal => return Err(LexErr::IllegalCharacter(tok.clone())),
            TokenType::UnterminatedComment => {
                return Err(LexErr::UnterminatedComment(tok.clone()))
            }
            _ => {}
        }
    }
    Ok(())
}
