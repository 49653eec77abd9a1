use crate::ast::*;
use crate::scanner::char_value;
use crate::stack::ensure_sufficient_stack;
use crate::token::*;

use std::rc::Rc;
use thiserror::Error;

type ExprResult = Result<Expr, ParseErr>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErr {
    #[error("unexpected {0}")]
    UnexpectedToken(Token),
    #[error("expected {expected} but found {found}")]
    ExpectedToken { expected: TokenType, found: Token },
    #[error("expected a name but found {0}")]
    ExpectedName(Token),
    #[error("expected a type name but found {0}")]
    ExpectedType(Token),
}

impl ParseErr {
    /// The token the parser stopped at.
    pub fn token(&self) -> &Token {
        match self {
            Self::UnexpectedToken(tok)
            | Self::ExpectedName(tok)
            | Self::ExpectedType(tok)
            | Self::ExpectedToken { found: tok, .. } => tok,
        }
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
    // Stands in for a missing trailing Eof so lookahead never runs dry.
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        let (line, offset) = tokens
            .last()
            .map_or((1, 0), |t| (t.line, t.offset + t.lexeme.chars().count()));
        Parser {
            index: 0,
            tokens,
            eof: Token::new(TokenType::Eof, "", line, offset),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.index).unwrap_or(&self.eof)
    }

    fn peek_next(&self) -> &Token {
        self.tokens.get(self.index + 1).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.data != TokenType::Eof {
            self.index += 1;
        }
        tok
    }

    fn check(&self, tok: TokenType) -> bool {
        self.peek().data == tok
    }

    fn match_next_lits<const N: usize>(&mut self, ttypes: [TokenType; N]) -> bool {
        let res = ttypes.contains(&self.peek().data);
        if res {
            self.index += 1;
        }
        res
    }

    fn match_op<const N: usize>(&mut self, ops: [(TokenType, BinOp); N]) -> Option<BinOp> {
        let data = self.peek().data;
        let (_, op) = ops.into_iter().find(|(t, _)| *t == data)?;
        self.index += 1;
        Some(op)
    }

    fn consume(&mut self, tok: TokenType) -> Result<Token, ParseErr> {
        if !self.check(tok) {
            return Err(ParseErr::ExpectedToken {
                expected: tok,
                found: self.peek().clone(),
            });
        }
        Ok(self.advance())
    }

    fn consume_identifier(&mut self) -> Result<Rc<str>, ParseErr> {
        if self.check(TokenType::Identifier) {
            Ok(self.advance().lexeme)
        } else {
            Err(ParseErr::ExpectedName(self.peek().clone()))
        }
    }

    fn type_name(&mut self) -> Result<Typename, ParseErr> {
        if self.check(TokenType::Identifier) {
            Ok(Typename(self.advance().lexeme))
        } else {
            Err(ParseErr::ExpectedType(self.peek().clone()))
        }
    }

    // Parsing the actual grammar.
    pub fn parse(&mut self) -> Result<Vec<Stmt>, ParseErr> {
        let mut res = vec![];
        while !self.check(TokenType::Eof) {
            res.push(self.statement()?);
        }
        tracing::debug!(statements = res.len(), "parsed program");
        Ok(res)
    }

    fn statement(&mut self) -> Result<Stmt, ParseErr> {
        ensure_sufficient_stack(|| {
            if self.match_next_lits([TokenType::Print]) {
                let value = self.expression()?;
                self.consume(TokenType::Semicolon)?;
                Ok(Stmt::Print(value))
            } else if self.match_next_lits([TokenType::If]) {
                self.if_statement()
            } else if self.match_next_lits([TokenType::While]) {
                let test = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::While(test, body))
            } else if self.match_next_lits([TokenType::Break]) {
                self.consume(TokenType::Semicolon)?;
                Ok(Stmt::Break)
            } else if self.match_next_lits([TokenType::Continue]) {
                self.consume(TokenType::Semicolon)?;
                Ok(Stmt::Continue)
            } else if self.match_next_lits([TokenType::Return]) {
                let value = self.expression()?;
                self.consume(TokenType::Semicolon)?;
                Ok(Stmt::Return(value))
            } else if self.match_next_lits([TokenType::Var]) {
                self.var_declaration()
            } else if self.match_next_lits([TokenType::Const]) {
                self.const_declaration()
            } else if self.match_next_lits([TokenType::Func]) {
                self.function()
            } else {
                self.assignment_or_expression()
            }
        })
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseErr> {
        let id = self.consume_identifier()?;
        let ty = if self.check(TokenType::Identifier) {
            Some(self.type_name()?)
        } else {
            None
        };
        let value = if self.match_next_lits([TokenType::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Var(id, ty, value))
    }

    fn const_declaration(&mut self) -> Result<Stmt, ParseErr> {
        let id = self.consume_identifier()?;
        let ty = if self.check(TokenType::Identifier) {
            Some(self.type_name()?)
        } else {
            None
        };
        self.consume(TokenType::Equal)?;
        let value = self.expression()?;
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Const(id, ty, value))
    }

    fn function(&mut self) -> Result<Stmt, ParseErr> {
        let name = self.consume_identifier()?;
        self.consume(TokenType::LeftParen)?;
        let mut params = vec![];
        if !self.check(TokenType::RightParen) {
            params.push(self.param()?);
            while self.match_next_lits([TokenType::Comma]) {
                params.push(self.param()?);
            }
        }
        self.consume(TokenType::RightParen)?;
        let ret = self.type_name()?;
        let body = self.block()?;

        Ok(Stmt::Func(Rc::new(FuncDecl {
            name,
            params,
            ret,
            body,
        })))
    }

    fn param(&mut self) -> Result<Param, ParseErr> {
        let name = self.consume_identifier()?;
        let ty = self.type_name()?;
        Ok(Param { name, ty })
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseErr> {
        let test = self.expression()?;
        let consequence = self.block()?;
        let alternative = if !self.match_next_lits([TokenType::Else]) {
            None
        } else if self.match_next_lits([TokenType::If]) {
            // `else if` is shorthand for an else block holding one if.
            Some(vec![self.if_statement()?])
        } else {
            Some(self.block()?)
        };
        Ok(Stmt::If(test, consequence, alternative))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseErr> {
        self.consume(TokenType::LeftBrace)?;
        let mut res = vec![];
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            res.push(self.statement()?);
        }
        self.consume(TokenType::RightBrace)?;
        Ok(res)
    }

    fn assignment_or_expression(&mut self) -> Result<Stmt, ParseErr> {
        if self.check(TokenType::Identifier) && self.peek_next().data == TokenType::Equal {
            let id = self.advance().lexeme;
            self.advance();
            let value = self.expression()?;
            self.consume(TokenType::Semicolon)?;
            return Ok(Stmt::Assign(id, value));
        }

        let expr = self.expression()?;
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Expr(expr))
    }

    pub fn expression(&mut self) -> ExprResult {
        let mut expr = self.relational()?;

        while let Some(op) = self.match_op([(TokenType::AndAnd, BinOp::And), (TokenType::OrOr, BinOp::Or)]) {
            let right = self.relational()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }

        Ok(expr)
    }

    // Comparisons do not chain: `a < b < c` is a syntax error.
    fn relational(&mut self) -> ExprResult {
        let expr = self.additive()?;
        let op = self.match_op([
            (TokenType::EqualEqual, BinOp::Eq),
            (TokenType::BangEqual, BinOp::Ne),
            (TokenType::Less, BinOp::Lt),
            (TokenType::Greater, BinOp::Gt),
            (TokenType::LessEqual, BinOp::Le),
            (TokenType::GreaterEqual, BinOp::Ge),
        ]);
        match op {
            Some(op) => {
                let right = self.additive()?;
                Ok(Expr::Binary(op, Box::new(expr), Box::new(right)))
            }
            None => Ok(expr),
        }
    }

    fn additive(&mut self) -> ExprResult {
        let mut expr = self.term()?;

        while let Some(op) = self.match_op([(TokenType::Plus, BinOp::Add), (TokenType::Minus, BinOp::Sub)]) {
            let right = self.term()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }

        Ok(expr)
    }

    fn term(&mut self) -> ExprResult {
        let mut expr = self.unary()?;

        while let Some(op) = self.match_op([(TokenType::Star, BinOp::Mul), (TokenType::Slash, BinOp::Div)]) {
            let right = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ExprResult {
        ensure_sufficient_stack(|| {
            let op = match self.peek().data {
                TokenType::Minus => UnaryOp::Neg,
                TokenType::Plus => UnaryOp::Pos,
                TokenType::Bang => UnaryOp::Not,
                _ => return self.primary(),
            };
            self.advance();
            Ok(Expr::Unary(op, Box::new(self.unary()?)))
        })
    }

    fn finish_call(&mut self, callee: Rc<str>) -> ExprResult {
        let mut args = vec![];
        if !self.check(TokenType::RightParen) {
            args.push(self.expression()?);
            while self.match_next_lits([TokenType::Comma]) {
                args.push(self.expression()?);
            }
        }

        self.consume(TokenType::RightParen)?;

        Ok(Expr::Call(callee, args))
    }

    fn primary(&mut self) -> ExprResult {
        let tok = self.advance();
        let res = match tok.data {
            TokenType::True => Expr::Bool(true),
            TokenType::False => Expr::Bool(false),
            TokenType::Integer => Expr::Integer(tok.lexeme),
            TokenType::Float => Expr::Float(tok.lexeme),
            TokenType::Char => match char_value(&tok.lexeme) {
                Some(c) => Expr::Char(c),
                None => return Err(ParseErr::UnexpectedToken(tok)),
            },
            TokenType::LeftParen => {
                let expr = self.expression()?;
                self.consume(TokenType::RightParen)?;
                Expr::Grouping(Box::new(expr))
            }
            TokenType::Identifier => {
                if self.match_next_lits([TokenType::LeftParen]) {
                    self.finish_call(tok.lexeme)?
                } else {
                    Expr::Name(tok.lexeme)
                }
            }
            _ => return Err(ParseErr::UnexpectedToken(tok)),
        };

        Ok(res)
    }
}

/// Scans and parses in one step, for callers that do not need the tokens.
pub fn parse_source(code: &str) -> Result<Vec<Stmt>, ParseErr> {
    let tokens = crate::scanner::scan(code);
    Parser::new(&tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(text: &str) -> Box<Expr> {
        Box::new(Expr::Integer(text.into()))
    }

    fn name(text: &str) -> Box<Expr> {
        Box::new(Expr::Name(text.into()))
    }

    fn expr(code: &str) -> Expr {
        match parse_source(&format!("{code};")).unwrap().remove(0) {
            Stmt::Expr(e) => e,
            other => panic!("not an expression statement: {other:?}"),
        }
    }

    #[test]
    fn precedence() {
        assert_eq!(
            expr("2 + 3 * 4"),
            Expr::Binary(BinOp::Add, int("2"), Box::new(Expr::Binary(BinOp::Mul, int("3"), int("4"))))
        );
        assert_eq!(
            expr("a < b + 1 && !c"),
            Expr::Binary(
                BinOp::And,
                Box::new(Expr::Binary(
                    BinOp::Lt,
                    name("a"),
                    Box::new(Expr::Binary(BinOp::Add, name("b"), int("1")))
                )),
                Box::new(Expr::Unary(UnaryOp::Not, name("c")))
            )
        );
    }

    #[test]
    fn left_associative() {
        assert_eq!(
            expr("8 - 4 - 2"),
            Expr::Binary(BinOp::Sub, Box::new(Expr::Binary(BinOp::Sub, int("8"), int("4"))), int("2"))
        );
        assert_eq!(
            expr("a || b && c"),
            Expr::Binary(BinOp::And, Box::new(Expr::Binary(BinOp::Or, name("a"), name("b"))), name("c"))
        );
    }

    #[test]
    fn unary_nests_to_the_right() {
        assert_eq!(
            expr("- -x"),
            Expr::Unary(UnaryOp::Neg, Box::new(Expr::Unary(UnaryOp::Neg, name("x"))))
        );
        assert_eq!(
            expr("-(1)"),
            Expr::Unary(UnaryOp::Neg, Box::new(Expr::Grouping(int("1"))))
        );
    }

    #[test]
    fn calls() {
        assert_eq!(
            expr("add(1, f())"),
            Expr::Call("add".into(), vec![*int("1"), Expr::Call("f".into(), vec![])])
        );
    }

    #[test]
    fn assignment_versus_expression() {
        let prog = parse_source("x = 1; x == 1;").unwrap();
        assert_eq!(prog[0], Stmt::Assign("x".into(), *int("1")));
        assert!(matches!(prog[1], Stmt::Expr(Expr::Binary(BinOp::Eq, _, _))));
    }

    #[test]
    fn declarations() {
        let prog = parse_source("var x int; var y = 2; const pi float = 3.14;").unwrap();
        assert_eq!(prog, vec![
            Stmt::Var("x".into(), Some("int".into()), None),
            Stmt::Var("y".into(), None, Some(*int("2"))),
            Stmt::Const("pi".into(), Some("float".into()), Expr::Float("3.14".into())),
        ]);
    }

    #[test]
    fn function_declaration() {
        let prog = parse_source("func add(x int, y int) int { return x + y; }").unwrap();
        let expected = FuncDecl {
            name: "add".into(),
            params: vec![
                Param { name: "x".into(), ty: "int".into() },
                Param { name: "y".into(), ty: "int".into() },
            ],
            ret: "int".into(),
            body: vec![Stmt::Return(Expr::Binary(BinOp::Add, name("x"), name("y")))],
        };
        assert_eq!(prog, vec![Stmt::Func(Rc::new(expected))]);
    }

    #[test]
    fn else_if_nests() {
        let prog = parse_source("if a { print 1; } else if b { print 2; } else { print 3; }").unwrap();
        let Stmt::If(_, _, Some(alt)) = &prog[0] else {
            panic!("expected an if with an else");
        };
        assert!(matches!(alt.as_slice(), [Stmt::If(_, _, Some(_))]));
    }

    #[test]
    fn comparisons_do_not_chain() {
        let err = parse_source("print 1 < 2 < 3;").unwrap_err();
        let ParseErr::ExpectedToken { expected, found } = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(expected, TokenType::Semicolon);
        assert_eq!(found.data, TokenType::Less);
        assert_eq!(found.offset, 12);
    }

    #[test]
    fn missing_terminators() {
        assert!(matches!(
            parse_source("print 1"),
            Err(ParseErr::ExpectedToken { expected: TokenType::Semicolon, .. })
        ));
        assert!(matches!(
            parse_source("while x { print 1;"),
            Err(ParseErr::ExpectedToken { expected: TokenType::RightBrace, .. })
        ));
        assert!(matches!(
            parse_source("print (1 + 2;"),
            Err(ParseErr::ExpectedToken { expected: TokenType::RightParen, .. })
        ));
        assert!(matches!(
            parse_source("const c;"),
            Err(ParseErr::ExpectedToken { expected: TokenType::Equal, .. })
        ));
    }

    #[test]
    fn error_reports_token() {
        let err = parse_source("var x = 1;\nprint ;").unwrap_err();
        assert_eq!(err.token().line, 2);
        assert_eq!(&*err.token().lexeme, ";");
        assert_eq!(err.to_string(), "unexpected ';' [line 2, offset 17]");

        let err = parse_source("func f(x) int { }").unwrap_err();
        assert!(matches!(err, ParseErr::ExpectedType(_)));
    }
}
