use std::rc::Rc;

use proptest::prelude::*;
use proptest::sample::select;
use wabbit::ast::{BinOp, Expr, FuncDecl, Param, Stmt, Typename, UnaryOp};
use wabbit::format::format_program;
use wabbit::parser::parse_source;
use wabbit::token::keyword;

fn name() -> impl Strategy<Value = Rc<str>> {
    "[a-z_]{1,6}"
        .prop_filter("keywords are not names", |s| keyword(s).is_none())
        .prop_map(Rc::from)
}

fn typename() -> impl Strategy<Value = Typename> {
    select(vec!["int", "float", "bool", "char"]).prop_map(Typename::from)
}

fn binop() -> impl Strategy<Value = BinOp> {
    use BinOp::*;
    select(vec![Add, Sub, Mul, Div, Eq, Ne, Lt, Gt, Le, Ge, And, Or])
}

fn unop() -> impl Strategy<Value = UnaryOp> {
    select(vec![UnaryOp::Neg, UnaryOp::Pos, UnaryOp::Not])
}

/// Binary operands of operators are parenthesized, which is the only
/// shape the printer can reproduce without knowing precedence.
fn operand(expr: Expr) -> Box<Expr> {
    match expr {
        Expr::Binary(..) => Box::new(Expr::Grouping(Box::new(expr))),
        other => Box::new(other),
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        "[0-9]{1,6}".prop_map(|s| Expr::Integer(s.into())),
        "[0-9]{1,4}\\.[0-9]{1,4}".prop_map(|s| Expr::Float(s.into())),
        any::<bool>().prop_map(Expr::Bool),
        prop_oneof![prop::char::range('a', 'z'), Just('\n'), Just('\'')].prop_map(Expr::Char),
        name().prop_map(Expr::Name),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (unop(), inner.clone()).prop_map(|(op, x)| Expr::Unary(op, operand(x))),
            (binop(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Expr::Binary(op, operand(l), operand(r))),
            inner.clone().prop_map(|x| Expr::Grouping(Box::new(x))),
            (name(), prop::collection::vec(inner, 0..3)).prop_map(|(id, args)| Expr::Call(id, args)),
        ]
    })
}

fn call() -> impl Strategy<Value = Expr> {
    (name(), prop::collection::vec(expr(), 0..3)).prop_map(|(id, args)| Expr::Call(id, args))
}

fn stmt() -> impl Strategy<Value = Stmt> {
    let simple = prop_oneof![
        expr().prop_map(Stmt::Print),
        Just(Stmt::Break),
        Just(Stmt::Continue),
        expr().prop_map(Stmt::Return),
        (name(), expr()).prop_map(|(id, e)| Stmt::Assign(id, e)),
        (name(), prop::option::of(typename()), prop::option::of(expr()))
            .prop_map(|(id, ty, e)| Stmt::Var(id, ty, e)),
        (name(), prop::option::of(typename()), expr()).prop_map(|(id, ty, e)| Stmt::Const(id, ty, e)),
        call().prop_map(Stmt::Expr),
    ];
    simple.prop_recursive(3, 24, 4, |inner| {
        let block = prop::collection::vec(inner, 0..4);
        prop_oneof![
            (expr(), block.clone(), prop::option::of(block.clone()))
                .prop_map(|(test, then, alt)| Stmt::If(test, then, alt)),
            (expr(), block.clone()).prop_map(|(test, body)| Stmt::While(test, body)),
            (
                name(),
                prop::collection::vec((name(), typename()), 0..3),
                typename(),
                block,
            )
                .prop_map(|(name, params, ret, body)| {
                    let params = params.into_iter().map(|(name, ty)| Param { name, ty }).collect();
                    Stmt::Func(Rc::new(FuncDecl { name, params, ret, body }))
                }),
        ]
    })
}

proptest! {
    #[test]
    fn format_then_parse_is_identity(program in prop::collection::vec(stmt(), 0..6)) {
        let text = format_program(&program);
        prop_assert_eq!(parse_source(&text), Ok(program), "formatted as:\n{}", text);
    }

    #[test]
    fn formatting_is_a_fixed_point(program in prop::collection::vec(stmt(), 0..6)) {
        let once = format_program(&program);
        let reparsed = parse_source(&once).unwrap();
        prop_assert_eq!(format_program(&reparsed), once);
    }
}
