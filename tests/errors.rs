use wabbit::error::ErrorKind;
use wabbit::parser::parse_source;
use wabbit::resolver::ResolverErr;
use wabbit::treewalk::expr::EvalErr;
use wabbit::treewalk::interpreter::{InterpretErr, Interpreter};

fn fail(code: &str) -> InterpretErr {
    Interpreter::with_writer(Vec::new()).run(code).unwrap_err()
}

fn kind(code: &str) -> ErrorKind {
    fail(code).kind()
}

/// Skips the static checks so the evaluator's own checks are exercised.
fn eval_only(code: &str) -> EvalErr {
    let program = parse_source(code).unwrap();
    Interpreter::with_writer(Vec::new())
        .interpret(&program)
        .unwrap_err()
}

#[test]
fn lex_errors() {
    assert_eq!(kind("print 1 $ 2;"), ErrorKind::LexError);
    assert_eq!(kind("print 1; /* never closed"), ErrorKind::LexError);
    assert_eq!(kind("print 'ab';"), ErrorKind::LexError);
}

#[test]
fn parse_errors() {
    assert_eq!(kind("print 1 +;"), ErrorKind::ParseError);
    assert_eq!(kind("print 1"), ErrorKind::ParseError);
    assert_eq!(kind("if true { print 1;"), ErrorKind::ParseError);
    assert_eq!(kind("print 1 < 2 < 3;"), ErrorKind::ParseError);

    let err = fail("var x = 1;\nprint ;");
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn arity_mismatch_is_a_parse_error() {
    let err = fail("func f(x int) int { return x; } print f(1, 2);");
    assert!(matches!(
        &err,
        InterpretErr::ResolverErrs(errs)
            if errs == &[ResolverErr::WrongArgumentCount { name: "f".into(), expected: 1, found: 2 }]
    ));
    assert_eq!(err.kind(), ErrorKind::ParseError);

    // Without the static pass the call itself refuses.
    assert!(matches!(
        eval_only("func f(x int) int { return x; } print f(1, 2);"),
        EvalErr::WrongArgumentCount { expected: 1, found: 2, .. }
    ));
}

#[test]
fn name_errors() {
    assert_eq!(kind("print y;"), ErrorKind::NameError);
    assert_eq!(kind("y = 1;"), ErrorKind::NameError);
    assert_eq!(kind("print nothing();"), ErrorKind::NameError);
    // Callees only see globals, not their caller's locals.
    assert_eq!(
        kind("func inner() int { return x; } func outer() int { var x int = 5; return inner(); } print outer();"),
        ErrorKind::NameError
    );
}

#[test]
fn const_reassignment() {
    let err = fail("const pi = 3.14; pi = 1.0;");
    assert_eq!(err.kind(), ErrorKind::NameError);
    assert!(matches!(
        &err,
        InterpretErr::ResolverErrs(errs) if errs == &[ResolverErr::ConstAssignment("pi".into())]
    ));

    assert!(matches!(
        eval_only("const pi = 3.14; pi = 1.0;"),
        EvalErr::ConstAssignment(_)
    ));
    assert!(matches!(
        eval_only("func f() void { } f = 1;"),
        EvalErr::FunctionAssignment(_)
    ));
}

#[test]
fn type_errors() {
    assert_eq!(kind("print 1 + 2.0;"), ErrorKind::TypeError);
    assert_eq!(kind("print -true;"), ErrorKind::TypeError);
    assert_eq!(kind("print 1 && true;"), ErrorKind::TypeError);
    assert_eq!(kind("print true == true;"), ErrorKind::TypeError);
    assert_eq!(kind("while 1 { }"), ErrorKind::TypeError);
    assert_eq!(kind("if 'c' { }"), ErrorKind::TypeError);
    assert_eq!(kind("var x int = 1.5;"), ErrorKind::TypeError);
    assert_eq!(kind("var x int = 1; x = false;"), ErrorKind::TypeError);
    assert_eq!(kind("var x str = 1;"), ErrorKind::TypeError);
    assert_eq!(kind("var x = 1; print x();"), ErrorKind::TypeError);
    assert_eq!(kind("func f(x int) int { return x; } print f(1.0);"), ErrorKind::TypeError);
    assert_eq!(kind("func f() int { return true; } print f();"), ErrorKind::TypeError);
    assert_eq!(kind("func f() void { return 1; } f();"), ErrorKind::TypeError);
}

#[test]
fn reading_unset_variable() {
    let err = fail("var v int; print v;");
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert!(matches!(err, InterpretErr::Eval(EvalErr::Unset(_))));
}

#[test]
fn control_flow_errors() {
    assert_eq!(kind("break;"), ErrorKind::ControlFlowError);
    assert_eq!(kind("if true { continue; }"), ErrorKind::ControlFlowError);
    assert_eq!(kind("return 1;"), ErrorKind::ControlFlowError);
    assert_eq!(kind("func f() int { } print f();"), ErrorKind::ControlFlowError);

    assert!(matches!(eval_only("break;"), EvalErr::BreakOutsideLoop));
    assert!(matches!(eval_only("continue;"), EvalErr::ContinueOutsideLoop));
    assert!(matches!(eval_only("return 1;"), EvalErr::ReturnOutsideFunction));
    assert!(matches!(
        eval_only("while true { func g() void { break; } g(); }"),
        EvalErr::BreakOutsideLoop
    ));
}

#[test]
fn arithmetic_errors() {
    assert_eq!(kind("print 1 / 0;"), ErrorKind::ArithmeticError);
    assert_eq!(kind("print 1.0 / 0.0;"), ErrorKind::ArithmeticError);
    assert_eq!(kind("print 9223372036854775807 + 1;"), ErrorKind::ArithmeticError);
    assert_eq!(kind("print 99999999999999999999;"), ErrorKind::ArithmeticError);
}

#[test]
fn recursion_limit() {
    let err = fail("func r(n int) int { return r(n + 1); } print r(0);");
    assert_eq!(err.kind(), ErrorKind::ResourceError);
}

#[test]
fn output_before_failure_is_kept() {
    let mut interp = Interpreter::with_writer(Vec::new());
    assert!(interp.run("print 1; print 1 / 0; print 2;").is_err());
    assert_eq!(String::from_utf8_lossy(interp.writer()), "1\n");
}
