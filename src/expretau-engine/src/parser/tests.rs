// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::*;
use crate::ast::{BinaryOp, Expr0, LiteralKind, UnaryOp};
use crate::common::ErrorCode;

fn parse_ok(input: &str) -> Expr0 {
    parse(input).unwrap().unwrap().strip_loc()
}

fn parse_err(input: &str) -> EquationError {
    let errs = parse(input).unwrap_err();
    assert_eq!(1, errs.len());
    errs[0].clone()
}

fn int(s: &str) -> Box<Expr0> {
    Box::new(Expr0::Const(LiteralKind::Int, s.to_owned(), Loc::default()))
}

fn var(s: &str) -> Box<Expr0> {
    Box::new(Expr0::Var(s.to_owned(), Loc::default()))
}

fn op2(op: BinaryOp, l: Box<Expr0>, r: Box<Expr0>) -> Box<Expr0> {
    Box::new(Expr0::Op2(op, l, r, Loc::default()))
}

#[test]
fn test_parse_literals() {
    assert!(matches!(parse_ok("42"), Expr0::Const(LiteralKind::Int, s, _) if s == "42"));
    assert!(matches!(parse_ok("2.75"), Expr0::Const(LiteralKind::Real, s, _) if s == "2.75"));
    assert!(matches!(parse_ok("'foo'"), Expr0::Const(LiteralKind::Str, s, _) if s == "'foo'"));
    assert!(matches!(parse_ok("true"), Expr0::Const(LiteralKind::Bool, s, _) if s == "true"));
}

#[test]
fn test_parse_precedence() {
    assert_eq!(
        *op2(BinaryOp::Add, int("1"), op2(BinaryOp::Mul, int("2"), int("3"))),
        parse_ok("1 + 2 * 3")
    );
    assert_eq!(
        *op2(BinaryOp::Mul, op2(BinaryOp::Add, int("1"), int("2")), int("3")),
        parse_ok("(1 + 2) * 3")
    );
    // left associative
    assert_eq!(
        *op2(BinaryOp::Sub, op2(BinaryOp::Sub, int("1"), int("2")), int("3")),
        parse_ok("1 - 2 - 3")
    );
    // and binds tighter than or
    assert_eq!(
        *op2(
            BinaryOp::Or,
            var("a"),
            op2(BinaryOp::And, var("b"), var("c"))
        ),
        parse_ok("a || b and c")
    );
}

#[test]
fn test_parse_not() {
    assert_eq!(
        Expr0::Op1(
            UnaryOp::Not,
            op2(BinaryOp::Lt, var("a"), var("b")),
            Loc::default()
        ),
        parse_ok("not a < b")
    );
    assert_eq!(
        *op2(
            BinaryOp::And,
            Box::new(Expr0::Op1(UnaryOp::Not, var("a"), Loc::default())),
            var("b")
        ),
        parse_ok("!a && b")
    );
}

#[test]
fn test_parse_unary() {
    assert_eq!(
        *op2(
            BinaryOp::Mul,
            int("2"),
            Box::new(Expr0::Op1(
                UnaryOp::Negative,
                Box::new(Expr0::Const(LiteralKind::Real, "3.14e2".to_owned(), Loc::default())),
                Loc::default()
            ))
        ),
        parse_ok("2 * -3.14e2")
    );
    assert!(matches!(parse_ok("--1"), Expr0::Op1(UnaryOp::Negative, _, _)));
}

#[test]
fn test_parse_string_ops() {
    for (input, op) in [
        ("'a' startsWith 'b'", BinaryOp::StartsWith),
        ("'a' endsWith 'b'", BinaryOp::EndsWith),
        ("'a' contains 'b'", BinaryOp::Contains),
        ("'a' matches 'b'", BinaryOp::Matches),
    ] {
        assert!(matches!(parse_ok(input), Expr0::Op2(o, _, _, _) if o == op));
    }
}

#[test]
fn test_parse_index_and_member() {
    assert_eq!(
        Expr0::Member(
            Box::new(Expr0::Index(var("$"), int("0"), Loc::default())),
            "b".to_owned(),
            Loc::default()
        ),
        parse_ok("$[0].b")
    );
    assert!(matches!(parse_ok("$['a']"), Expr0::Index(_, _, _)));
    assert!(matches!(parse_ok("f(x)[1]"), Expr0::Index(b, _, _) if matches!(*b, Expr0::App(..))));
}

#[test]
fn test_parse_app() {
    assert_eq!(
        Expr0::App(
            "substring".to_owned(),
            vec![*var("s"), *int("1"), *int("2")],
            Loc::default()
        ),
        parse_ok("substring(s, 1, 2)")
    );
    assert_eq!(
        Expr0::App("time".to_owned(), vec![], Loc::default()),
        parse_ok("time()")
    );
}

#[test]
fn test_parse_locs() {
    let expr = parse("a + b[10]").unwrap().unwrap();
    assert_eq!(Loc::new(0, 9), expr.get_loc());
    let Expr0::Op2(_, _, r, _) = expr else {
        panic!("expected op2");
    };
    assert_eq!(Loc::new(4, 9), r.get_loc());
}

#[test]
fn test_parse_empty() {
    assert_eq!(Ok(None), parse(""));
    assert_eq!(Ok(None), parse("   "));
}

#[test]
fn test_parse_errors() {
    assert_eq!(ErrorCode::ExtraToken, parse_err("1 2").code);
    assert_eq!(ErrorCode::UnrecognizedEof, parse_err("1 +").code);
    assert_eq!(ErrorCode::UnrecognizedEof, parse_err("(1 + 2").code);
    assert_eq!(ErrorCode::UnrecognizedToken, parse_err("1 + * 2").code);
    assert_eq!(ErrorCode::UnrecognizedToken, parse_err("a.+").code);
    // `.1` lexes as a number
    assert_eq!(ErrorCode::ExtraToken, parse_err("a.1").code);
    assert_eq!(ErrorCode::UnclosedString, parse_err("'abc").code);

    let err = parse_err("1 2");
    assert_eq!((2, 3), (err.start, err.end));
}

#[test]
fn test_parse_nesting_limit() {
    let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
    assert_eq!(*int("1"), parse_ok(&nested(50)));
    assert_eq!(ErrorCode::ExpressionTooDeep, parse_err(&nested(20000)).code);
    assert_eq!(
        ErrorCode::ExpressionTooDeep,
        parse_err(&format!("{}1", "- ".repeat(20000))).code
    );
    assert_eq!(
        ErrorCode::ExpressionTooDeep,
        parse_err(&format!("{}true", "not ".repeat(20000))).code
    );
    assert_eq!(
        ErrorCode::ExpressionTooDeep,
        parse_err(&format!("f({}1{})", "a[".repeat(20000), "]".repeat(20000))).code
    );
}

#[test]
fn test_parse_tree_height_limit() {
    let chain = |n: usize| vec!["1"; n].join(" + ");
    assert!(parse(&chain(MAX_DEPTH)).is_ok());
    assert_eq!(ErrorCode::ExpressionTooDeep, parse_err(&chain(MAX_DEPTH + 2)).code);
    assert_eq!(ErrorCode::ExpressionTooDeep, parse_err(&chain(100_000)).code);

    let members = format!("a{}", ".b".repeat(MAX_DEPTH + 1));
    assert_eq!(ErrorCode::ExpressionTooDeep, parse_err(&members).code);
}

#[test]
fn test_parse_long_input() {
    let padded = format!("{}x.ab", " ".repeat(70000));
    let Expr0::Member(_, name, loc) = parse(&padded).unwrap().unwrap() else {
        panic!("expected member");
    };
    assert_eq!("ab", name);
    assert_eq!(Loc::new(u16::MAX as usize, u16::MAX as usize), loc);

    let err = parse_err(&format!("{}1 2", " ".repeat(70000)));
    assert_eq!(ErrorCode::ExtraToken, err.code);
    assert_eq!((u16::MAX, u16::MAX), (err.start, err.end));
}
