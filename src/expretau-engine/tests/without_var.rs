// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::f64::consts::TAU;

use float_cmp::approx_eq;

use expretau_engine::{Registry, RtExpr, Value, parse};

fn eval_const(src: &str) -> Value {
    let expr = parse(src).unwrap_or_else(|e| panic!("failed to parse {src}: {e}"));
    let rt = expr
        .compile(None, Registry::global())
        .unwrap_or_else(|e| panic!("failed to compile {src}: {e}"));
    assert!(rt.is_const(), "{src} was not folded: {rt:?}");
    let RtExpr::Const(value) = rt else {
        unreachable!()
    };
    value
}

fn check(cases: &[(&str, Value)]) {
    for (src, expected) in cases.iter() {
        let actual = eval_const(src);
        match (&actual, expected) {
            (Value::Double(a), Value::Double(b)) => {
                assert!(
                    approx_eq!(f64, *a, *b, epsilon = 1e-10),
                    "{src}: {a} != {b}"
                );
            }
            _ => assert_eq!(*expected, actual, "{src}"),
        }
    }
}

#[test]
fn literals() {
    check(&[
        ("true", Value::Bool(true)),
        ("false", Value::Bool(false)),
        ("2", Value::Long(2)),
        ("3.0", Value::Double(3.0)),
        ("'foo'", Value::from("foo")),
        ("\"bar\"", Value::from("bar")),
        (
            "'\\\\-\\/-\\b-\\n-\\r-\\t-\\u0020'",
            Value::from("\\-/-\u{8}-\n-\r-\t- "),
        ),
        ("\"a\\\"b\"", Value::from("a\"b")),
        ("'a\"b'", Value::from("a\"b")),
    ]);
}

#[test]
fn arithmetic() {
    check(&[
        ("1 + 2", Value::Long(3)),
        ("1 + 2 * 3", Value::Long(7)),
        ("(1 + 2) * 3", Value::Long(9)),
        ("(1 + 2) * (5 - (3 + 4))", Value::Long(-6)),
        ("3 * 1.5 + 2.34", Value::Double(6.84)),
        ("2 * -3.14e2", Value::Double(-6.28e2)),
        ("5e4 + 3e3", Value::Double(53e3)),
        ("1 / 100", Value::Long(0)),
        ("1.0 / 100", Value::Double(1e-2)),
        ("1 + (2 * 3-4)", Value::Long(3)),
        ("+5 - -5", Value::Long(10)),
    ]);
}

#[test]
fn relational_and_logical() {
    check(&[
        ("3 < 4", Value::Bool(true)),
        ("4.0 == 4", Value::Bool(true)),
        ("5 != 6", Value::Bool(true)),
        ("5 <> 5", Value::Bool(false)),
        ("1 <= 2 && 3 > 2", Value::Bool(true)),
        ("1 > 0.1 and 2 - 2 = 0", Value::Bool(true)),
        (
            "not (0.0 * 2 < 0 || 1 * 4 > 3 and 6 / 6 == 1)",
            Value::Bool(false),
        ),
        ("'abc' < 'abd'", Value::Bool(true)),
        ("true == (not false)", Value::Bool(true)),
        ("!(1 > 2)", Value::Bool(true)),
    ]);
}

#[test]
fn string_ops() {
    check(&[
        ("'abc' startsWith 'a'", Value::Bool(true)),
        ("'abc' startsWith 'c'", Value::Bool(false)),
        ("'abc' endsWith 'c'", Value::Bool(true)),
        ("'abc' endsWith 'b'", Value::Bool(false)),
        ("'abc' contains 'b'", Value::Bool(true)),
        ("'abc123' matches '\\\\w{3}\\\\d{3}'", Value::Bool(true)),
        ("'abc123' matches '.{5}'", Value::Bool(false)),
        ("\"abc\" + 'def'", Value::from("abcdef")),
    ]);
}

#[test]
fn mathematical_functions() {
    check(&[
        ("abs(-1)", Value::Long(1)),
        ("abs(-2.3)", Value::Double(2.3)),
        ("sin(0)", Value::Double(0.0)),
        ("sin(TAU / 12)", Value::Double(0.5)),
        ("sin(TAU / 4)", Value::Double(1.0)),
        ("sin(5 * TAU / 12)", Value::Double(0.5)),
        ("sin(TAU / 2)", Value::Double(0.0)),
        ("sin(7 * TAU / 12)", Value::Double(-0.5)),
        ("sin(3 * TAU / 4)", Value::Double(-1.0)),
        ("sin(11 * TAU / 12)", Value::Double(-0.5)),
        ("sin(TAU)", Value::Double(0.0)),
        ("cos(0)", Value::Double(1.0)),
        ("cos(TAU / 6)", Value::Double(0.5)),
        ("cos(TAU / 4)", Value::Double(0.0)),
        ("cos(TAU / 3)", Value::Double(-0.5)),
        ("cos(TAU / 2)", Value::Double(-1.0)),
        ("cos(2 * TAU / 3)", Value::Double(-0.5)),
        ("cos(3 * TAU / 4)", Value::Double(0.0)),
        ("cos(5 * TAU / 6)", Value::Double(0.5)),
        ("cos(TAU)", Value::Double(1.0)),
        ("tan(0)", Value::Double(0.0)),
        ("tan(TAU / 8)", Value::Double(1.0)),
        ("tan(3 * TAU / 8)", Value::Double(-1.0)),
        ("tan(TAU / 2)", Value::Double(0.0)),
        ("tan(5 * TAU / 8)", Value::Double(1.0)),
        ("tan(7 * TAU / 8)", Value::Double(-1.0)),
        ("tan(TAU)", Value::Double(0.0)),
        ("asin(-1)", Value::Double(-TAU / 4.0)),
        ("asin(-0.5)", Value::Double(-TAU / 12.0)),
        ("asin(0)", Value::Double(0.0)),
        ("asin(0.5)", Value::Double(TAU / 12.0)),
        ("asin(1)", Value::Double(TAU / 4.0)),
        ("acos(-1)", Value::Double(TAU / 2.0)),
        ("acos(-0.5)", Value::Double(TAU / 3.0)),
        ("acos(0)", Value::Double(TAU / 4.0)),
        ("acos(0.5)", Value::Double(TAU / 6.0)),
        ("acos(1)", Value::Double(0.0)),
        ("atan(-1)", Value::Double(-TAU / 8.0)),
        ("atan(0)", Value::Double(0.0)),
        ("atan(1)", Value::Double(TAU / 8.0)),
        ("sinh(0)", Value::Double(0.0)),
        ("cosh(0)", Value::Double(1.0)),
        ("tanh(0)", Value::Double(0.0)),
        ("cosh(2.5) + sinh(2.5)", Value::Double(2.5f64.exp())),
        ("cosh(3.5) - sinh(3.5)", Value::Double((-3.5f64).exp())),
        ("exp(0)", Value::Double(1.0)),
        ("exp(1)", Value::Double(1f64.exp())),
        ("log(E)", Value::Double(1.0)),
        ("log(1.0 / E)", Value::Double(-1.0)),
    ]);
}

#[test]
fn string_functions() {
    check(&[
        ("toLowerCase('HeLlO')", Value::from("hello")),
        ("toUpperCase('HeLlO')", Value::from("HELLO")),
        ("trim(' HeLlO \\n\\t')", Value::from("HeLlO")),
        (
            "replace('I love $name', '$name', 'Lucia')",
            Value::from("I love Lucia"),
        ),
        ("substring('hello', 1, 3)", Value::from("el")),
        ("substring('hello', 3)", Value::from("lo")),
    ]);
}

#[test]
fn type_conversions() {
    check(&[
        ("int(3.7)", Value::Int(3)),
        ("long('42')", Value::Long(42)),
        ("double(1) / 4", Value::Double(0.25)),
        ("string(1.5) + string(true)", Value::from("1.5true")),
        ("decimal('2.5') / 2", Value::Decimal("1.2".parse().unwrap())),
        ("decimal('3.5') / 2", Value::Decimal("1.8".parse().unwrap())),
        ("decimal(1) + 0.25", Value::Decimal("1.25".parse().unwrap())),
    ]);
}
