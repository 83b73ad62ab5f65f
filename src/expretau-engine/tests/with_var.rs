// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::sync::Arc;

use expretau_engine::{
    DataParser, ErrorCode, EvalContext, Registry, RtData, RtExpr, SchemaParser, SchemaRoot,
    TypeCode, Value, parse,
};

struct Records {
    root: Arc<SchemaRoot>,
    data: Vec<RtData>,
}

fn load() -> Records {
    let root = SchemaParser::yaml()
        .parse(include_str!("data/simple_vars.yml"))
        .unwrap();
    let root = Arc::new(root);
    let parser = DataParser::yaml(root.clone());
    let data = [
        "{a: 2, b: 3.0, c: true, d: foo}",
        "{a: 3, b: 4.0, c: false, d: bar}",
    ]
    .iter()
    .map(|text| parser.parse(text).unwrap())
    .collect();
    Records { root, data }
}

fn compile(records: &Records, src: &str) -> RtExpr {
    parse(src)
        .unwrap()
        .compile(Some(records.root.schema()), Registry::global())
        .unwrap_or_else(|e| panic!("failed to compile {src}: {e}"))
}

#[test]
fn simple_vars_layout() {
    let records = load();
    assert_eq!(4, records.root.max_index());
    let schema = records.root.schema();
    for (name, t) in [
        ("a", TypeCode::Long),
        ("b", TypeCode::Double),
        ("c", TypeCode::Bool),
        ("d", TypeCode::String),
    ] {
        assert_eq!(Some(t), schema.child(name).map(|n| n.type_code()));
    }
}

#[test]
fn eval_with_vars() {
    let records = load();
    let cases: &[(&str, Value, Value)] = &[
        ("a", Value::Long(2), Value::Long(3)),
        ("b", Value::Double(3.0), Value::Double(4.0)),
        ("c", Value::Bool(true), Value::Bool(false)),
        ("d", Value::from("foo"), Value::from("bar")),
        ("1 + a", Value::Long(3), Value::Long(4)),
        ("a + b", Value::Double(5.0), Value::Double(7.0)),
        ("1 + 2 * b", Value::Double(7.0), Value::Double(9.0)),
        ("$.a * $.b", Value::Double(6.0), Value::Double(12.0)),
        ("$['a'] - $[\"b\"]", Value::Double(-1.0), Value::Double(-1.0)),
        // the right operand would divide by zero
        ("false and a/0", Value::Bool(false), Value::Bool(false)),
        ("true or a/0", Value::Bool(true), Value::Bool(true)),
        ("abs(a)", Value::Long(2), Value::Long(3)),
        ("c or a > 2", Value::Bool(true), Value::Bool(true)),
    ];
    for (src, first, second) in cases.iter() {
        let rt = compile(&records, src);
        assert!(!rt.is_const(), "{src} should read variables");
        assert_eq!(*first, rt.eval(Some(&records.data[0])).unwrap(), "{src}");
        assert_eq!(*second, rt.eval(Some(&records.data[1])).unwrap(), "{src}");
    }
}

#[test]
fn errors_with_vars() {
    let records = load();
    let err = parse("e + 1")
        .unwrap()
        .compile(Some(records.root.schema()), Registry::global())
        .unwrap_err();
    assert_eq!(ErrorCode::UnknownIdentifier, err.code);

    let rt = compile(&records, "a / 0");
    let err = rt.eval(Some(&records.data[0])).unwrap_err();
    assert_eq!(ErrorCode::DivisionByZero, err.code);

    let rt = compile(&records, "true and a / 1");
    let err = rt.eval(Some(&records.data[0])).unwrap_err();
    assert_eq!(ErrorCode::ExpectedBoolean, err.code);

    let rt = compile(&records, "a");
    assert_eq!(ErrorCode::MissingContext, rt.eval(None).unwrap_err().code);
}

#[test]
fn assign_var() {
    let records = load();
    let mut data = records.data[0].clone();
    let a = compile(&records, "a");
    a.assign(&mut data, Value::Long(40)).unwrap();
    let rt = compile(&records, "a + 2");
    assert_eq!(Value::Long(42), rt.eval(Some(&data)).unwrap());
    assert_eq!(4, EvalContext::len(&data));

    let sum = compile(&records, "a + 1");
    assert_eq!(
        ErrorCode::NotAssignable,
        sum.assign(&mut data, Value::Long(1)).unwrap_err().code
    );
}
