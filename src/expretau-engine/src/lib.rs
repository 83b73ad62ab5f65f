// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod ast;
pub mod common;
pub mod compiler;
pub mod data;
pub mod evaluator;
mod lexer;
pub mod parser;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod value;

pub use self::ast::{Expr, print_expr};
pub use self::common::{Error, ErrorCode, ErrorKind, Result, TypeCode};
pub use self::compiler::{CompileContext, compile};
pub use self::data::{DataFormat, DataParser, RtData};
pub use self::evaluator::{Evaluator, EvaluatorFactory, EvaluatorKey, Implementation};
pub use self::registry::{Registry, RegistryBuilder};
pub use self::runtime::{EvalContext, RtExpr};
pub use self::schema::{Schema, SchemaNode, SchemaParser, SchemaRoot, compile_schema};
pub use self::value::Value;

/// parse reads the source text of one expression.  Syntax errors carry
/// the byte span of the offending token in their details.
pub fn parse(text: &str) -> Result<Expr> {
    match parser::parse(text) {
        Ok(Some(expr)) => Ok(Expr::from(expr)?),
        Ok(None) => Err(Error::new(ErrorKind::Parse, ErrorCode::EmptyExpression, None)),
        Err(errs) => {
            let err = errs.into_iter().next().map(Error::from);
            Err(err.unwrap_or_else(|| {
                Error::new(ErrorKind::Parse, ErrorCode::UnrecognizedToken, None)
            }))
        }
    }
}

/// eval parses, compiles and evaluates `text` against a record in one go.
pub fn eval(text: &str, schema: Option<&SchemaRoot>, data: Option<&RtData>) -> Result<Value> {
    let expr = parse(text)?;
    let ctx = schema.map(|root| root.schema() as &dyn CompileContext);
    let rt = expr.compile(ctx, Registry::global())?;
    rt.eval(data.map(|d| d as &dyn EvalContext))
}

#[test]
fn test_parse_errors() {
    let err = parse("   ").unwrap_err();
    assert_eq!(ErrorKind::Parse, err.kind);
    assert_eq!(ErrorCode::EmptyExpression, err.code);

    let err = parse("1 +").unwrap_err();
    assert_eq!(ErrorCode::UnrecognizedEof, err.code);

    let err = parse("'\\q'").unwrap_err();
    assert_eq!(ErrorCode::BadEscape, err.code);
}

#[test]
fn test_eval() {
    assert_eq!(Value::Long(3), eval("1 + 2", None, None).unwrap());
}

#[test]
fn test_long_and_deep_input() {
    // spans past u16::MAX saturate instead of wrapping
    let padded = format!("{}'ab'.length", " ".repeat(70000));
    assert!(parse(&padded).is_ok());
    let padded = format!("{}toUpperCase('ab')", " ".repeat(70000));
    assert_eq!(Value::from("AB"), eval(&padded, None, None).unwrap());

    let deep = format!("{}1{}", "(".repeat(20000), ")".repeat(20000));
    let err = parse(&deep).unwrap_err();
    assert_eq!(ErrorKind::Parse, err.kind);
    assert_eq!(ErrorCode::ExpressionTooDeep, err.code);

    // the deepest accepted tree still compiles and evaluates
    let chain = vec!["1"; parser::MAX_DEPTH].join(" + ");
    assert_eq!(Value::Long(parser::MAX_DEPTH as i64), eval(&chain, None, None).unwrap());
}
