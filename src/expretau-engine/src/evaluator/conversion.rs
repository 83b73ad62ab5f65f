// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;

use super::{Implementation, try_unary, unary};
use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::registry::RegistryBuilder;
use crate::value::{Value, decimal_from_f64, decimal_to_f64, decimal_to_i64};

fn parse<T: FromStr>(s: &str, target: TypeCode) -> Result<T> {
    match s.trim().parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => eval_err!(BadConversion, format!("'{s}' to {target}")),
    }
}

pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(&[], &["int", "long", "double", "decimal", "string"]);

    r.register_evaluator("int", unary(|a: i32| a));
    r.register_evaluator("int", unary(|a: i64| a as i32));
    r.register_evaluator("int", unary(|a: f64| a as i32));
    r.register_evaluator("int", unary(|a: BigDecimal| decimal_to_i64(&a) as i32));
    r.register_evaluator(
        "int",
        try_unary(|s: Arc<str>| parse::<i32>(&s, TypeCode::Int)),
    );

    r.register_evaluator("long", unary(|a: i32| a as i64));
    r.register_evaluator("long", unary(|a: i64| a));
    r.register_evaluator("long", unary(|a: f64| a as i64));
    r.register_evaluator("long", unary(|a: BigDecimal| decimal_to_i64(&a)));
    r.register_evaluator(
        "long",
        try_unary(|s: Arc<str>| parse::<i64>(&s, TypeCode::Long)),
    );

    r.register_evaluator("double", unary(|a: i32| a as f64));
    r.register_evaluator("double", unary(|a: i64| a as f64));
    r.register_evaluator("double", unary(|a: f64| a));
    r.register_evaluator("double", unary(|a: BigDecimal| decimal_to_f64(&a)));
    r.register_evaluator(
        "double",
        try_unary(|s: Arc<str>| parse::<f64>(&s, TypeCode::Double)),
    );

    r.register_evaluator("decimal", unary(|a: i32| BigDecimal::from(a)));
    r.register_evaluator("decimal", unary(|a: i64| BigDecimal::from(a)));
    r.register_evaluator(
        "decimal",
        try_unary(|a: f64| match decimal_from_f64(a) {
            Some(d) => Ok(d),
            None => eval_err!(BadConversion, format!("{a:?} to {}", TypeCode::Decimal)),
        }),
    );
    r.register_evaluator("decimal", unary(|a: BigDecimal| a));
    r.register_evaluator(
        "decimal",
        try_unary(|s: Arc<str>| parse::<BigDecimal>(&s, TypeCode::Decimal)),
    );

    // every tag a value can carry prints the same way
    for t in TypeCode::ALL {
        if t.is_structural() || t == TypeCode::Null {
            continue;
        }
        r.register_evaluator(
            "string",
            Implementation::dynamic(&[t], TypeCode::String, |args| {
                Ok(Value::from(args.first().map_or(String::new(), Value::to_string)))
            }),
        );
    }
}

#[test]
fn test_parse() {
    assert_eq!(12, parse::<i32>(" 12", TypeCode::Int).unwrap());
    assert_eq!(
        crate::common::ErrorCode::BadConversion,
        parse::<i64>("12x", TypeCode::Long).unwrap_err().code
    );
    assert_eq!(
        BigDecimal::from_str("1.50").unwrap(),
        parse::<BigDecimal>("1.50", TypeCode::Decimal).unwrap()
    );
}
