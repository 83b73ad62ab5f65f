// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;

use super::{binary, try_binary};
use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::registry::RegistryBuilder;
use crate::value::Value;

const INDUCE: &[TypeCode] = &[TypeCode::Int, TypeCode::Long];

fn element<T: Clone>(items: &[T], index: i32) -> Result<T> {
    match usize::try_from(index).ok().and_then(|i| items.get(i)) {
        Some(item) => Ok(item.clone()),
        None => eval_err!(
            IndexOutOfBounds,
            format!("index {} of length {}", index, items.len())
        ),
    }
}

pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(INDUCE, &["index"]);

    r.register_evaluator("index", try_binary(|a: Arc<[bool]>, i: i32| element(&a, i)));
    r.register_evaluator("index", try_binary(|a: Arc<[i32]>, i: i32| element(&a, i)));
    r.register_evaluator("index", try_binary(|a: Arc<[i64]>, i: i32| element(&a, i)));
    r.register_evaluator("index", try_binary(|a: Arc<[f64]>, i: i32| element(&a, i)));
    r.register_evaluator(
        "index",
        try_binary(|a: Arc<[BigDecimal]>, i: i32| element(&a, i)),
    );
    r.register_evaluator(
        "index",
        try_binary(|a: Arc<[Arc<str>]>, i: i32| element(&a, i)),
    );
    r.register_evaluator("index", try_binary(|a: Arc<[Value]>, i: i32| element(&a, i)));
    r.register_evaluator(
        "index",
        try_binary(|a: Arc<Vec<Value>>, i: i32| element(&a, i)),
    );
    // a missing key reads as null
    r.register_evaluator(
        "index",
        binary(|m: Arc<BTreeMap<String, Value>>, key: Arc<str>| {
            m.get(&*key).cloned().unwrap_or(Value::Null)
        }),
    );
}

#[test]
fn test_element() {
    let items = [1i64, 2, 3];
    assert_eq!(3, element(&items, 2).unwrap());
    assert_eq!(
        crate::common::ErrorCode::IndexOutOfBounds,
        element(&items, 3).unwrap_err().code
    );
    assert_eq!(
        crate::common::ErrorCode::IndexOutOfBounds,
        element(&items, -1).unwrap_err().code
    );
}
