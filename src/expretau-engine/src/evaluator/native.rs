// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use super::{EvaluatorKey, Implementation};
use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::value::Value;

/// A Rust type standing for one type tag.
pub trait Native: Sized {
    const TYPE_CODE: TypeCode;
}

pub trait FromValue: Native {
    fn from_value(value: &Value) -> Option<Self>;
}

pub trait IntoValue: Native {
    fn into_value(self) -> Value;
}

macro_rules! native {
    ($ty:ty, $code:ident, $variant:ident) => {
        impl Native for $ty {
            const TYPE_CODE: TypeCode = TypeCode::$code;
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

native!(bool, Bool, Bool);
native!(i32, Int, Int);
native!(i64, Long, Long);
native!(f64, Double, Double);
native!(BigDecimal, Decimal, Decimal);
native!(Arc<str>, String, String);
native!(NaiveDateTime, Time, Time);
native!(Arc<[bool]>, BoolArray, BoolArray);
native!(Arc<[i32]>, IntArray, IntArray);
native!(Arc<[i64]>, LongArray, LongArray);
native!(Arc<[f64]>, DoubleArray, DoubleArray);
native!(Arc<[BigDecimal]>, DecimalArray, DecimalArray);
native!(Arc<[Arc<str>]>, StringArray, StringArray);
native!(Arc<[Value]>, ObjectArray, ObjectArray);
native!(Arc<Vec<Value>>, List, List);
native!(Arc<BTreeMap<String, Value>>, Map, Map);

impl Native for String {
    const TYPE_CODE: TypeCode = TypeCode::String;
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl Native for Value {
    const TYPE_CODE: TypeCode = TypeCode::Object;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

fn arg<T: FromValue>(args: &[Value], i: usize) -> Result<T> {
    match args.get(i).and_then(T::from_value) {
        Some(v) => Ok(v),
        None => eval_err!(
            NoMatchingEvaluator,
            format!("argument {} is not {}", i, T::TYPE_CODE)
        ),
    }
}

fn implementation<F>(params: &[TypeCode], ret: TypeCode, func: F) -> Implementation
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
{
    Implementation {
        params: EvaluatorKey::new(params),
        ret,
        func: Arc::new(func),
    }
}

pub fn nullary<R, F>(f: F) -> Implementation
where
    R: IntoValue,
    F: Fn() -> R + Send + Sync + 'static,
{
    implementation(&[], R::TYPE_CODE, move |_| Ok(f().into_value()))
}

pub fn try_nullary<R, F>(f: F) -> Implementation
where
    R: IntoValue,
    F: Fn() -> Result<R> + Send + Sync + 'static,
{
    implementation(&[], R::TYPE_CODE, move |_| Ok(f()?.into_value()))
}

pub fn unary<A, R, F>(f: F) -> Implementation
where
    A: FromValue,
    R: IntoValue,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    implementation(&[A::TYPE_CODE], R::TYPE_CODE, move |args| {
        Ok(f(arg(args, 0)?).into_value())
    })
}

pub fn try_unary<A, R, F>(f: F) -> Implementation
where
    A: FromValue,
    R: IntoValue,
    F: Fn(A) -> Result<R> + Send + Sync + 'static,
{
    implementation(&[A::TYPE_CODE], R::TYPE_CODE, move |args| {
        Ok(f(arg(args, 0)?)?.into_value())
    })
}

pub fn binary<A, B, R, F>(f: F) -> Implementation
where
    A: FromValue,
    B: FromValue,
    R: IntoValue,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    implementation(&[A::TYPE_CODE, B::TYPE_CODE], R::TYPE_CODE, move |args| {
        Ok(f(arg(args, 0)?, arg(args, 1)?).into_value())
    })
}

pub fn try_binary<A, B, R, F>(f: F) -> Implementation
where
    A: FromValue,
    B: FromValue,
    R: IntoValue,
    F: Fn(A, B) -> Result<R> + Send + Sync + 'static,
{
    implementation(&[A::TYPE_CODE, B::TYPE_CODE], R::TYPE_CODE, move |args| {
        Ok(f(arg(args, 0)?, arg(args, 1)?)?.into_value())
    })
}

pub fn ternary<A, B, C, R, F>(f: F) -> Implementation
where
    A: FromValue,
    B: FromValue,
    C: FromValue,
    R: IntoValue,
    F: Fn(A, B, C) -> R + Send + Sync + 'static,
{
    implementation(
        &[A::TYPE_CODE, B::TYPE_CODE, C::TYPE_CODE],
        R::TYPE_CODE,
        move |args| Ok(f(arg(args, 0)?, arg(args, 1)?, arg(args, 2)?).into_value()),
    )
}

pub fn try_ternary<A, B, C, R, F>(f: F) -> Implementation
where
    A: FromValue,
    B: FromValue,
    C: FromValue,
    R: IntoValue,
    F: Fn(A, B, C) -> Result<R> + Send + Sync + 'static,
{
    implementation(
        &[A::TYPE_CODE, B::TYPE_CODE, C::TYPE_CODE],
        R::TYPE_CODE,
        move |args| Ok(f(arg(args, 0)?, arg(args, 1)?, arg(args, 2)?)?.into_value()),
    )
}

#[test]
fn test_typed_helpers() {
    let imp = binary(|a: i64, b: f64| a as f64 * b);
    assert_eq!(
        EvaluatorKey::new(&[TypeCode::Long, TypeCode::Double]),
        imp.params
    );
    assert_eq!(TypeCode::Double, imp.ret);
    assert_eq!(
        Value::Double(5.0),
        imp.call(&[Value::Long(2), Value::Double(2.5)]).unwrap()
    );

    // a mistyped argument is reported, not coerced
    let err = imp.call(&[Value::Double(2.0), Value::Double(2.5)]).unwrap_err();
    assert_eq!(crate::common::ErrorCode::NoMatchingEvaluator, err.code);

    let imp = unary(|s: Arc<str>| s.len() as i32);
    assert_eq!(TypeCode::Int, imp.ret);
    assert_eq!(Value::Int(3), imp.call(&[Value::from("abc")]).unwrap());

    let imp = nullary(|| "x".to_owned());
    assert_eq!(TypeCode::String, imp.ret);
    assert!(imp.params.is_empty());
}
