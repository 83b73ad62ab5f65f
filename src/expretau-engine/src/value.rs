// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use num_traits::{ToPrimitive, Zero};

use crate::common::{Result, TypeCode};
use crate::eval_err;

/// The default text form of a time value, both for printing and for
/// `time(text)`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A runtime value.  Aggregates are reference counted so that reading a
/// slot or passing an argument never deep-copies.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(BigDecimal),
    String(Arc<str>),
    Time(NaiveDateTime),
    BoolArray(Arc<[bool]>),
    IntArray(Arc<[i32]>),
    LongArray(Arc<[i64]>),
    DoubleArray(Arc<[f64]>),
    DecimalArray(Arc<[BigDecimal]>),
    StringArray(Arc<[Arc<str>]>),
    ObjectArray(Arc<[Value]>),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
}

impl Value {
    /// type_code derives the dynamic tag of this value.
    pub fn type_code(&self) -> TypeCode {
        match self {
            Value::Null => TypeCode::Null,
            Value::Bool(_) => TypeCode::Bool,
            Value::Int(_) => TypeCode::Int,
            Value::Long(_) => TypeCode::Long,
            Value::Double(_) => TypeCode::Double,
            Value::Decimal(_) => TypeCode::Decimal,
            Value::String(_) => TypeCode::String,
            Value::Time(_) => TypeCode::Time,
            Value::BoolArray(_) => TypeCode::BoolArray,
            Value::IntArray(_) => TypeCode::IntArray,
            Value::LongArray(_) => TypeCode::LongArray,
            Value::DoubleArray(_) => TypeCode::DoubleArray,
            Value::DecimalArray(_) => TypeCode::DecimalArray,
            Value::StringArray(_) => TypeCode::StringArray,
            Value::ObjectArray(_) => TypeCode::ObjectArray,
            Value::List(_) => TypeCode::List,
            Value::Map(_) => TypeCode::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// convert_to applies the numeric conversion used when an argument is
    /// passed to an evaluator declared with a different tag.  Narrowing
    /// truncates; precision loss is not an error.
    pub fn convert_to(&self, target: TypeCode) -> Result<Value> {
        let from = self.type_code();
        if from == target || target == TypeCode::Object {
            return Ok(self.clone());
        }
        let converted = match (target, self) {
            (TypeCode::Decimal, Value::Int(n)) => Some(Value::Decimal(BigDecimal::from(*n))),
            (TypeCode::Decimal, Value::Long(n)) => Some(Value::Decimal(BigDecimal::from(*n))),
            (TypeCode::Decimal, Value::Double(n)) => decimal_from_f64(*n).map(Value::Decimal),
            (TypeCode::Double, Value::Int(n)) => Some(Value::Double(*n as f64)),
            (TypeCode::Double, Value::Long(n)) => Some(Value::Double(*n as f64)),
            (TypeCode::Double, Value::Decimal(n)) => Some(Value::Double(decimal_to_f64(n))),
            (TypeCode::Long, Value::Int(n)) => Some(Value::Long(*n as i64)),
            (TypeCode::Long, Value::Double(n)) => Some(Value::Long(*n as i64)),
            (TypeCode::Long, Value::Decimal(n)) => Some(Value::Long(decimal_to_i64(n))),
            (TypeCode::Int, Value::Long(n)) => Some(Value::Int(*n as i32)),
            (TypeCode::Int, Value::Double(n)) => Some(Value::Int(*n as i32)),
            (TypeCode::Int, Value::Decimal(n)) => Some(Value::Int(decimal_to_i64(n) as i32)),
            _ => None,
        };
        match converted {
            Some(value) => Ok(value),
            None => eval_err!(
                NoMatchingEvaluator,
                format!("cannot convert {} to {}", from, target)
            ),
        }
    }

    /// from_json builds a value from a generic document node: integral
    /// numbers become int64, other numbers double, arrays lists and objects
    /// maps.
    pub fn from_json(node: &serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match node {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Long(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s.as_str().into()),
            Json::Array(items) => Value::List(Arc::new(items.iter().map(Value::from_json).collect())),
            Json::Object(entries) => Value::Map(Arc::new(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            )),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        fn double(n: f64) -> Json {
            serde_json::Number::from_f64(n)
                .map(Json::Number)
                .unwrap_or(Json::Null)
        }
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Long(n) => Json::from(*n),
            Value::Double(n) => double(*n),
            Value::Decimal(n) => double(decimal_to_f64(n)),
            Value::String(s) => Json::String(s.to_string()),
            Value::Time(t) => Json::String(t.format(TIME_FORMAT).to_string()),
            Value::BoolArray(a) => Json::Array(a.iter().map(|b| Json::Bool(*b)).collect()),
            Value::IntArray(a) => Json::Array(a.iter().map(|n| Json::from(*n)).collect()),
            Value::LongArray(a) => Json::Array(a.iter().map(|n| Json::from(*n)).collect()),
            Value::DoubleArray(a) => Json::Array(a.iter().map(|n| double(*n)).collect()),
            Value::DecimalArray(a) => {
                Json::Array(a.iter().map(|n| double(decimal_to_f64(n))).collect())
            }
            Value::StringArray(a) => {
                Json::Array(a.iter().map(|s| Json::String(s.to_string())).collect())
            }
            Value::ObjectArray(a) => Json::Array(a.iter().map(Value::to_json).collect()),
            Value::List(l) => Json::Array(l.iter().map(Value::to_json).collect()),
            Value::Map(m) => Json::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn decimal_from_f64(n: f64) -> Option<BigDecimal> {
    if !n.is_finite() {
        return None;
    }
    // the shortest round-trip text keeps 0.1 as 0.1 rather than its
    // binary expansion
    BigDecimal::from_str(&format!("{n:?}")).ok()
}

pub(crate) fn decimal_to_f64(n: &BigDecimal) -> f64 {
    n.to_f64().unwrap_or(f64::NAN)
}

pub(crate) fn decimal_to_i64(n: &BigDecimal) -> i64 {
    match n.with_scale(0).to_i64() {
        Some(i) => i,
        None if *n < BigDecimal::zero() => i64::MIN,
        None => i64::MAX,
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<BigDecimal> for Value {
    fn from(n: BigDecimal) -> Self {
        Value::Decimal(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}

fn write_seq<T, F>(f: &mut fmt::Formatter, items: &[T], mut each: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter, &T) -> fmt::Result,
{
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        each(f, item)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n:?}"),
            Value::Decimal(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Value::BoolArray(a) => write_seq(f, a, |f, v| write!(f, "{v}")),
            Value::IntArray(a) => write_seq(f, a, |f, v| write!(f, "{v}")),
            Value::LongArray(a) => write_seq(f, a, |f, v| write!(f, "{v}")),
            Value::DoubleArray(a) => write_seq(f, a, |f, v| write!(f, "{v:?}")),
            Value::DecimalArray(a) => write_seq(f, a, |f, v| write!(f, "{v}")),
            Value::StringArray(a) => write_seq(f, a, |f, v| write!(f, "{v}")),
            Value::ObjectArray(a) => write_seq(f, a, |f, v| write!(f, "{v}")),
            Value::List(l) => write_seq(f, l, |f, v| write!(f, "{v}")),
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[test]
fn test_convert_numeric() {
    assert_eq!(Value::Double(2.0), Value::Long(2).convert_to(TypeCode::Double).unwrap());
    assert_eq!(Value::Long(-2), Value::Double(-2.7).convert_to(TypeCode::Long).unwrap());
    assert_eq!(Value::Int(2), Value::Long(2).convert_to(TypeCode::Int).unwrap());
    // int64 to int32 keeps the low 32 bits
    assert_eq!(
        Value::Int(1),
        Value::Long((1i64 << 32) + 1).convert_to(TypeCode::Int).unwrap()
    );
    assert_eq!(
        Value::Decimal(BigDecimal::from_str("0.1").unwrap()),
        Value::Double(0.1).convert_to(TypeCode::Decimal).unwrap()
    );
    assert_eq!(
        Value::Long(3),
        Value::Decimal(BigDecimal::from_str("3.99").unwrap())
            .convert_to(TypeCode::Long)
            .unwrap()
    );
    assert_eq!(
        Value::Double(1.5),
        Value::Decimal(BigDecimal::from_str("1.5").unwrap())
            .convert_to(TypeCode::Double)
            .unwrap()
    );
}

#[test]
fn test_convert_rejects_non_numeric() {
    let err = Value::from("abc").convert_to(TypeCode::Long).unwrap_err();
    assert_eq!(crate::common::ErrorCode::NoMatchingEvaluator, err.code);
    assert!(Value::Null.convert_to(TypeCode::Double).is_err());
    assert!(Value::Double(f64::NAN).convert_to(TypeCode::Decimal).is_err());
    // anything is accepted where a dynamic value is expected
    assert_eq!(Value::from("abc"), Value::from("abc").convert_to(TypeCode::Object).unwrap());
}

#[test]
fn test_generic_json() {
    let doc: serde_json::Value = serde_json::from_str(r#"[1, 2.5, "abc", {"k": null}]"#).unwrap();
    let value = Value::from_json(&doc);
    let expected = Value::from(vec![
        Value::Long(1),
        Value::Double(2.5),
        Value::from("abc"),
        Value::Map(Arc::new(
            [("k".to_owned(), Value::Null)].into_iter().collect(),
        )),
    ]);
    assert_eq!(expected, value);
    assert_eq!(doc, value.to_json());
}

#[test]
fn test_display() {
    assert_eq!("3.0", Value::Double(3.0).to_string());
    assert_eq!("[1, 2]", Value::LongArray(Arc::from(vec![1i64, 2])).to_string());
    assert_eq!("foo", Value::from("foo").to_string());
}
