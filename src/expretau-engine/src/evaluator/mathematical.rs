// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::unary;
use crate::common::TypeCode;
use crate::registry::RegistryBuilder;

// only double implementations exist, so everything else converts to double
const INDUCE: &[TypeCode] = &[
    TypeCode::Double,
    TypeCode::Decimal,
    TypeCode::Long,
    TypeCode::Int,
];

const FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("log", f64::ln),
    ("exp", f64::exp),
];

pub(crate) fn register(r: &mut RegistryBuilder) {
    let names: Vec<&str> = FUNCTIONS.iter().map(|(name, _)| *name).collect();
    r.register_family(INDUCE, &names);
    for &(name, f) in FUNCTIONS {
        r.register_evaluator(name, unary(move |x: f64| f(x)));
    }
}
