// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use super::binary;
use super::arithmetic::INDUCE;
use crate::registry::RegistryBuilder;

macro_rules! compare {
    ($r:expr, $name:expr, $op:tt, [$($ty:ty),*]) => {
        $( $r.register_evaluator($name, binary(|a: $ty, b: $ty| a $op b)); )*
    };
}

pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(INDUCE, &["lt", "le", "gt", "ge", "eq", "ne"]);

    compare!(r, "lt", <, [i32, i64, f64, BigDecimal, Arc<str>, NaiveDateTime]);
    compare!(r, "le", <=, [i32, i64, f64, BigDecimal, Arc<str>, NaiveDateTime]);
    compare!(r, "gt", >, [i32, i64, f64, BigDecimal, Arc<str>, NaiveDateTime]);
    compare!(r, "ge", >=, [i32, i64, f64, BigDecimal, Arc<str>, NaiveDateTime]);
    compare!(r, "eq", ==, [bool, i32, i64, f64, BigDecimal, Arc<str>, NaiveDateTime]);
    compare!(r, "ne", !=, [bool, i32, i64, f64, BigDecimal, Arc<str>, NaiveDateTime]);
}
