// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::Zero;

use super::{binary, try_binary, unary};
use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::registry::RegistryBuilder;

pub(crate) const INDUCE: &[TypeCode] = &[
    TypeCode::Decimal,
    TypeCode::Double,
    TypeCode::Long,
    TypeCode::Int,
];

/// decimal_div divides keeping the scale of the dividend, rounding half to
/// even.
pub(crate) fn decimal_div(a: &BigDecimal, b: &BigDecimal) -> Result<BigDecimal> {
    if b.is_zero() {
        return eval_err!(DivisionByZero, format!("{a} / {b}"));
    }
    let (_, scale) = a.as_bigint_and_exponent();
    Ok((a / b).with_scale_round(scale, RoundingMode::HalfEven))
}

fn int_div<T>(a: T, b: T, div: impl Fn(T, T) -> T) -> Result<T>
where
    T: Zero + Copy + std::fmt::Display,
{
    if b.is_zero() {
        return eval_err!(DivisionByZero, format!("{a} / {b}"));
    }
    Ok(div(a, b))
}

pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(INDUCE, &["pos", "neg", "add", "sub", "mul", "div", "abs"]);

    r.register_evaluator("pos", unary(|a: i32| a));
    r.register_evaluator("pos", unary(|a: i64| a));
    r.register_evaluator("pos", unary(|a: f64| a));
    r.register_evaluator("pos", unary(|a: BigDecimal| a));

    r.register_evaluator("neg", unary(|a: i32| a.wrapping_neg()));
    r.register_evaluator("neg", unary(|a: i64| a.wrapping_neg()));
    r.register_evaluator("neg", unary(|a: f64| -a));
    r.register_evaluator("neg", unary(|a: BigDecimal| -a));

    r.register_evaluator("add", binary(|a: i32, b: i32| a.wrapping_add(b)));
    r.register_evaluator("add", binary(|a: i64, b: i64| a.wrapping_add(b)));
    r.register_evaluator("add", binary(|a: f64, b: f64| a + b));
    r.register_evaluator("add", binary(|a: BigDecimal, b: BigDecimal| a + b));
    r.register_evaluator("add", binary(|a: Arc<str>, b: Arc<str>| format!("{a}{b}")));

    r.register_evaluator("sub", binary(|a: i32, b: i32| a.wrapping_sub(b)));
    r.register_evaluator("sub", binary(|a: i64, b: i64| a.wrapping_sub(b)));
    r.register_evaluator("sub", binary(|a: f64, b: f64| a - b));
    r.register_evaluator("sub", binary(|a: BigDecimal, b: BigDecimal| a - b));

    r.register_evaluator("mul", binary(|a: i32, b: i32| a.wrapping_mul(b)));
    r.register_evaluator("mul", binary(|a: i64, b: i64| a.wrapping_mul(b)));
    r.register_evaluator("mul", binary(|a: f64, b: f64| a * b));
    r.register_evaluator("mul", binary(|a: BigDecimal, b: BigDecimal| a * b));

    r.register_evaluator(
        "div",
        try_binary(|a: i32, b: i32| int_div(a, b, i32::wrapping_div)),
    );
    r.register_evaluator(
        "div",
        try_binary(|a: i64, b: i64| int_div(a, b, i64::wrapping_div)),
    );
    r.register_evaluator("div", binary(|a: f64, b: f64| a / b));
    r.register_evaluator(
        "div",
        try_binary(|a: BigDecimal, b: BigDecimal| decimal_div(&a, &b)),
    );

    r.register_evaluator("abs", unary(|a: i32| a.wrapping_abs()));
    r.register_evaluator("abs", unary(|a: i64| a.wrapping_abs()));
    r.register_evaluator("abs", unary(|a: f64| a.abs()));
    r.register_evaluator("abs", unary(|a: BigDecimal| a.abs()));
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::common::ErrorCode;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decimal_div_half_even() {
        assert_eq!(dec("1.2"), decimal_div(&dec("2.5"), &dec("2")).unwrap());
        assert_eq!(dec("1.4"), decimal_div(&dec("3.5"), &dec("2.5")).unwrap());
        assert_eq!(dec("0"), decimal_div(&dec("1"), &dec("3")).unwrap());
        assert_eq!(dec("2"), decimal_div(&dec("5"), &dec("2")).unwrap());
        assert_eq!(
            ErrorCode::DivisionByZero,
            decimal_div(&dec("1"), &dec("0.00")).unwrap_err().code
        );
    }

    #[test]
    fn test_int_div() {
        assert_eq!(Ok(-2), int_div(-7, 3, i32::wrapping_div));
        assert_eq!(Ok(i64::MIN), int_div(i64::MIN, -1, i64::wrapping_div));
        assert_eq!(
            ErrorCode::DivisionByZero,
            int_div(1i64, 0, i64::wrapping_div).unwrap_err().code
        );
    }
}
