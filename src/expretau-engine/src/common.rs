// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

pub use expretau_core::common::{
    EquationError, EquationResult, Error, ErrorCode, ErrorKind, Result,
};
pub use expretau_core::types::TypeCode;

#[macro_export]
macro_rules! eqn_err(
    ($code:tt, $start:expr, $end:expr) => {{
        use $crate::common::{EquationError, ErrorCode};
        Err(EquationError::new($start, $end, ErrorCode::$code))
    }}
);

#[macro_export]
macro_rules! compile_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Compile, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Compile, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! eval_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Eval, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Eval, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! schema_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Schema, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! data_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Data, ErrorCode::$code, Some($str)))
    }};
}

#[test]
fn test_err_macros() {
    let r: Result<()> = compile_err!(UnknownIdentifier, "x".to_owned());
    let err = r.unwrap_err();
    assert_eq!(ErrorKind::Compile, err.kind);
    assert_eq!(ErrorCode::UnknownIdentifier, err.code);

    let r: Result<()> = eval_err!(DivisionByZero);
    assert_eq!(ErrorKind::Eval, r.unwrap_err().kind);

    let r: EquationResult<()> = eqn_err!(ExtraToken, 1, 2);
    assert_eq!(
        EquationError {
            start: 1,
            end: 2,
            code: ErrorCode::ExtraToken
        },
        r.unwrap_err()
    );
}
