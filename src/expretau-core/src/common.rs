// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnrecognizedEof,
    UnrecognizedToken,
    ExtraToken,
    UnclosedString,
    BadEscape,
    ExpectedNumber,
    EmptyExpression,
    UnknownIdentifier,
    UnknownFunction,
    InvalidIndex,
    UnindexedStructure,
    NoMatchingEvaluator,
    DivisionByZero,
    IndexOutOfBounds,
    ExpectedBoolean,
    BadConversion,
    FailParseTime,
    BadRegex,
    MissingContext,
    NotAssignable,
    BadSchema,
    BadData,
    UnsupportedFormat,
    ExpressionTooDeep,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            UnrecognizedEof => "unrecognized_eof",
            UnrecognizedToken => "unrecognized_token",
            ExtraToken => "extra_token",
            UnclosedString => "unclosed_string",
            BadEscape => "bad_escape",
            ExpectedNumber => "expected_number",
            EmptyExpression => "empty_expression",
            UnknownIdentifier => "unknown_identifier",
            UnknownFunction => "unknown_function",
            InvalidIndex => "invalid_index",
            UnindexedStructure => "unindexed_structure",
            NoMatchingEvaluator => "no_matching_evaluator",
            DivisionByZero => "division_by_zero",
            IndexOutOfBounds => "index_out_of_bounds",
            ExpectedBoolean => "expected_boolean",
            BadConversion => "bad_conversion",
            FailParseTime => "fail_parse_time",
            BadRegex => "bad_regex",
            MissingContext => "missing_context",
            NotAssignable => "not_assignable",
            BadSchema => "bad_schema",
            BadData => "bad_data",
            UnsupportedFormat => "unsupported_format",
            ExpressionTooDeep => "expression_too_deep",
        };

        write!(f, "{name}")
    }
}

/// A syntax error located by byte offsets into the expression source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EquationError {
    pub start: u16,
    pub end: u16,
    pub code: ErrorCode,
}

impl EquationError {
    /// new builds an error from byte offsets.  Offsets past the range of
    /// a span saturate.
    pub fn new(start: usize, end: usize, code: ErrorCode) -> Self {
        EquationError {
            start: u16::try_from(start).unwrap_or(u16::MAX),
            end: u16::try_from(end).unwrap_or(u16::MAX),
            code,
        }
    }
}

impl fmt::Display for EquationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.end, self.code)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Compile,
    Eval,
    Schema,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl From<EquationError> for Error {
    fn from(err: EquationError) -> Self {
        Error {
            kind: ErrorKind::Parse,
            code: err.code,
            details: Some(format!("at {}..{}", err.start, err.end)),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Parse => "ParseError",
            ErrorKind::Compile => "CompileError",
            ErrorKind::Eval => "EvalError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Data => "DataError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
pub type EquationResult<T> = result::Result<T, EquationError>;

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Compile,
        ErrorCode::UnknownIdentifier,
        Some("foo".to_owned()),
    );
    assert_eq!("CompileError{unknown_identifier: foo}", err.to_string());

    let err = Error::new(ErrorKind::Eval, ErrorCode::DivisionByZero, None);
    assert_eq!("EvalError{division_by_zero}", err.to_string());
}

#[test]
fn test_equation_error_into_error() {
    let err: Error = EquationError {
        start: 3,
        end: 5,
        code: ErrorCode::UnrecognizedToken,
    }
    .into();
    assert_eq!(ErrorKind::Parse, err.kind);
    assert_eq!(ErrorCode::UnrecognizedToken, err.code);
    assert_eq!(Some("at 3..5".to_owned()), err.get_details());
}

#[test]
fn test_equation_error_saturates() {
    let err = EquationError::new(70_000, 70_004, ErrorCode::ExtraToken);
    assert_eq!(u16::MAX, err.start);
    assert_eq!(u16::MAX, err.end);
    assert_eq!(12, EquationError::new(12, 13, ErrorCode::ExtraToken).start);
}
