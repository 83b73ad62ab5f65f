// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod common;
pub mod types;

pub use self::common::{EquationError, EquationResult, Error, ErrorCode, ErrorKind, Result};
pub use self::types::TypeCode;
