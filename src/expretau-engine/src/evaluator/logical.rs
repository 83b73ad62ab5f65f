// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::unary;
use crate::registry::RegistryBuilder;

// `and` and `or` short-circuit, so they are compiled to dedicated nodes
// rather than dispatched here.
pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(&[], &["not"]);
    r.register_evaluator("not", unary(|a: bool| !a));
}
