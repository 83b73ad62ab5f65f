// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Typed dispatch tables.
//!
//! Every operator and built-in function is backed by an
//! [`EvaluatorFactory`]: a table from a parameter signature
//! ([`EvaluatorKey`]) to an [`Evaluator`].  Tables are filled in two
//! passes by [`FactoryBuilder`]: concrete implementations first, then
//! induced entries that widen narrower argument types onto the
//! implementations that exist.  Anything still unmatched at compile time
//! resolves to the universal evaluator, which redoes the lookup once the
//! runtime types of the arguments are known.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::common::{Result, TypeCode};
use crate::value::Value;
use crate::{compile_err, eval_err};

pub(crate) mod arithmetic;
pub(crate) mod conversion;
mod induce;
pub(crate) mod index;
pub(crate) mod logical;
pub(crate) mod mathematical;
mod native;
pub(crate) mod relational;
pub(crate) mod string;
pub(crate) mod time;

pub use self::induce::FactoryBuilder;
pub use self::native::{
    FromValue, IntoValue, Native, binary, nullary, ternary, try_binary, try_nullary, try_ternary,
    try_unary, unary,
};

pub type EvalFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// The ordered parameter tags of an evaluator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct EvaluatorKey(SmallVec<[TypeCode; 4]>);

impl EvaluatorKey {
    pub fn new(types: &[TypeCode]) -> Self {
        EvaluatorKey(SmallVec::from_slice(types))
    }

    /// of_values builds the key matching the runtime tags of `args`.
    pub fn of_values(args: &[Value]) -> Self {
        EvaluatorKey(args.iter().map(Value::type_code).collect())
    }

    pub fn types(&self) -> &[TypeCode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EvaluatorKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}")?;
        }
        write!(f, ")")
    }
}

/// A concrete implementation: the declared parameter tags, the result tag
/// and the function computing it.  Arguments handed to `func` always carry
/// exactly the declared tags.
pub struct Implementation {
    pub params: EvaluatorKey,
    pub ret: TypeCode,
    pub func: EvalFn,
}

impl Implementation {
    /// dynamic wraps a function working on raw values.  Use this when the
    /// typed helpers in this module can't express the signature.
    pub fn dynamic<F>(params: &[TypeCode], ret: TypeCode, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Implementation {
            params: EvaluatorKey::new(params),
            ret,
            func: Arc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Implementation{} -> {}", self.params, self.ret)
    }
}

#[derive(Clone, Debug)]
pub enum Evaluator {
    Native(Arc<Implementation>),
    /// Accepts `actual` by converting each argument to the declared
    /// parameter tags of `target`.
    Induced {
        target: Arc<Implementation>,
        actual: EvaluatorKey,
    },
    /// Picks an evaluator from the runtime tags of the arguments.
    Universal,
}

impl Evaluator {
    /// type_code is the static result tag.  The universal evaluator can
    /// return anything.
    pub fn type_code(&self) -> TypeCode {
        match self {
            Evaluator::Native(imp) => imp.ret,
            Evaluator::Induced { target, .. } => target.ret,
            Evaluator::Universal => TypeCode::Object,
        }
    }

    pub fn is_universal(&self) -> bool {
        matches!(self, Evaluator::Universal)
    }

    pub fn eval(&self, factory: &EvaluatorFactory, args: &[Value]) -> Result<Value> {
        match self {
            Evaluator::Native(imp) => imp.call(args),
            Evaluator::Induced { target, .. } => {
                let converted = args
                    .iter()
                    .zip(target.params.types())
                    .map(|(arg, want)| arg.convert_to(*want))
                    .collect::<Result<SmallVec<[Value; 4]>>>()?;
                target.call(&converted)
            }
            Evaluator::Universal => {
                let key = EvaluatorKey::of_values(args);
                match factory.lookup(&key) {
                    Some(evaluator) => evaluator.eval(factory, args),
                    None => eval_err!(NoMatchingEvaluator, format!("{}{}", factory.name(), key)),
                }
            }
        }
    }
}

/// EvaluatorFactory is the dispatch table for one operator or function
/// name.  It is immutable once built.
pub struct EvaluatorFactory {
    name: String,
    induce: Vec<TypeCode>,
    table: HashMap<EvaluatorKey, Evaluator>,
    universal: bool,
}

impl EvaluatorFactory {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// lookup finds the evaluator registered or induced for exactly `key`.
    pub fn lookup(&self, key: &EvaluatorKey) -> Option<&Evaluator> {
        self.table.get(key)
    }

    /// get_evaluator resolves `key` at compile time, falling back to the
    /// universal evaluator when no entry matches.
    pub fn get_evaluator(&self, key: &EvaluatorKey) -> Result<Evaluator> {
        match self.lookup(key) {
            Some(evaluator) => Ok(evaluator.clone()),
            None if self.universal => Ok(Evaluator::Universal),
            None => compile_err!(NoMatchingEvaluator, format!("{}{}", self.name, key)),
        }
    }

    /// induce is the widening sequence the table was built from, widest
    /// first.
    pub fn induce(&self) -> &[TypeCode] {
        &self.induce
    }

    pub fn keys(&self) -> impl Iterator<Item = &EvaluatorKey> {
        self.table.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&EvaluatorKey, &Evaluator)> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for EvaluatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EvaluatorFactory")
            .field("name", &self.name)
            .field("entries", &self.table.len())
            .field("universal", &self.universal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    fn add_factory(universal: bool) -> EvaluatorFactory {
        let mut builder = FactoryBuilder::new("add", &[TypeCode::Double, TypeCode::Long]);
        builder
            .add(binary(|a: i64, b: i64| a + b))
            .add(binary(|a: f64, b: f64| a + b));
        if !universal {
            builder.without_universal();
        }
        builder.build()
    }

    #[test]
    fn test_key_display() {
        let key = EvaluatorKey::new(&[TypeCode::Long, TypeCode::Double]);
        assert_eq!("(LONG, DOUBLE)", key.to_string());
        assert_eq!("()", EvaluatorKey::default().to_string());
        assert_eq!(
            key,
            EvaluatorKey::of_values(&[Value::Long(1), Value::Double(2.0)])
        );
    }

    #[test]
    fn test_native_and_induced() {
        let factory = add_factory(true);
        let native = factory
            .get_evaluator(&EvaluatorKey::new(&[TypeCode::Long, TypeCode::Long]))
            .unwrap();
        assert!(matches!(native, Evaluator::Native(_)));
        assert_eq!(TypeCode::Long, native.type_code());

        let induced = factory
            .get_evaluator(&EvaluatorKey::new(&[TypeCode::Long, TypeCode::Double]))
            .unwrap();
        assert!(matches!(induced, Evaluator::Induced { .. }));
        assert_eq!(TypeCode::Double, induced.type_code());
        assert_eq!(
            Value::Double(3.5),
            induced
                .eval(&factory, &[Value::Long(1), Value::Double(2.5)])
                .unwrap()
        );
    }

    #[test]
    fn test_universal() {
        let factory = add_factory(true);
        let key = EvaluatorKey::new(&[TypeCode::Object, TypeCode::Long]);
        let universal = factory.get_evaluator(&key).unwrap();
        assert!(universal.is_universal());
        assert_eq!(TypeCode::Object, universal.type_code());
        assert_eq!(
            Value::Long(3),
            universal
                .eval(&factory, &[Value::Long(1), Value::Long(2)])
                .unwrap()
        );
        let err = universal
            .eval(&factory, &[Value::from("a"), Value::Long(2)])
            .unwrap_err();
        assert_eq!(ErrorCode::NoMatchingEvaluator, err.code);
        assert_eq!(crate::common::ErrorKind::Eval, err.kind);
    }

    #[test]
    fn test_without_universal() {
        let factory = add_factory(false);
        let err = factory
            .get_evaluator(&EvaluatorKey::new(&[TypeCode::String, TypeCode::Long]))
            .unwrap_err();
        assert_eq!(ErrorCode::NoMatchingEvaluator, err.code);
        assert_eq!(crate::common::ErrorKind::Compile, err.kind);
    }
}
