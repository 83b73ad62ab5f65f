// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The catalogue of operators, functions and named constants that
//! expressions are compiled against.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::debug;

use crate::common::{Result, TypeCode};
use crate::evaluator::{self, EvaluatorFactory, FactoryBuilder, Implementation};
use crate::value::Value;

pub type FunFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A function registered by the embedder.  Its arguments are passed as
/// evaluated, without any dispatch on their types.
pub struct DynamicFunction {
    name: String,
    ret: TypeCode,
    func: FunFn,
}

impl DynamicFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_code(&self) -> TypeCode {
        self.ret
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for DynamicFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DynamicFunction({} -> {})", self.name, self.ret)
    }
}

#[derive(Debug)]
pub struct Registry {
    factories: HashMap<String, Arc<EvaluatorFactory>>,
    functions: HashMap<String, Arc<DynamicFunction>>,
    constants: HashMap<String, Value>,
}

lazy_static! {
    static ref GLOBAL: Registry = RegistryBuilder::with_builtins().build();
}

impl Registry {
    /// global is the shared registry holding only the built-in operators,
    /// functions and constants.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn factory(&self, name: &str) -> Option<&Arc<EvaluatorFactory>> {
        self.factories.get(name)
    }

    /// factories lists every dispatch table by name, in no particular order.
    pub fn factories(&self) -> impl Iterator<Item = (&str, &Arc<EvaluatorFactory>)> {
        self.factories.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn function(&self, name: &str) -> Option<&Arc<DynamicFunction>> {
        self.functions.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }
}

/// RegistryBuilder assembles a [`Registry`].  Registration happens up
/// front; the built registry is immutable and can be shared across
/// threads.
#[derive(Default)]
pub struct RegistryBuilder {
    factories: HashMap<String, FactoryBuilder>,
    functions: HashMap<String, Arc<DynamicFunction>>,
    constants: HashMap<String, Value>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// with_builtins starts from every built-in operator, function and
    /// constant.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        evaluator::arithmetic::register(&mut r);
        evaluator::relational::register(&mut r);
        evaluator::logical::register(&mut r);
        evaluator::mathematical::register(&mut r);
        evaluator::string::register(&mut r);
        evaluator::index::register(&mut r);
        evaluator::conversion::register(&mut r);
        evaluator::time::register(&mut r);

        r.register_constant("E", Value::Double(std::f64::consts::E));
        r.register_constant("PI", Value::Double(std::f64::consts::PI));
        r.register_constant("TAU", Value::Double(std::f64::consts::TAU));
        r
    }

    fn factory_mut(&mut self, name: &str) -> &mut FactoryBuilder {
        self.factories
            .entry(name.to_owned())
            .or_insert_with(|| FactoryBuilder::new(name, &[]))
    }

    /// register_family declares that each named table widens arguments
    /// along `induce`.
    pub fn register_family(&mut self, induce: &[TypeCode], names: &[&str]) -> &mut Self {
        for name in names {
            self.factory_mut(name).set_induce(induce);
        }
        self
    }

    /// register_evaluator adds a typed implementation to the table for
    /// `name`, creating the table if needed.
    pub fn register_evaluator(&mut self, name: &str, imp: Implementation) -> &mut Self {
        self.factory_mut(name).add(imp);
        self
    }

    /// register_function adds a function taking any arguments.  It shadows
    /// a built-in of the same name.
    pub fn register_function<F>(&mut self, name: &str, ret: TypeCode, func: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let function = DynamicFunction {
            name: name.to_owned(),
            ret,
            func: Arc::new(func),
        };
        self.functions.insert(name.to_owned(), Arc::new(function));
        self
    }

    pub fn register_constant(&mut self, name: &str, value: Value) -> &mut Self {
        self.constants.insert(name.to_owned(), value);
        self
    }

    pub fn build(&self) -> Registry {
        let factories: HashMap<String, Arc<EvaluatorFactory>> = self
            .factories
            .iter()
            .map(|(name, builder)| (name.clone(), Arc::new(builder.build())))
            .collect();
        debug!(
            factories = factories.len(),
            functions = self.functions.len(),
            constants = self.constants.len(),
            "built registry"
        );
        Registry {
            factories,
            functions: self.functions.clone(),
            constants: self.constants.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{EvaluatorKey, binary};

    #[test]
    fn test_builtins() {
        let registry = Registry::global();
        for name in [
            "pos", "neg", "add", "sub", "mul", "div", "abs", "lt", "le", "gt", "ge", "eq", "ne",
            "not", "sin", "log", "exp", "substring", "matches", "replace", "index", "int",
            "string", "time",
        ] {
            assert!(registry.factory(name).is_some(), "missing {name}");
        }
        assert!(registry.factory("and").is_none());
        assert_eq!(
            Some(&Value::Double(std::f64::consts::PI)),
            registry.constant("PI")
        );

        let add = registry.factory("add").unwrap();
        let key = EvaluatorKey::new(&[TypeCode::Int, TypeCode::Decimal]);
        assert_eq!(
            TypeCode::Decimal,
            add.get_evaluator(&key).unwrap().type_code()
        );
        // nullary time() is a real entry, not the universal fallback
        let time = registry.factory("time").unwrap();
        assert!(!time.get_evaluator(&EvaluatorKey::default()).unwrap().is_universal());
    }

    #[test]
    fn test_user_registrations() {
        let mut builder = RegistryBuilder::with_builtins();
        builder
            .register_evaluator("add", binary(|a: bool, b: bool| a || b))
            .register_function("hello", TypeCode::String, |args| {
                Ok(Value::from(format!("Hello {}", args[0])))
            })
            .register_constant("ANSWER", Value::Long(42));
        let registry = builder.build();

        let add = registry.factory("add").unwrap();
        let key = EvaluatorKey::new(&[TypeCode::Bool, TypeCode::Bool]);
        assert!(!add.get_evaluator(&key).unwrap().is_universal());
        assert_eq!(
            TypeCode::String,
            registry.function("hello").unwrap().type_code()
        );
        assert_eq!(Some(&Value::Long(42)), registry.constant("ANSWER"));
        // the shared registry is untouched
        assert!(Registry::global().function("hello").is_none());
    }
}
