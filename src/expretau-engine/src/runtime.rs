// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Compiled expression trees.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::evaluator::{Evaluator, EvaluatorFactory, EvaluatorKey};
use crate::registry::DynamicFunction;
use crate::value::Value;

/// The slot storage variables are read from and assigned to.
pub trait EvalContext {
    fn get(&self, slot: usize) -> Option<&Value>;
    fn set(&mut self, slot: usize, value: Value) -> Result<()>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An operator or built-in bound to the evaluator chosen at compile time.
#[derive(Clone)]
pub struct RtOp {
    factory: Arc<EvaluatorFactory>,
    evaluator: Evaluator,
    args: Vec<RtExpr>,
}

impl RtOp {
    pub(crate) fn new(
        factory: Arc<EvaluatorFactory>,
        evaluator: Evaluator,
        args: Vec<RtExpr>,
    ) -> Self {
        RtOp {
            factory,
            evaluator,
            args,
        }
    }

    pub fn name(&self) -> &str {
        self.factory.name()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn args(&self) -> &[RtExpr] {
        &self.args
    }
}

impl fmt::Debug for RtOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let key = match self.evaluator {
            Evaluator::Native(ref imp) => imp.params.to_string(),
            Evaluator::Induced { ref actual, .. } => actual.to_string(),
            Evaluator::Universal => "(*)".to_owned(),
        };
        f.debug_struct("RtOp")
            .field("name", &self.factory.name())
            .field("key", &key)
            .field("args", &self.args)
            .finish()
    }
}

/// A call of an embedder-registered function.
#[derive(Clone, Debug)]
pub struct RtFun {
    func: Arc<DynamicFunction>,
    args: Vec<RtExpr>,
}

impl RtFun {
    pub(crate) fn new(func: Arc<DynamicFunction>, args: Vec<RtExpr>) -> Self {
        RtFun { func, args }
    }

    pub fn args(&self) -> &[RtExpr] {
        &self.args
    }
}

#[derive(Clone, Debug)]
pub enum RtExpr {
    Const(Value),
    Var { slot: usize, type_code: TypeCode },
    Op(RtOp),
    And(Box<RtExpr>, Box<RtExpr>),
    Or(Box<RtExpr>, Box<RtExpr>),
    Fun(RtFun),
}

type Args = SmallVec<[Value; 4]>;

fn eval_args(args: &[RtExpr], etx: Option<&dyn EvalContext>) -> Result<Args> {
    args.iter().map(|arg| arg.eval(etx)).collect()
}

fn expect_bool(value: Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => eval_err!(ExpectedBoolean, format!("got {}", other.type_code())),
    }
}

impl RtExpr {
    /// eval computes the value of this tree, reading variables from `etx`.
    /// Trees without variables can be evaluated with no context.
    pub fn eval(&self, etx: Option<&dyn EvalContext>) -> Result<Value> {
        match self {
            RtExpr::Const(value) => Ok(value.clone()),
            RtExpr::Var { slot, .. } => {
                let Some(etx) = etx else {
                    return eval_err!(MissingContext, format!("reading slot {slot}"));
                };
                match etx.get(*slot) {
                    Some(value) => Ok(value.clone()),
                    None => eval_err!(IndexOutOfBounds, format!("slot {slot}")),
                }
            }
            RtExpr::Op(op) => {
                let args = eval_args(&op.args, etx)?;
                op.evaluator.eval(&op.factory, &args)
            }
            RtExpr::And(l, r) => {
                if !expect_bool(l.eval(etx)?)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(expect_bool(r.eval(etx)?)?))
            }
            RtExpr::Or(l, r) => {
                if expect_bool(l.eval(etx)?)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(expect_bool(r.eval(etx)?)?))
            }
            RtExpr::Fun(fun) => {
                let args = eval_args(&fun.args, etx)?;
                fun.func.call(&args)
            }
        }
    }

    /// type_code is the tag the result is known to carry before
    /// evaluation, OBJECT when only the runtime value can tell.
    pub fn type_code(&self) -> TypeCode {
        match self {
            RtExpr::Const(value) => value.type_code(),
            RtExpr::Var { type_code, .. } => *type_code,
            RtExpr::Op(op) => op.evaluator.type_code(),
            RtExpr::And(..) | RtExpr::Or(..) => TypeCode::Bool,
            RtExpr::Fun(fun) => fun.func.type_code(),
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, RtExpr::Const(_))
    }

    /// assign stores `value` into the slot a variable reads from.
    pub fn assign(&self, etx: &mut dyn EvalContext, value: Value) -> Result<()> {
        match self {
            RtExpr::Var { slot, .. } => etx.set(*slot, value),
            _ => eval_err!(NotAssignable, format!("{self}")),
        }
    }

    /// key is the static signature of the arguments of an operator node.
    pub(crate) fn key_of(args: &[RtExpr]) -> EvaluatorKey {
        let types: SmallVec<[TypeCode; 4]> = args.iter().map(RtExpr::type_code).collect();
        EvaluatorKey::new(&types)
    }
}

impl fmt::Display for RtExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn list(f: &mut fmt::Formatter, args: &[RtExpr]) -> fmt::Result {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            Ok(())
        }
        match self {
            RtExpr::Const(value) => write!(f, "{value}"),
            RtExpr::Var { slot, type_code } => write!(f, "${slot}:{type_code}"),
            RtExpr::Op(op) => {
                write!(f, "{}(", op.name())?;
                list(f, &op.args)?;
                write!(f, ")")
            }
            RtExpr::And(l, r) => write!(f, "({l} && {r})"),
            RtExpr::Or(l, r) => write!(f, "({l} || {r})"),
            RtExpr::Fun(fun) => {
                write!(f, "{}(", fun.func.name())?;
                list(f, &fun.args)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    struct Slots(Vec<Value>);

    impl EvalContext for Slots {
        fn get(&self, slot: usize) -> Option<&Value> {
            self.0.get(slot)
        }

        fn set(&mut self, slot: usize, value: Value) -> Result<()> {
            match self.0.get_mut(slot) {
                Some(v) => {
                    *v = value;
                    Ok(())
                }
                None => eval_err!(IndexOutOfBounds, format!("slot {slot}")),
            }
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn var(slot: usize) -> RtExpr {
        RtExpr::Var {
            slot,
            type_code: TypeCode::Bool,
        }
    }

    #[test]
    fn test_var_and_assign() {
        let mut slots = Slots(vec![Value::Null, Value::Long(7)]);
        let v = RtExpr::Var {
            slot: 1,
            type_code: TypeCode::Long,
        };
        assert_eq!(Value::Long(7), v.eval(Some(&slots)).unwrap());
        assert_eq!(
            ErrorCode::MissingContext,
            v.eval(None).unwrap_err().code
        );

        v.assign(&mut slots, Value::Long(9)).unwrap();
        assert_eq!(Value::Long(9), v.eval(Some(&slots)).unwrap());

        let c = RtExpr::Const(Value::Long(1));
        assert_eq!(
            ErrorCode::NotAssignable,
            c.assign(&mut slots, Value::Long(2)).unwrap_err().code
        );
    }

    #[test]
    fn test_short_circuit() {
        // slot 1 holds a non-boolean, so touching it fails
        let slots = Slots(vec![Value::Bool(false), Value::Long(1), Value::Bool(true)]);
        let and = RtExpr::And(Box::new(var(0)), Box::new(var(1)));
        assert_eq!(Value::Bool(false), and.eval(Some(&slots)).unwrap());
        let or = RtExpr::Or(Box::new(var(2)), Box::new(var(1)));
        assert_eq!(Value::Bool(true), or.eval(Some(&slots)).unwrap());

        let and = RtExpr::And(Box::new(var(2)), Box::new(var(1)));
        assert_eq!(
            ErrorCode::ExpectedBoolean,
            and.eval(Some(&slots)).unwrap_err().code
        );
        assert_eq!(TypeCode::Bool, and.type_code());
    }
}
