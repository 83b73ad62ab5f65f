// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Lowering of the AST into runtime trees.
//!
//! Variables are bound to slots through a [`CompileContext`], operators
//! and functions to evaluators through a [`Registry`].  Subtrees whose
//! children are all constant are evaluated once here.

use std::sync::Arc;

use tracing::trace;

use crate::ast::{BinaryOp, Expr};
use crate::common::{Result, TypeCode};
use crate::compile_err;
use crate::registry::Registry;
use crate::runtime::{RtExpr, RtFun, RtOp};
use crate::value::Value;

/// The compile-time view of a record layout.  Structural nodes (tuples,
/// dicts) have no slot of their own and are navigated with `child` and
/// `element`; leaves answer their slot and tag.
pub trait CompileContext {
    fn slot(&self) -> Option<usize>;
    fn type_code(&self) -> TypeCode;
    fn child(&self, name: &str) -> Option<&dyn CompileContext>;
    fn element(&self, index: usize) -> Option<&dyn CompileContext>;
}

/// The result of lowering a subexpression.  A structural schema node is
/// only meaningful when it is indexed further, so it is carried as a stub
/// until then.
enum Lowered<'a> {
    Expr(RtExpr),
    Stub(&'a dyn CompileContext),
}

struct Compiler<'a> {
    ctx: Option<&'a dyn CompileContext>,
    registry: &'a Registry,
}

/// compile lowers `expr` against an optional compile context.  Without a
/// context only expressions free of variables compile.
pub fn compile(
    expr: &Expr,
    ctx: Option<&dyn CompileContext>,
    registry: &Registry,
) -> Result<RtExpr> {
    let compiler = Compiler { ctx, registry };
    compiler.expr(expr)
}

fn bind(node: &dyn CompileContext) -> Lowered<'_> {
    match node.slot() {
        Some(slot) => Lowered::Expr(RtExpr::Var {
            slot,
            type_code: node.type_code(),
        }),
        None => Lowered::Stub(node),
    }
}

/// fold evaluates an operator whose arguments are all constant.  A
/// failure is left in place to be reported by `eval`.
fn fold(rt: RtExpr, args_const: bool) -> RtExpr {
    if !args_const {
        return rt;
    }
    match rt.eval(None) {
        Ok(value) => RtExpr::Const(value),
        Err(err) => {
            trace!(expr = %rt, error = %err, "not folding");
            rt
        }
    }
}

impl<'a> Compiler<'a> {
    fn expr(&self, expr: &Expr) -> Result<RtExpr> {
        match self.lower(expr)? {
            Lowered::Expr(rt) => Ok(rt),
            Lowered::Stub(node) => compile_err!(
                UnindexedStructure,
                format!("'{}' is a {}", expr, node.type_code())
            ),
        }
    }

    fn exprs(&self, exprs: &[Expr]) -> Result<Vec<RtExpr>> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn lower(&self, expr: &Expr) -> Result<Lowered<'a>> {
        let rt = match expr {
            Expr::Const(value, _) => RtExpr::Const(value.clone()),
            Expr::Var(name, _) => return self.var(name),
            Expr::Index(base, index, _) => return self.index(base, index),
            Expr::Op1(op, arg, _) => {
                let args = vec![self.expr(arg)?];
                self.op(op.evaluator_name(), args)?
            }
            Expr::Op2(op, l, r, _) => {
                let l = self.expr(l)?;
                let r = self.expr(r)?;
                match op.evaluator_name() {
                    Some(name) => self.op(name, vec![l, r])?,
                    None => logical(*op, l, r),
                }
            }
            Expr::Fun(name, args, _) => {
                let args = self.exprs(args)?;
                self.call(name, args)?
            }
        };
        Ok(Lowered::Expr(rt))
    }

    fn var(&self, name: &str) -> Result<Lowered<'a>> {
        if let Some(value) = self.registry.constant(name) {
            return Ok(Lowered::Expr(RtExpr::Const(value.clone())));
        }
        let node = match self.ctx {
            Some(ctx) if name == "$" => Some(ctx),
            Some(ctx) => ctx.child(name),
            None => None,
        };
        match node {
            Some(node) => Ok(bind(node)),
            None => compile_err!(UnknownIdentifier, name.to_owned()),
        }
    }

    fn index(&self, base: &Expr, index: &Expr) -> Result<Lowered<'a>> {
        let base_rt = self.lower(base)?;
        let index_rt = self.expr(index)?;
        let node = match base_rt {
            Lowered::Stub(node) => node,
            Lowered::Expr(base_rt) => {
                return Ok(Lowered::Expr(self.op("index", vec![base_rt, index_rt])?));
            }
        };
        let found = match index_rt {
            RtExpr::Const(Value::Long(i)) => usize::try_from(i).ok().and_then(|i| node.element(i)),
            RtExpr::Const(Value::Int(i)) => usize::try_from(i).ok().and_then(|i| node.element(i)),
            RtExpr::Const(Value::String(ref name)) => node.child(name),
            _ => None,
        };
        match found {
            Some(node) => Ok(bind(node)),
            None => compile_err!(
                InvalidIndex,
                format!("{} of {}", index, node.type_code())
            ),
        }
    }

    fn op(&self, name: &str, args: Vec<RtExpr>) -> Result<RtExpr> {
        let Some(factory) = self.registry.factory(name) else {
            return compile_err!(UnknownFunction, name.to_owned());
        };
        let key = RtExpr::key_of(&args);
        let evaluator = factory.get_evaluator(&key)?;
        let args_const = args.iter().all(RtExpr::is_const);
        let rt = RtExpr::Op(RtOp::new(Arc::clone(factory), evaluator, args));
        Ok(fold(rt, args_const))
    }

    fn call(&self, name: &str, args: Vec<RtExpr>) -> Result<RtExpr> {
        if let Some(func) = self.registry.function(name) {
            let args_const = args.iter().all(RtExpr::is_const);
            let rt = RtExpr::Fun(RtFun::new(Arc::clone(func), args));
            return Ok(fold(rt, args_const));
        }
        self.op(name, args)
    }
}

/// logical builds a short-circuit node.  Operand types are only checked
/// as they are evaluated, since a guarded right operand may never run.
fn logical(op: BinaryOp, l: RtExpr, r: RtExpr) -> RtExpr {
    let args_const = l.is_const() && r.is_const();
    let rt = match op {
        BinaryOp::And => RtExpr::And(Box::new(l), Box::new(r)),
        _ => RtExpr::Or(Box::new(l), Box::new(r)),
    };
    fold(rt, args_const)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ErrorCode, ErrorKind};

    struct Leaf(usize, TypeCode);

    impl CompileContext for Leaf {
        fn slot(&self) -> Option<usize> {
            Some(self.0)
        }
        fn type_code(&self) -> TypeCode {
            self.1
        }
        fn child(&self, _name: &str) -> Option<&dyn CompileContext> {
            None
        }
        fn element(&self, _index: usize) -> Option<&dyn CompileContext> {
            None
        }
    }

    /// a two element tuple whose second element is a pair of fields
    struct Root {
        a: Leaf,
        pair: Pair,
    }

    struct Pair {
        x: Leaf,
        y: Leaf,
    }

    impl CompileContext for Root {
        fn slot(&self) -> Option<usize> {
            None
        }
        fn type_code(&self) -> TypeCode {
            TypeCode::Tuple
        }
        fn child(&self, _name: &str) -> Option<&dyn CompileContext> {
            None
        }
        fn element(&self, index: usize) -> Option<&dyn CompileContext> {
            match index {
                0 => Some(&self.a),
                1 => Some(&self.pair),
                _ => None,
            }
        }
    }

    impl CompileContext for Pair {
        fn slot(&self) -> Option<usize> {
            None
        }
        fn type_code(&self) -> TypeCode {
            TypeCode::Dict
        }
        fn child(&self, name: &str) -> Option<&dyn CompileContext> {
            match name {
                "x" => Some(&self.x),
                "y" => Some(&self.y),
                _ => None,
            }
        }
        fn element(&self, _index: usize) -> Option<&dyn CompileContext> {
            None
        }
    }

    fn root() -> Root {
        Root {
            a: Leaf(0, TypeCode::Long),
            pair: Pair {
                x: Leaf(1, TypeCode::Double),
                y: Leaf(2, TypeCode::String),
            },
        }
    }

    fn compile_with(src: &str, ctx: Option<&dyn CompileContext>) -> Result<RtExpr> {
        let expr = crate::parse(src).unwrap();
        compile(&expr, ctx, Registry::global())
    }

    #[test]
    fn test_folding() {
        let rt = compile_with("1 + 2 * 3", None).unwrap();
        assert!(matches!(rt, RtExpr::Const(Value::Long(7))));
        let rt = compile_with("PI > 3 and not false", None).unwrap();
        assert!(matches!(rt, RtExpr::Const(Value::Bool(true))));
        // the failure is deferred to eval
        let rt = compile_with("1 / 0", None).unwrap();
        assert!(matches!(rt, RtExpr::Op(_)));
        assert_eq!(ErrorCode::DivisionByZero, rt.eval(None).unwrap_err().code);
    }

    #[test]
    fn test_structural_index() {
        let root = root();
        let rt = compile_with("$[0] + $[1].x", Some(&root)).unwrap();
        assert_eq!(TypeCode::Double, rt.type_code());
        let rt = compile_with("$[1]['y']", Some(&root)).unwrap();
        assert!(matches!(rt, RtExpr::Var { slot: 2, type_code: TypeCode::String }));

        let err = compile_with("$[1]", Some(&root)).unwrap_err();
        assert_eq!(ErrorCode::UnindexedStructure, err.code);
        let err = compile_with("$[2]", Some(&root)).unwrap_err();
        assert_eq!(ErrorCode::InvalidIndex, err.code);
        let err = compile_with("$[1][$[0]]", Some(&root)).unwrap_err();
        assert_eq!(ErrorCode::InvalidIndex, err.code);
        let err = compile_with("$[0.5]", Some(&root)).unwrap_err();
        assert_eq!(ErrorCode::InvalidIndex, err.code);
    }

    #[test]
    fn test_identifiers() {
        let leaf = Leaf(0, TypeCode::Long);
        let rt = compile_with("$ * 2", Some(&leaf)).unwrap();
        assert_eq!(TypeCode::Long, rt.type_code());

        let err = compile_with("a", None).unwrap_err();
        assert_eq!(ErrorCode::UnknownIdentifier, err.code);
        assert_eq!(ErrorKind::Compile, err.kind);
        let err = compile_with("nosuch(1)", None).unwrap_err();
        assert_eq!(ErrorCode::UnknownFunction, err.code);
    }

    #[test]
    fn test_logical_operands() {
        let leaf = Leaf(0, TypeCode::Long);
        // the right operand is never evaluated
        let rt = compile_with("false and $ / 0", Some(&leaf)).unwrap();
        assert!(matches!(rt, RtExpr::And(..)));
        assert_eq!(TypeCode::Bool, rt.type_code());

        let rt = compile_with("1 and true", None).unwrap();
        assert_eq!(ErrorCode::ExpectedBoolean, rt.eval(None).unwrap_err().code);
    }
}
