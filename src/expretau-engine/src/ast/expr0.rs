// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::{BinaryOp, Loc, UnaryOp};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LiteralKind {
    Bool,
    Int,
    Real,
    Str,
}

/// Expr0 represents a parsed expression, before literal text has been
/// turned into values or calls checked against any registry.
#[derive(PartialEq, Clone, Debug)]
pub enum Expr0 {
    /// literal text exactly as written, string quotes included
    Const(LiteralKind, String, Loc),
    Var(String, Loc),
    App(String, Vec<Expr0>, Loc),
    Index(Box<Expr0>, Box<Expr0>, Loc),
    /// `base.name`
    Member(Box<Expr0>, String, Loc),
    Op1(UnaryOp, Box<Expr0>, Loc),
    Op2(BinaryOp, Box<Expr0>, Box<Expr0>, Loc),
}

impl Expr0 {
    pub fn get_loc(&self) -> Loc {
        match self {
            Expr0::Const(_, _, loc) => *loc,
            Expr0::Var(_, loc) => *loc,
            Expr0::App(_, _, loc) => *loc,
            Expr0::Index(_, _, loc) => *loc,
            Expr0::Member(_, _, loc) => *loc,
            Expr0::Op1(_, _, loc) => *loc,
            Expr0::Op2(_, _, _, loc) => *loc,
        }
    }

    /// height counts the nodes on the longest path down to a leaf.
    pub fn height(&self) -> usize {
        match self {
            Expr0::Const(..) | Expr0::Var(..) => 1,
            Expr0::App(_, args, _) => 1 + args.iter().map(Expr0::height).max().unwrap_or(0),
            Expr0::Index(base, index, _) => 1 + base.height().max(index.height()),
            Expr0::Member(base, _, _) => 1 + base.height(),
            Expr0::Op1(_, operand, _) => 1 + operand.height(),
            Expr0::Op2(_, l, r, _) => 1 + l.height().max(r.height()),
        }
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        let loc = Loc::default();
        match self {
            Expr0::Const(kind, s, _) => Expr0::Const(kind, s, loc),
            Expr0::Var(v, _) => Expr0::Var(v, loc),
            Expr0::App(func, args, _) => Expr0::App(
                func,
                args.into_iter().map(|arg| arg.strip_loc()).collect(),
                loc,
            ),
            Expr0::Index(base, index, _) => Expr0::Index(
                Box::new(base.strip_loc()),
                Box::new(index.strip_loc()),
                loc,
            ),
            Expr0::Member(base, name, _) => Expr0::Member(Box::new(base.strip_loc()), name, loc),
            Expr0::Op1(op, r, _) => Expr0::Op1(op, Box::new(r.strip_loc()), loc),
            Expr0::Op2(op, l, r, _) => Expr0::Op2(
                op,
                Box::new(l.strip_loc()),
                Box::new(r.strip_loc()),
                loc,
            ),
        }
    }
}
