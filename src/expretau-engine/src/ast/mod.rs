// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

pub mod expr;
pub mod expr0;

pub use expr::Expr;
pub use expr0::{Expr0, LiteralKind};

use crate::value::Value;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Loc {
    pub start: u16,
    pub end: u16,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl Loc {
    /// new builds a span from byte offsets.  Offsets past `u16::MAX`
    /// saturate.
    pub fn new(start: usize, end: usize) -> Self {
        Loc {
            start: u16::try_from(start).unwrap_or(u16::MAX),
            end: u16::try_from(end).unwrap_or(u16::MAX),
        }
    }

    /// union takes a second Loc and returns the inclusive range from the
    /// start of the earlier token to the end of the later token.
    pub fn union(&self, rhs: &Self) -> Self {
        Loc {
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum UnaryOp {
    Positive,
    Negative,
    Not,
}

impl UnaryOp {
    /// the dispatch table implementing this operator
    pub fn evaluator_name(self) -> &'static str {
        match self {
            UnaryOp::Positive => "pos",
            UnaryOp::Negative => "neg",
            UnaryOp::Not => "not",
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Lte,
    Eq,
    Neq,
    Gt,
    Gte,
    StartsWith,
    EndsWith,
    Contains,
    Matches,
    And,
    Or,
}

impl BinaryOp {
    // higher the precedence, the tighter the binding.
    // e.g. Mul.precedence() > Add.precedence()
    pub(crate) fn precedence(&self) -> u8 {
        // matches the parser's descent order
        match self {
            BinaryOp::Mul | BinaryOp::Div => 5,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Lt
            | BinaryOp::Lte
            | BinaryOp::Eq
            | BinaryOp::Neq
            | BinaryOp::Gt
            | BinaryOp::Gte
            | BinaryOp::StartsWith
            | BinaryOp::EndsWith
            | BinaryOp::Contains
            | BinaryOp::Matches => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }

    /// The dispatch table implementing this operator.  AND and OR
    /// short-circuit and so have none.
    pub fn evaluator_name(self) -> Option<&'static str> {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Lt => "lt",
            BinaryOp::Lte => "le",
            BinaryOp::Eq => "eq",
            BinaryOp::Neq => "ne",
            BinaryOp::Gt => "gt",
            BinaryOp::Gte => "ge",
            BinaryOp::StartsWith => "startsWith",
            BinaryOp::EndsWith => "endsWith",
            BinaryOp::Contains => "contains",
            BinaryOp::Matches => "matches",
            BinaryOp::And | BinaryOp::Or => return None,
        };
        Some(name)
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::StartsWith => "startsWith",
            BinaryOp::EndsWith => "endsWith",
            BinaryOp::Contains => "contains",
            BinaryOp::Matches => "matches",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

fn child_needs_parens(parent: &Expr, child: &Expr) -> bool {
    match parent {
        // no children so doesn't matter
        Expr::Const(_, _) | Expr::Var(_, _) => false,
        // children are comma separated or bracketed, so no ambiguity possible
        Expr::Fun(_, _, _) => false,
        Expr::Index(_, _, _) => matches!(child, Expr::Op1(..) | Expr::Op2(..)),
        Expr::Op1(op, _, _) => match child {
            Expr::Op2(_, _, _, _) => true,
            Expr::Op1(UnaryOp::Not, _, _) => *op != UnaryOp::Not,
            _ => false,
        },
        Expr::Op2(parent_op, _, _, _) => match child {
            Expr::Op2(child_op, _, _, _) => {
                // `3 * (2 + 3)` needs enclosing parens, and so does a
                // relational chain since those don't associate
                parent_op.precedence() > child_op.precedence()
                    || (parent_op.precedence() == 3 && child_op.precedence() == 3)
            }
            // `not` binds looser than the relational operators
            Expr::Op1(UnaryOp::Not, _, _) => parent_op.precedence() >= 3,
            _ => false,
        },
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// print_expr renders an AST back into source text that parses to the
/// same tree.
pub fn print_expr(expr: &Expr) -> String {
    let paren = |child: &Expr| {
        let s = print_expr(child);
        if child_needs_parens(expr, child) {
            format!("({s})")
        } else {
            s
        }
    };
    match expr {
        Expr::Const(Value::String(s), _) => quote(s),
        Expr::Const(Value::Double(n), _) => format!("{n:?}"),
        Expr::Const(value, _) => value.to_string(),
        Expr::Var(id, _) => id.clone(),
        Expr::Fun(func, args, _) => {
            let args: Vec<String> = args.iter().map(print_expr).collect();
            format!("{}({})", func, args.join(", "))
        }
        Expr::Index(base, index, _) => format!("{}[{}]", paren(base), print_expr(index)),
        Expr::Op1(op, l, _) => {
            let l = paren(l);
            match op {
                UnaryOp::Positive => format!("+{l}"),
                UnaryOp::Negative => format!("-{l}"),
                UnaryOp::Not => format!("!{l}"),
            }
        }
        Expr::Op2(op, l, r, _) => {
            let l = paren(l);
            let r = match r.as_ref() {
                // left-associative: `a - (b - c)` keeps its parens
                Expr::Op2(child_op, _, _, _) if child_op.precedence() == op.precedence() => {
                    format!("({})", print_expr(r))
                }
                _ => paren(r),
            };
            format!("{} {} {}", l, op.symbol(), r)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", print_expr(self))
    }
}

#[test]
fn test_loc_basics() {
    let a = Loc { start: 3, end: 7 };
    assert_eq!(a, Loc::new(3, 7));

    let b = Loc { start: 4, end: 11 };
    assert_eq!(Loc::new(3, 11), a.union(&b));

    let c = Loc { start: 1, end: 5 };
    assert_eq!(Loc::new(1, 7), a.union(&c));
}

#[test]
fn test_print_expr() {
    let cases = [
        ("1 + 2 * 3", "1 + 2 * 3"),
        ("(1 + 2) * 3", "(1 + 2) * 3"),
        ("1 - (2 - 3)", "1 - (2 - 3)"),
        ("-(a + 1)", "-(a + 1)"),
        ("not a and b", "!a && b"),
        ("(not a) < b", "(!a) < b"),
        ("a[0] + m.k", "a[0] + m['k']"),
        ("f(1, 'x\\'y')", "f(1, 'x\\'y')"),
        ("2.5 / 4.0", "2.5 / 4.0"),
    ];
    for (input, expected) in cases.iter() {
        let expr = crate::parse(input).unwrap();
        let printed = print_expr(&expr);
        assert_eq!(*expected, printed.as_str(), "printing {input}");
        let reparsed = crate::parse(&printed).unwrap();
        assert_eq!(expr.strip_loc(), reparsed.strip_loc());
    }
}
