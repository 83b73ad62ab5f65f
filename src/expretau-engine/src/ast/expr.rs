// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use super::{BinaryOp, Expr0, LiteralKind, Loc, UnaryOp};
use crate::common::{EquationError, EquationResult, ErrorCode, Result};
use crate::compiler::{self, CompileContext};
use crate::registry::Registry;
use crate::runtime::RtExpr;
use crate::value::Value;

/// Expr is the expression AST: literals carry values, member access has
/// been desugared to indexing.  It is immutable and can be compiled any
/// number of times against different schemas.
#[derive(PartialEq, Clone, Debug)]
pub enum Expr {
    Const(Value, Loc),
    Var(String, Loc),
    Fun(String, Vec<Expr>, Loc),
    Index(Box<Expr>, Box<Expr>, Loc),
    Op1(UnaryOp, Box<Expr>, Loc),
    Op2(BinaryOp, Box<Expr>, Box<Expr>, Loc),
}

impl Expr {
    pub fn from(expr: Expr0) -> EquationResult<Self> {
        let expr = match expr {
            Expr0::Const(kind, text, loc) => Expr::Const(literal(kind, &text, loc)?, loc),
            Expr0::Var(id, loc) => Expr::Var(id, loc),
            Expr0::App(func, args, loc) => {
                let args: EquationResult<Vec<Expr>> = args.into_iter().map(Expr::from).collect();
                Expr::Fun(func, args?, loc)
            }
            Expr0::Index(base, index, loc) => Expr::Index(
                Box::new(Expr::from(*base)?),
                Box::new(Expr::from(*index)?),
                loc,
            ),
            Expr0::Member(base, name, loc) => {
                // the member name ends the span
                let end = usize::from(loc.end);
                let name_loc = Loc::new(end.saturating_sub(name.len()), end);
                Expr::Index(
                    Box::new(Expr::from(*base)?),
                    Box::new(Expr::Const(Value::from(name), name_loc)),
                    loc,
                )
            }
            Expr0::Op1(op, r, loc) => Expr::Op1(op, Box::new(Expr::from(*r)?), loc),
            Expr0::Op2(op, l, r, loc) => Expr::Op2(
                op,
                Box::new(Expr::from(*l)?),
                Box::new(Expr::from(*r)?),
                loc,
            ),
        };
        Ok(expr)
    }

    pub fn get_loc(&self) -> Loc {
        match self {
            Expr::Const(_, loc) => *loc,
            Expr::Var(_, loc) => *loc,
            Expr::Fun(_, _, loc) => *loc,
            Expr::Index(_, _, loc) => *loc,
            Expr::Op1(_, _, loc) => *loc,
            Expr::Op2(_, _, _, loc) => *loc,
        }
    }

    /// compile lowers this AST into a runtime tree, binding variables
    /// through `ctx` and operators through `registry`.
    pub fn compile(&self, ctx: Option<&dyn CompileContext>, registry: &Registry) -> Result<RtExpr> {
        compiler::compile(self, ctx, registry)
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        let loc = Loc::default();
        match self {
            Expr::Const(v, _) => Expr::Const(v, loc),
            Expr::Var(v, _) => Expr::Var(v, loc),
            Expr::Fun(func, args, _) => Expr::Fun(
                func,
                args.into_iter().map(|arg| arg.strip_loc()).collect(),
                loc,
            ),
            Expr::Index(base, index, _) => Expr::Index(
                Box::new(base.strip_loc()),
                Box::new(index.strip_loc()),
                loc,
            ),
            Expr::Op1(op, r, _) => Expr::Op1(op, Box::new(r.strip_loc()), loc),
            Expr::Op2(op, l, r, _) => Expr::Op2(
                op,
                Box::new(l.strip_loc()),
                Box::new(r.strip_loc()),
                loc,
            ),
        }
    }
}

fn literal(kind: LiteralKind, text: &str, loc: Loc) -> EquationResult<Value> {
    let err = |code| EquationError {
        start: loc.start,
        end: loc.end,
        code,
    };
    match kind {
        LiteralKind::Bool => Ok(Value::Bool(text == "true")),
        LiteralKind::Int => match text.parse::<i64>() {
            Ok(n) => Ok(Value::Long(n)),
            // too wide for int64, keep every digit
            Err(_) => BigDecimal::from_str(text)
                .map(Value::Decimal)
                .map_err(|_| err(ErrorCode::ExpectedNumber)),
        },
        LiteralKind::Real => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| err(ErrorCode::ExpectedNumber)),
        LiteralKind::Str => {
            // strip the quotes the lexer kept
            let body = &text[1..text.len() - 1];
            unescape(body)
                .map(Value::from)
                .ok_or_else(|| err(ErrorCode::BadEscape))
        }
    }
}

/// unescape resolves JSON-style escapes, plus `\'` for single-quoted
/// strings.
pub(crate) fn unescape(body: &str) -> Option<String> {
    fn flush(units: &mut Vec<u16>, out: &mut String) -> Option<()> {
        for c in char::decode_utf16(units.drain(..)) {
            out.push(c.ok()?);
        }
        Some(())
    }

    let mut out = String::with_capacity(body.len());
    // \u escapes may encode surrogate pairs, so decode them in runs
    let mut units: Vec<u16> = Vec::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            flush(&mut units, &mut out)?;
            out.push(c);
            continue;
        }
        let escaped = chars.next()?;
        if escaped == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            if hex.len() != 4 {
                return None;
            }
            units.push(u16::from_str_radix(&hex, 16).ok()?);
            continue;
        }
        flush(&mut units, &mut out)?;
        out.push(match escaped {
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            _ => return None,
        });
    }
    flush(&mut units, &mut out)?;
    Some(out)
}

#[test]
fn test_unescape() {
    assert_eq!(Some("a\"b".to_owned()), unescape("a\\\"b"));
    assert_eq!(
        Some("\\-/-\u{8}-\n-\r-\t- ".to_owned()),
        unescape("\\\\-\\/-\\b-\\n-\\r-\\t-\\u0020")
    );
    assert_eq!(Some("\u{1F600}".to_owned()), unescape("\\uD83D\\uDE00"));
    assert_eq!(None, unescape("\\q"));
    assert_eq!(None, unescape("\\u12"));
    assert_eq!(None, unescape("\\uD83D"));
}

#[test]
fn test_literals() {
    let loc = Loc::default();
    assert_eq!(Ok(Value::Long(2)), literal(LiteralKind::Int, "2", loc));
    assert_eq!(Ok(Value::Double(3.0)), literal(LiteralKind::Real, "3.0", loc));
    assert_eq!(Ok(Value::Double(53e3)), literal(LiteralKind::Real, "53e3", loc));
    assert_eq!(Ok(Value::Bool(false)), literal(LiteralKind::Bool, "false", loc));
    assert_eq!(Ok(Value::from("foo")), literal(LiteralKind::Str, "'foo'", loc));
    assert_eq!(
        Ok(Value::Decimal(
            BigDecimal::from_str("123456789012345678901234567890").unwrap()
        )),
        literal(LiteralKind::Int, "123456789012345678901234567890", loc)
    );
    assert_eq!(
        ErrorCode::BadEscape,
        literal(LiteralKind::Str, "'\\x'", loc).unwrap_err().code
    );
}
