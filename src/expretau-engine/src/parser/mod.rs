// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Hand-written recursive descent parser for expressions.
//!
//! Precedence, loosest first: `or`, `and`, `not`, relational and string
//! operators, `+ -`, `* /`, unary `+ -`, postfix `[i]` and `.name`, atoms.

use crate::ast::{BinaryOp, Expr0, LiteralKind, Loc, UnaryOp};
use crate::common::{EquationError, ErrorCode};
use crate::eqn_err;
use crate::lexer::{Lexer, Spanned, Token};

#[cfg(test)]
mod tests;

/// The deepest expression accepted.  Both the nesting of groups, calls
/// and prefix operators and the height of the resulting tree count
/// against it.
pub const MAX_DEPTH: usize = 128;

/// TokenKind discriminant for efficient peek comparisons without payload matching
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind {
    True,
    False,
    Not,
    And,
    Or,
    StartsWith,
    EndsWith,
    Contains,
    Matches,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Mul,
    Div,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Ident,
    Int,
    Real,
    Str,
}

impl<'a> From<&Token<'a>> for TokenKind {
    fn from(token: &Token<'a>) -> Self {
        match token {
            Token::True => TokenKind::True,
            Token::False => TokenKind::False,
            Token::Not => TokenKind::Not,
            Token::And => TokenKind::And,
            Token::Or => TokenKind::Or,
            Token::StartsWith => TokenKind::StartsWith,
            Token::EndsWith => TokenKind::EndsWith,
            Token::Contains => TokenKind::Contains,
            Token::Matches => TokenKind::Matches,
            Token::Eq => TokenKind::Eq,
            Token::Neq => TokenKind::Neq,
            Token::Lt => TokenKind::Lt,
            Token::Lte => TokenKind::Lte,
            Token::Gt => TokenKind::Gt,
            Token::Gte => TokenKind::Gte,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Mul => TokenKind::Mul,
            Token::Div => TokenKind::Div,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::LBracket => TokenKind::LBracket,
            Token::RBracket => TokenKind::RBracket,
            Token::Comma => TokenKind::Comma,
            Token::Dot => TokenKind::Dot,
            Token::Ident(_) => TokenKind::Ident,
            Token::Int(_) => TokenKind::Int,
            Token::Real(_) => TokenKind::Real,
            Token::Str(_) => TokenKind::Str,
        }
    }
}

/// Parser state holding tokenized input
struct Parser<'input> {
    tokens: Vec<Spanned<Token<'input>>>,
    pos: usize,
    depth: usize,
}

impl<'input> Parser<'input> {
    /// Create a new parser from a lexer, collecting all tokens up front.
    /// Returns an error if the lexer produces any errors.
    fn new(lexer: Lexer<'input>) -> Result<Self, EquationError> {
        let tokens = lexer.collect::<Result<Vec<_>, _>>()?;
        Ok(Parser {
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.pos)
    }

    /// Peek at the kind of the current token
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|(_, tok, _)| TokenKind::from(tok))
    }

    /// Advance to the next token and return a copy of it
    fn advance(&mut self) -> Option<Spanned<Token<'input>>> {
        let tok = self.tokens.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// An error pointing at the current token, or just past the end.
    fn unexpected(&self) -> EquationError {
        if let Some((start, _, end)) = self.peek() {
            EquationError::new(*start, *end, ErrorCode::UnrecognizedToken)
        } else {
            let pos = self.eof_position();
            EquationError::new(pos, pos + 1, ErrorCode::UnrecognizedEof)
        }
    }

    /// Run `f` one nesting level deeper, failing past MAX_DEPTH.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EquationError>,
    ) -> Result<T, EquationError> {
        if self.depth >= MAX_DEPTH {
            let (start, end) = match self.peek() {
                Some((start, _, end)) => (*start, *end),
                None => (self.eof_position(), self.eof_position() + 1),
            };
            return eqn_err!(ExpressionTooDeep, start, end);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Check a freshly built node against MAX_DEPTH.
    fn node(&self, expr: Expr0) -> Result<Expr0, EquationError> {
        if expr.height() > MAX_DEPTH {
            let loc = expr.get_loc();
            return eqn_err!(ExpressionTooDeep, usize::from(loc.start), usize::from(loc.end));
        }
        Ok(expr)
    }

    /// Expect the current token to match the expected kind, returning an error if not
    fn expect(&mut self, expected: TokenKind) -> Result<Spanned<Token<'input>>, EquationError> {
        if self.peek_kind() == Some(expected) {
            self.advance().ok_or_else(|| self.unexpected())
        } else {
            Err(self.unexpected())
        }
    }

    /// Get the position for EOF errors
    fn eof_position(&self) -> usize {
        if let Some((_, _, end)) = self.tokens.last() {
            *end
        } else {
            0
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Parse a whole expression from the token stream.
    /// Returns Ok(None) for empty input.
    fn parse_top(&mut self) -> Result<Option<Expr0>, EquationError> {
        if self.is_at_end() {
            return Ok(None);
        }

        let expr = self.parse_expr()?;

        if let Some((start, _, end)) = self.peek() {
            return eqn_err!(ExtraToken, *start, *end);
        }

        Ok(Some(expr))
    }

    fn parse_expr(&mut self) -> Result<Expr0, EquationError> {
        self.nested(Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Expr0, EquationError> {
        let mut left = self.parse_and()?;

        while self.peek_kind() == Some(TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            let loc = left.get_loc().union(&right.get_loc());
            left = self.node(Expr0::Op2(BinaryOp::Or, Box::new(left), Box::new(right), loc))?;
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr0, EquationError> {
        let mut left = self.parse_not()?;

        while self.peek_kind() == Some(TokenKind::And) {
            self.advance();
            let right = self.parse_not()?;
            let loc = left.get_loc().union(&right.get_loc());
            left = self.node(Expr0::Op2(BinaryOp::And, Box::new(left), Box::new(right), loc))?;
        }

        Ok(left)
    }

    /// `not`/`!` binds looser than comparisons: `not a < b` is `not (a < b)`
    fn parse_not(&mut self) -> Result<Expr0, EquationError> {
        if self.peek_kind() == Some(TokenKind::Not) {
            let (lpos, _, _) = self.expect(TokenKind::Not)?;
            let operand = self.nested(Self::parse_not)?;
            let rpos = usize::from(operand.get_loc().end);
            return self.node(Expr0::Op1(
                UnaryOp::Not,
                Box::new(operand),
                Loc::new(lpos, rpos),
            ));
        }

        self.parse_relational()
    }

    /// Parse relational and string operators, left associative
    fn parse_relational(&mut self) -> Result<Expr0, EquationError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Lt) => BinaryOp::Lt,
                Some(TokenKind::Lte) => BinaryOp::Lte,
                Some(TokenKind::Eq) => BinaryOp::Eq,
                Some(TokenKind::Neq) => BinaryOp::Neq,
                Some(TokenKind::Gt) => BinaryOp::Gt,
                Some(TokenKind::Gte) => BinaryOp::Gte,
                Some(TokenKind::StartsWith) => BinaryOp::StartsWith,
                Some(TokenKind::EndsWith) => BinaryOp::EndsWith,
                Some(TokenKind::Contains) => BinaryOp::Contains,
                Some(TokenKind::Matches) => BinaryOp::Matches,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            let loc = left.get_loc().union(&right.get_loc());
            left = self.node(Expr0::Op2(op, Box::new(left), Box::new(right), loc))?;
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr0, EquationError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let loc = left.get_loc().union(&right.get_loc());
            left = self.node(Expr0::Op2(op, Box::new(left), Box::new(right), loc))?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr0, EquationError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Mul) => BinaryOp::Mul,
                Some(TokenKind::Div) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let loc = left.get_loc().union(&right.get_loc());
            left = self.node(Expr0::Op2(op, Box::new(left), Box::new(right), loc))?;
        }

        Ok(left)
    }

    /// Parse unary sign operators (+, -)
    fn parse_unary(&mut self) -> Result<Expr0, EquationError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Plus) => UnaryOp::Positive,
            Some(TokenKind::Minus) => UnaryOp::Negative,
            _ => return self.parse_postfix(),
        };
        let (lpos, _, _) = self.advance().ok_or_else(|| self.unexpected())?;
        let operand = self.nested(Self::parse_unary)?;
        let rpos = usize::from(operand.get_loc().end);
        self.node(Expr0::Op1(op, Box::new(operand), Loc::new(lpos, rpos)))
    }

    /// Parse postfix indexing: `e[i]` and `e.name`
    fn parse_postfix(&mut self) -> Result<Expr0, EquationError> {
        let mut expr = self.parse_atom()?;

        loop {
            match self.peek_kind() {
                Some(TokenKind::LBracket) => {
                    self.advance(); // consume '['
                    let index = self.parse_expr()?;
                    let (_, _, rpos) = self.expect(TokenKind::RBracket)?;
                    let loc = Loc::new(usize::from(expr.get_loc().start), rpos);
                    expr = self.node(Expr0::Index(Box::new(expr), Box::new(index), loc))?;
                }
                Some(TokenKind::Dot) => {
                    self.advance(); // consume '.'
                    let (_, tok, rpos) = self.expect(TokenKind::Ident)?;
                    let Token::Ident(name) = tok else {
                        unreachable!()
                    };
                    let loc = Loc::new(usize::from(expr.get_loc().start), rpos);
                    expr = self.node(Expr0::Member(Box::new(expr), name.to_owned(), loc))?;
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse an atomic expression (literal, variable, call, parenthesized expression)
    fn parse_atom(&mut self) -> Result<Expr0, EquationError> {
        let Some((lpos, tok, rpos)) = self.peek().copied() else {
            return Err(self.unexpected());
        };
        let literal = |kind: LiteralKind, text: &str| {
            Expr0::Const(kind, text.to_owned(), Loc::new(lpos, rpos))
        };
        let expr = match tok {
            Token::Int(s) => literal(LiteralKind::Int, s),
            Token::Real(s) => literal(LiteralKind::Real, s),
            Token::Str(s) => literal(LiteralKind::Str, s),
            Token::True => literal(LiteralKind::Bool, "true"),
            Token::False => literal(LiteralKind::Bool, "false"),
            Token::Ident(name) => {
                self.advance();
                if self.peek_kind() == Some(TokenKind::LParen) {
                    self.advance(); // consume '('
                    let args = self.parse_comma_separated_exprs()?;
                    let (_, _, rpos) = self.expect(TokenKind::RParen)?;
                    return self.node(Expr0::App(name.to_owned(), args, Loc::new(lpos, rpos)));
                }
                return Ok(Expr0::Var(name.to_owned(), Loc::new(lpos, rpos)));
            }
            Token::LParen => {
                self.advance(); // consume '('
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(expr)
    }

    /// Parse comma-separated expressions (for function arguments)
    fn parse_comma_separated_exprs(&mut self) -> Result<Vec<Expr0>, EquationError> {
        let mut exprs = Vec::new();

        // Handle empty list
        if self.peek_kind() == Some(TokenKind::RParen) {
            return Ok(exprs);
        }

        exprs.push(self.parse_expr()?);

        while self.peek_kind() == Some(TokenKind::Comma) {
            self.advance(); // consume ','
            exprs.push(self.parse_expr()?);
        }

        Ok(exprs)
    }
}

/// parse returns the parse tree of `input`, Ok(None) if the input holds no
/// tokens at all, or the list of errors that stopped it.
pub fn parse(input: &str) -> Result<Option<Expr0>, Vec<EquationError>> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer).map_err(|err| vec![err])?;
    parser.parse_top().map_err(|err| vec![err])
}
