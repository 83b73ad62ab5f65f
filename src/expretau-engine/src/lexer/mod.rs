// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// a hand-written tokenizer in the style of the LALRPOP whitespace
// tokenizer: one char of lookahead, spans are byte offsets

use std::str::CharIndices;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_xid::UnicodeXID;

use self::Token::*;
use crate::common::ErrorCode::*;
use crate::common::{EquationError, ErrorCode};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'input> {
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
    Ident(&'input str),
    Int(&'input str),
    Real(&'input str),
    /// a quoted string literal, quotes and escapes included
    Str(&'input str),
}

fn error<T>(code: ErrorCode, start: usize, end: usize) -> Result<T, EquationError> {
    Err(EquationError::new(start, end, code))
}

pub type Spanned<T> = (usize, T, usize);

pub struct Lexer<'input> {
    text: &'input str,
    chars: CharIndices<'input>,
    lookahead: Option<(usize, char)>,
}

const KEYWORDS: &[(&str, Token<'static>)] = &[
    ("true", True),
    ("false", False),
    ("not", Not),
    ("and", And),
    ("or", Or),
    ("startsWith", StartsWith),
    ("endsWith", EndsWith),
    ("contains", Contains),
    ("matches", Matches),
];

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        let mut t = Lexer {
            text: input,
            chars: input.char_indices(),
            lookahead: None,
        };
        t.bump();
        t
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.bump_n(1)
    }

    fn bump_n(&mut self, n: usize) -> Option<(usize, char)> {
        debug_assert!(n > 0);
        self.lookahead = self.chars.nth(n - 1);
        self.lookahead
    }

    /// the char after the lookahead, without consuming anything
    fn peek_second(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn take_while<F>(&mut self, mut keep_going: F) -> Option<usize>
    where
        F: FnMut(char) -> bool,
    {
        loop {
            match self.lookahead {
                None => return None,
                Some((idx1, c)) => {
                    if keep_going(c) {
                        self.bump();
                    } else {
                        return Some(idx1);
                    }
                }
            }
        }
    }

    fn identifierish(&mut self, idx0: usize) -> Spanned<Token<'input>> {
        let end = self
            .take_while(is_identifier_continue)
            .unwrap_or(self.text.len());
        let word = &self.text[idx0..end];

        let tok = KEYWORDS
            .iter()
            .filter(|&&(w, _)| w == word)
            .map(|(_, t)| *t)
            .next()
            .unwrap_or(Ident(word));

        (idx0, tok, end)
    }

    fn number(&mut self, idx0: usize) -> Result<Spanned<Token<'input>>, EquationError> {
        lazy_static! {
            static ref NUMBER_RE: Regex = Regex::new(r"^\d*(\.\d+)?([eE][-+]?\d+)?").unwrap();
        }

        let len = match NUMBER_RE.find(&self.text[idx0..]) {
            Some(m) if m.end() > 0 => m.end(),
            _ => return error(ExpectedNumber, idx0, idx0 + 1),
        };

        self.bump_n(len);

        let end = idx0 + len;
        let text = &self.text[idx0..end];
        let tok = if text.contains(['.', 'e', 'E']) {
            Real(text)
        } else {
            Int(text)
        };
        Ok((idx0, tok, end))
    }

    fn string(&mut self, idx0: usize, quote: char) -> Result<Spanned<Token<'input>>, EquationError> {
        let mut escaped = false;
        loop {
            match self.bump() {
                None => return error(UnclosedString, idx0, self.text.len()),
                Some((_, '\\')) if !escaped => escaped = true,
                Some((idx1, c)) if c == quote && !escaped => {
                    // eat the closing quote
                    self.bump();
                    let end = idx1 + c.len_utf8();
                    return Ok((idx0, Str(&self.text[idx0..end]), end));
                }
                Some(_) => escaped = false,
            }
        }
    }

    #[allow(clippy::unnecessary_wraps)]
    fn consume(
        &mut self,
        i: usize,
        tok: Token<'input>,
        len: usize,
    ) -> Option<Result<Spanned<Token<'input>>, EquationError>> {
        self.bump_n(len);
        Some(Ok((i, tok, i + len)))
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Result<Spanned<Token<'input>>, EquationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.lookahead {
                Some((i, '/')) => self.consume(i, Div, 1),
                Some((i, '*')) => self.consume(i, Mul, 1),
                Some((i, '+')) => self.consume(i, Plus, 1),
                Some((i, '-')) => self.consume(i, Minus, 1),
                Some((i, '(')) => self.consume(i, LParen, 1),
                Some((i, ')')) => self.consume(i, RParen, 1),
                Some((i, '[')) => self.consume(i, LBracket, 1),
                Some((i, ']')) => self.consume(i, RBracket, 1),
                Some((i, ',')) => self.consume(i, Comma, 1),
                Some((i, '=')) => match self.peek_second() {
                    Some('=') => self.consume(i, Eq, 2),
                    _ => self.consume(i, Eq, 1),
                },
                Some((i, '!')) => match self.peek_second() {
                    Some('=') => self.consume(i, Neq, 2),
                    _ => self.consume(i, Not, 1),
                },
                Some((i, '<')) => match self.peek_second() {
                    Some('>') => self.consume(i, Neq, 2),
                    Some('=') => self.consume(i, Lte, 2),
                    _ => self.consume(i, Lt, 1),
                },
                Some((i, '>')) => match self.peek_second() {
                    Some('=') => self.consume(i, Gte, 2),
                    _ => self.consume(i, Gt, 1),
                },
                Some((i, '&')) => match self.peek_second() {
                    Some('&') => self.consume(i, And, 2),
                    _ => {
                        self.bump();
                        Some(error(UnrecognizedToken, i, i + 1))
                    }
                },
                Some((i, '|')) => match self.peek_second() {
                    Some('|') => self.consume(i, Or, 2),
                    _ => {
                        self.bump();
                        Some(error(UnrecognizedToken, i, i + 1))
                    }
                },
                Some((i, '.')) => match self.peek_second() {
                    Some(c) if is_digit(c) => Some(self.number(i)),
                    _ => self.consume(i, Dot, 1),
                },
                Some((i, q)) if q == '\'' || q == '"' => Some(self.string(i, q)),
                Some((i, c)) if is_identifier_start(c) => Some(Ok(self.identifierish(i))),
                Some((i, c)) if is_digit(c) => Some(self.number(i)),
                Some((_, c)) if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                Some((i, _)) => {
                    self.bump(); // eat whatever is killing us
                    let end = match self.lookahead {
                        Some((end, _)) => end,
                        None => self.text.len(),
                    };
                    Some(error(UnrecognizedToken, i, end))
                }
                None => None,
            };
        }
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_identifier_start(c: char) -> bool {
    UnicodeXID::is_xid_start(c) || c == '_' || c == '$'
}

fn is_identifier_continue(c: char) -> bool {
    UnicodeXID::is_xid_continue(c) || c == '$'
}
