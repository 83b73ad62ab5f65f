// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{nullary, try_binary, try_unary};
use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::registry::RegistryBuilder;
use crate::value::TIME_FORMAT;

const INDUCE: &[TypeCode] = &[TypeCode::Long, TypeCode::Int];

fn from_millis(millis: i64) -> Result<NaiveDateTime> {
    match DateTime::from_timestamp_millis(millis) {
        Some(t) => Ok(t.naive_utc()),
        None => eval_err!(BadConversion, format!("{millis} ms is out of range")),
    }
}

/// parse_time reads `text` with a strftime-style `format`.  A format with
/// no time fields yields midnight.
pub(crate) fn parse_time(text: &str, format: &str) -> Result<NaiveDateTime> {
    if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
        return Ok(t);
    }
    match NaiveDate::parse_from_str(text, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        Some(t) => Ok(t),
        None => eval_err!(FailParseTime, format!("'{text}' with format '{format}'")),
    }
}

/// date_pattern accepts both strftime formats and date patterns written
/// with letter fields, as in `yyyy-MM-dd HH:mm:ss.SSS`.  A format holding a
/// `%` is taken as strftime and returned untouched.  Letters in single
/// quotes are literal text and `''` is a quote.
fn date_pattern(format: &str) -> Cow<'_, str> {
    if format.contains('%') {
        return Cow::Borrowed(format);
    }
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars().peekable();
    let mut quoted = false;
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push('\'');
            } else {
                quoted = !quoted;
            }
            continue;
        }
        if quoted || !c.is_ascii_alphabetic() {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let field = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1..=2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', _) => "%d",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            _ => {
                out.extend(std::iter::repeat_n(c, run));
                continue;
            }
        };
        out.push_str(field);
    }
    Cow::Owned(out)
}

pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(INDUCE, &["time"]);

    r.register_evaluator("time", nullary(|| Utc::now().naive_utc()));
    r.register_evaluator("time", try_unary(from_millis));
    r.register_evaluator(
        "time",
        try_unary(|text: Arc<str>| parse_time(&text, TIME_FORMAT)),
    );
    r.register_evaluator(
        "time",
        try_binary(|text: Arc<str>, format: Arc<str>| parse_time(&text, &date_pattern(&format))),
    );
}

#[test]
fn test_parse_time() {
    let t = parse_time("2021-03-04 05:06:07.890", TIME_FORMAT).unwrap();
    assert_eq!("2021-03-04 05:06:07.890", t.format(TIME_FORMAT).to_string());

    let t = parse_time("04/03/2021", "%d/%m/%Y").unwrap();
    assert_eq!("2021-03-04 00:00:00.000", t.format(TIME_FORMAT).to_string());

    assert_eq!(
        crate::common::ErrorCode::FailParseTime,
        parse_time("yesterday", TIME_FORMAT).unwrap_err().code
    );
}

#[test]
fn test_from_millis() {
    let t = from_millis(86_400_000 + 1).unwrap();
    assert_eq!("1970-01-02 00:00:00.001", t.format(TIME_FORMAT).to_string());
}

#[test]
fn test_date_pattern() {
    assert_eq!("%Y-%m-%d", date_pattern("yyyy-MM-dd"));
    assert_eq!("%d/%m/%y %H:%M:%S.%3f", date_pattern("dd/MM/yy HH:mm:ss.SSS"));
    assert_eq!("%Y-%m-%dT%H:%M o'clock", date_pattern("yyyy-MM-dd'T'HH:mm 'o''clock'"));
    assert_eq!("%a %d %b %Y %I %p", date_pattern("EEE dd MMM yyyy hh a"));
    // strftime formats pass through
    assert_eq!("%d/%m/%Y", date_pattern("%d/%m/%Y"));

    let t = parse_time("04/03/2021 05:06:07.890", &date_pattern("dd/MM/yyyy HH:mm:ss.SSS")).unwrap();
    assert_eq!("2021-03-04 05:06:07.890", t.format(TIME_FORMAT).to_string());
    let t = parse_time("2021-03-04T05:06", &date_pattern("yyyy-MM-dd'T'HH:mm")).unwrap();
    assert_eq!("2021-03-04 05:06:00.000", t.format(TIME_FORMAT).to_string());
}
