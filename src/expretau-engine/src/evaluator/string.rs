// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use lazy_static::lazy_static;
use regex::Regex;

use super::{binary, ternary, try_binary, try_ternary, unary};
use crate::common::{Result, TypeCode};
use crate::eval_err;
use crate::registry::RegistryBuilder;

const INDUCE: &[TypeCode] = &[TypeCode::Int, TypeCode::Long];

/// substring takes character positions `[begin, end)`.
fn substring(s: &str, begin: i32, end: Option<i32>) -> Result<String> {
    let len = s.chars().count();
    let end = end.map_or(len as i64, i64::from);
    let begin = i64::from(begin);
    if begin < 0 || end > len as i64 || begin > end {
        return eval_err!(
            IndexOutOfBounds,
            format!("substring [{begin}, {end}) of length {len}")
        );
    }
    Ok(s.chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect())
}

const REGEX_CACHE_LIMIT: usize = 256;

lazy_static! {
    static ref REGEX_CACHE: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

/// anchored returns the whole-input regex for `pattern`, reusing an earlier
/// compilation when there is one.
fn anchored(pattern: &str) -> Result<Regex> {
    let mut cache = REGEX_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => re,
        Err(err) => return eval_err!(BadRegex, err.to_string()),
    };
    if cache.len() >= REGEX_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(pattern.to_owned(), re.clone());
    Ok(re)
}

/// matches is true when the whole of `s` matches `pattern`.
fn matches(s: &str, pattern: &str) -> Result<bool> {
    Ok(anchored(pattern)?.is_match(s))
}

pub(crate) fn register(r: &mut RegistryBuilder) {
    r.register_family(
        INDUCE,
        &[
            "substring",
            "startsWith",
            "endsWith",
            "contains",
            "matches",
            "toLowerCase",
            "toUpperCase",
            "trim",
            "replace",
        ],
    );

    r.register_evaluator(
        "substring",
        try_binary(|s: Arc<str>, begin: i32| substring(&s, begin, None)),
    );
    r.register_evaluator(
        "substring",
        try_ternary(|s: Arc<str>, begin: i32, end: i32| substring(&s, begin, Some(end))),
    );
    r.register_evaluator(
        "startsWith",
        binary(|s: Arc<str>, prefix: Arc<str>| s.starts_with(&*prefix)),
    );
    r.register_evaluator(
        "endsWith",
        binary(|s: Arc<str>, suffix: Arc<str>| s.ends_with(&*suffix)),
    );
    r.register_evaluator(
        "contains",
        binary(|s: Arc<str>, needle: Arc<str>| s.contains(&*needle)),
    );
    r.register_evaluator(
        "matches",
        try_binary(|s: Arc<str>, pattern: Arc<str>| matches(&s, &pattern)),
    );
    r.register_evaluator("toLowerCase", unary(|s: Arc<str>| s.to_lowercase()));
    r.register_evaluator("toUpperCase", unary(|s: Arc<str>| s.to_uppercase()));
    r.register_evaluator("trim", unary(|s: Arc<str>| s.trim().to_owned()));
    r.register_evaluator(
        "replace",
        ternary(|s: Arc<str>, from: Arc<str>, to: Arc<str>| s.replace(&*from, &to)),
    );
}

#[test]
fn test_substring() {
    assert_eq!("bc", substring("abcd", 1, Some(3)).unwrap());
    assert_eq!("cd", substring("abcd", 2, None).unwrap());
    assert_eq!("", substring("abcd", 4, None).unwrap());
    assert_eq!("é", substring("héllo", 1, Some(2)).unwrap());
    for (begin, end) in [(-1, Some(2)), (3, Some(2)), (0, Some(5)), (5, None)] {
        assert_eq!(
            crate::common::ErrorCode::IndexOutOfBounds,
            substring("abcd", begin, end).unwrap_err().code
        );
    }
}

#[test]
fn test_matches() {
    assert!(matches("abc123", r"\w{3}\d{3}").unwrap());
    // the whole input has to match
    assert!(!matches("abc1234", r"\w{3}\d{3}").unwrap());
    assert!(matches("b", "a|b").unwrap());
    assert_eq!(
        crate::common::ErrorCode::BadRegex,
        matches("a", "(").unwrap_err().code
    );
}

#[test]
fn test_regex_cache() {
    let pattern = r"[a-c]+\d";
    assert!(matches("abc1", pattern).unwrap());
    assert!(
        REGEX_CACHE
            .lock()
            .unwrap()
            .contains_key(pattern)
    );
    assert!(!matches("abd1", pattern).unwrap());
    // bad patterns are never cached
    assert!(matches("a", "[").is_err());
    assert!(!REGEX_CACHE.lock().unwrap().contains_key("["));

    for i in 0..REGEX_CACHE_LIMIT + 10 {
        assert!(matches(&i.to_string(), &format!("{i}")).unwrap());
    }
    assert!(REGEX_CACHE.lock().unwrap().len() <= REGEX_CACHE_LIMIT);
}
