//! Built-in callables the CLI and fixture files can refer to by name.

use std::collections::BTreeMap;

use calltest_core::{Registry, function};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("integer divide by zero")]
pub struct DivideByZero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mean of an empty list")]
pub struct EmptyInput;

#[must_use]
pub fn sum(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

pub fn divide(a: i64, b: i64) -> Result<i64, DivideByZero> {
    if b == 0 { Err(DivideByZero) } else { Ok(a.wrapping_div(b)) }
}

#[must_use]
pub const fn swap(a: i64, b: i64) -> (i64, i64) {
    (b, a)
}

#[must_use]
pub const fn sort_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[must_use]
pub fn concat(a: String, b: String) -> String {
    a + &b
}

#[must_use]
pub fn reverse(mut items: Vec<i64>) -> Vec<i64> {
    items.reverse();
    items
}

/// Whitespace-separated word frequencies.
#[must_use]
pub fn word_count(text: String) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for word in text.split_whitespace() {
        *counts.entry(word.to_owned()).or_insert(0) += 1;
    }
    counts
}

pub fn mean(values: Vec<f64>) -> Result<f64, EmptyInput> {
    if values.is_empty() {
        return Err(EmptyInput);
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    Ok(values.iter().sum::<f64>() / len)
}

/// Registry holding every built-in under its short name.
#[must_use]
pub fn builtin() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(function(sum).named("sum"))
        .register(function(divide).named("divide"))
        .register(function(swap).named("swap"))
        .register(function(sort_pair).named("sort_pair"))
        .register(function(concat).named("concat"))
        .register(function(reverse).named("reverse"))
        .register(function(word_count).named("word_count"))
        .register(function(mean).named("mean"));
    registry
}
