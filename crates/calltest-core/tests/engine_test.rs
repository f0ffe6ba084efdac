//! Integration test: end-to-end engine behavior.
//!
//! Validates that:
//! 1. Matching signatures and values pass; a differing value fails.
//! 2. Argument count/type mismatches fail without invoking the callable.
//! 3. Type-only mode ignores values but not types.
//! 4. A non-nil trailing error fails the call.
//! 5. Multi-case passes iff some candidate matches, whatever the order.
//! 6. The stdout entry points return the same verdicts.
//!
//! Run: cargo test -p calltest-core --test engine_test

use std::cell::Cell;
use std::fmt;

use calltest_core::{
    Callable, ColorChoice, CompareMode, Engine, FailureKind, MultiCaseError, Value,
    evaluate_multi_case, evaluate_single, function,
};

#[derive(Debug)]
struct DivideByZero;

impl fmt::Display for DivideByZero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("integer divide by zero")
    }
}

fn sum(a: i64, b: i64) -> i64 {
    a + b
}

fn divide(a: i64, b: i64) -> Result<i64, DivideByZero> {
    if b == 0 { Err(DivideByZero) } else { Ok(a / b) }
}

fn quiet() -> Engine<Vec<u8>> {
    Engine::with_writer(Vec::new(), ColorChoice::Never)
}

fn ints(xs: &[i64]) -> Vec<Value> {
    xs.iter().copied().map(Value::Int).collect()
}

#[test]
fn sum_matches_expected() {
    let sum = function(sum).named("sum");
    let mut engine = quiet();
    assert!(engine.run_single(&sum, &ints(&[5]), &ints(&[2, 3]), CompareMode::Exact));
}

#[test]
fn sum_value_mismatch_fails_with_output_index() {
    let sum = function(sum).named("sum");
    let mut engine = quiet();
    assert!(!engine.run_single(&sum, &ints(&[6]), &ints(&[2, 3]), CompareMode::Exact));
    let text = String::from_utf8(engine.into_writer()).expect("utf8");
    assert_eq!(
        text,
        "FAIL: sum output 0 returned 5 but expected 6\n"
    );
}

#[test]
fn count_mismatch_wins_over_trailing_error() {
    let divide = function(divide).named("divide");
    let err = evaluate_single(&divide, &ints(&[0]), &ints(&[4, 0]), CompareMode::Exact)
        .expect_err("two returns against one expectation");
    assert_eq!(err.kind(), FailureKind::OutputArity);
}

#[test]
fn divide_error_fails_even_with_matching_expectation() {
    let divide = function(divide).named("divide");
    let expected = vec![Value::Nil, Value::error("integer divide by zero")];
    for mode in [CompareMode::Exact, CompareMode::TypeOnly] {
        let err = evaluate_single(&divide, &expected, &ints(&[4, 0]), mode)
            .expect_err("trailing error");
        assert_eq!(err.kind(), FailureKind::TrailingError);
        assert!(err.to_string().ends_with("returned an error: integer divide by zero"));
    }
}

#[test]
fn divide_success_expects_nil_error_slot() {
    let divide = function(divide).named("divide");
    let mut engine = quiet();
    assert!(engine.run_single(
        &divide,
        &[Value::Int(2), Value::Nil],
        &ints(&[4, 2]),
        CompareMode::Exact
    ));
    let text = String::from_utf8(engine.into_writer()).expect("utf8");
    assert_eq!(
        text,
        "PASS: divide function outputs 2, null with 4, 2 as arguments and run successfully.\n"
    );
}

#[test]
fn multi_case_passes_on_second_candidate() {
    let swap = function(|a: i64, b: i64| (b, a)).named("swap");
    let mut engine = quiet();
    let candidates = vec![ints(&[1, 2]), ints(&[2, 1])];
    assert!(engine.run_multi_case(&swap, &candidates, &ints(&[1, 2]), CompareMode::Exact));
    let text = String::from_utf8(engine.into_writer()).expect("utf8");
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("PASS: swap function outputs 2, 1 with 1, 2"));
}

#[test]
fn stdout_entry_points_return_verdicts() {
    let sum = function(sum).named("sum");
    assert!(calltest_core::run_single(&sum, &ints(&[5]), &ints(&[2, 3]), false));
    assert!(!calltest_core::run_single(&sum, &ints(&[6]), &ints(&[2, 3]), false));
    assert!(calltest_core::run_single(&sum, &ints(&[-1]), &ints(&[2, 3]), true));

    let swap = function(|a: i64, b: i64| (b, a)).named("swap");
    let candidates = vec![ints(&[1, 2]), ints(&[2, 1])];
    assert!(calltest_core::run_multi_case(&swap, &candidates, &ints(&[1, 2]), false));
    assert!(!calltest_core::run_multi_case(&swap, &candidates[..1], &ints(&[1, 2]), false));
}

#[test]
fn arity_mismatch_never_invokes() {
    let calls = Cell::new(0_u32);
    let counted = function(|a: i64, b: i64| {
        calls.set(calls.get() + 1);
        a + b
    })
    .named("counted");
    let mut engine = quiet();
    for args in [ints(&[]), ints(&[1]), ints(&[1, 2, 3])] {
        assert!(!engine.run_single(&counted, &ints(&[3]), &args, CompareMode::Exact));
        assert!(!engine.run_multi_case(&counted, &[ints(&[3])], &args, CompareMode::Exact));
    }
    assert_eq!(calls.get(), 0);
}

#[test]
fn argument_types_must_be_identical() {
    let sum = function(sum).named("sum");
    let err = evaluate_single(
        &sum,
        &ints(&[5]),
        &[Value::Int(2), Value::Float(3.0)],
        CompareMode::Exact,
    )
    .expect_err("float is not int");
    assert_eq!(err.kind(), FailureKind::InputType);
}

#[test]
fn out_of_range_argument_fails_before_the_call() {
    let calls = Cell::new(0_u32);
    let narrow = function(|x: i8| {
        calls.set(calls.get() + 1);
        x
    })
    .named("narrow");
    let mut engine = quiet();
    assert!(!engine.run_single(&narrow, &ints(&[44]), &ints(&[300]), CompareMode::Exact));
    assert_eq!(calls.get(), 0);
    let text = String::from_utf8(engine.into_writer()).expect("utf8");
    assert_eq!(text, "FAIL: narrow parameter 0 is 300, out of range for i8\n");
}

#[test]
fn type_only_ignores_values_but_not_types() {
    let sum = function(sum).named("sum");
    let args = ints(&[2, 3]);
    for expected in [ints(&[5]), ints(&[-100]), ints(&[0])] {
        assert!(evaluate_single(&sum, &expected, &args, CompareMode::TypeOnly).is_ok());
    }
    for expected in [vec![Value::UInt(5)], vec![Value::from("5")], vec![Value::Float(5.0)]] {
        let err = evaluate_single(&sum, &expected, &args, CompareMode::TypeOnly)
            .expect_err("type diverges");
        assert_eq!(err.kind(), FailureKind::OutputType);
    }
}

#[test]
fn multi_case_outcome_is_order_independent() {
    let sort_pair = function(|a: i64, b: i64| if a <= b { (a, b) } else { (b, a) }).named("sort_pair");
    let good = ints(&[1, 2]);
    let bad_value = ints(&[2, 1]);
    let bad_type = vec![Value::UInt(1), Value::UInt(2)];
    let bad_count = ints(&[1]);

    let orders = [
        vec![good.clone(), bad_value.clone(), bad_type.clone(), bad_count.clone()],
        vec![bad_type.clone(), bad_count.clone(), bad_value.clone(), good.clone()],
        vec![bad_count.clone(), good.clone(), bad_type.clone(), bad_value.clone()],
    ];
    for candidates in &orders {
        assert!(
            evaluate_multi_case(&sort_pair, candidates, &ints(&[2, 1]), CompareMode::Exact).is_ok()
        );
    }

    let all_bad = vec![bad_value, bad_type, bad_count];
    match evaluate_multi_case(&sort_pair, &all_bad, &ints(&[2, 1]), CompareMode::Exact) {
        Err(MultiCaseError::NoMatch { diagnostics, .. }) => {
            let kinds: Vec<FailureKind> = diagnostics.iter().map(|d| d.failure.kind()).collect();
            assert_eq!(
                kinds,
                vec![
                    FailureKind::ValueMismatch,
                    FailureKind::OutputType,
                    FailureKind::OutputArity,
                ]
            );
        }
        other => panic!("expected NoMatch, got {other:?}"),
    }
}

#[test]
fn collections_compare_per_category() {
    let words = function(|text: String| {
        let mut counts = std::collections::BTreeMap::new();
        for word in text.split_whitespace() {
            *counts.entry(word.to_owned()).or_insert(0_u64) += 1;
        }
        counts
    })
    .named("word_count");
    let raw: Value = serde_json::from_str(r#"{"a": 2, "b": 1}"#).expect("json");
    // JSON integers land as int; the map holds uint counts, so values differ by type.
    let err = evaluate_single(
        &words,
        &[raw.clone()],
        &[Value::from("a b a")],
        CompareMode::Exact,
    )
    .expect_err("int vs uint inside map");
    assert_eq!(err.kind(), FailureKind::ValueMismatch);

    let declared = words.descriptor().returns;
    assert_eq!(declared[0].to_string(), "map<uint>");
    let coerced = raw.coerce(&declared[0]);
    assert!(
        evaluate_single(&words, &[coerced], &[Value::from("a b a")], CompareMode::Exact).is_ok()
    );

    let mut counts = std::collections::BTreeMap::new();
    counts.insert(String::from("a"), 2_u64);
    counts.insert(String::from("b"), 1_u64);
    assert!(
        evaluate_single(&words, &[Value::from(counts)], &[Value::from("a b a")], CompareMode::Exact)
            .is_ok()
    );
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn callable_panics_escape_the_engine() {
    let first = function(|xs: Vec<i64>| xs[0]).named("first");
    let mut engine = quiet();
    engine.run_single(&first, &ints(&[1]), &[Value::List(Vec::new())], CompareMode::Exact);
}
