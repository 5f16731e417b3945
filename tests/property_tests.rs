//! Property-Based Tests
//!
//! Uses proptest to check formatter and completer invariants over random
//! inputs:
//! - `normalize` keeps every JSON value intact and every non-JSON text byte-identical
//! - `format_select` never panics and only rewrites select-shaped responses
//! - Completion never offers more than `MAX_CANDIDATES` entries, all matching the typed text

use grnsh::{format_select, normalize, Completer, SelectResponse, Vocabulary, MAX_CANDIDATES};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

/// Scalars that survive a text round-trip exactly
fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<u64>().prop_map(|n| json!(n)),
        // Dyadic fractions have short, exact decimal forms.
        any::<i32>().prop_map(|n| json!(f64::from(n) / 8.0)),
        any::<String>().prop_map(Value::String),
    ]
}

/// Row values without characters that could look like banners
fn row_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,10}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec((any::<String>(), inner), 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// A well-formed select response with `rows` rows
fn select_value() -> impl Strategy<Value = Value> {
    (1usize..6, 0usize..12).prop_flat_map(|(columns, rows)| {
        let names = prop::collection::vec("[a-z_]{1,12}", columns);
        let body = prop::collection::vec(prop::collection::vec(row_leaf(), columns), rows);
        (names, body, 0u32..10_000).prop_map(|(names, body, millis)| {
            let mut block = vec![json!([body.len()])];
            block.push(json!(names.iter().map(|n| json!([n, "ShortText"])).collect::<Vec<_>>()));
            block.extend(body.into_iter().map(Value::Array));
            json!([[0, 1_700_000_000.0, f64::from(millis) / 1000.0], [block]])
        })
    })
}

// ============================================================================
// Response Formatting
// ============================================================================

proptest! {
    /// Property: formatted output parses back to the same value
    #[test]
    fn prop_normalize_round_trips(value in json_value()) {
        let raw = value.to_string();
        let reparsed: Value = serde_json::from_str(&normalize(&raw)).unwrap();
        prop_assert_eq!(reparsed, value);
    }

    /// Property: text that is not JSON is returned byte for byte
    #[test]
    fn prop_non_json_is_unchanged(raw in any::<String>()) {
        prop_assume!(serde_json::from_str::<Value>(&raw).is_err());
        prop_assert_eq!(normalize(&raw), raw.clone());
        prop_assert_eq!(format_select(&raw), raw);
    }

    /// Property: only responses that validate as selects are rewritten
    #[test]
    fn prop_format_select_rewrites_only_selects(value in json_value()) {
        let raw = value.to_string();
        let rendered = format_select(&raw);
        match SelectResponse::parse(&raw) {
            Ok(response) => prop_assert_eq!(rendered, response.render()),
            Err(_) => prop_assert_eq!(rendered, raw),
        }
    }

    /// Property: arrays without a status header are never select responses
    #[test]
    fn prop_headerless_arrays_are_raw(
        label in any::<String>(),
        rest in prop::collection::vec(json_value(), 0..4),
    ) {
        let mut items = vec![Value::String(label)];
        items.extend(rest);
        let raw = Value::Array(items).to_string();
        prop_assert_eq!(format_select(&raw), raw);
    }

    /// Property: one banner per row, then the summary line
    #[test]
    fn prop_select_renders_every_row(value in select_value()) {
        let raw = value.to_string();
        let rows = value.pointer("/1/0").and_then(Value::as_array).map_or(0, |b| b.len() - 2);
        let rendered = format_select(&raw);

        prop_assert_eq!(rendered.matches(". row ").count(), rows);
        let summary = format!("{rows} records / {rows} hits");
        prop_assert!(rendered.lines().last().unwrap().starts_with(&summary));
    }
}

// ============================================================================
// Completion
// ============================================================================

proptest! {
    /// Property: candidates are capped and all extend the typed text
    #[test]
    fn prop_candidates_capped_and_prefixed(
        text in prop_oneof!["[a-z_]{0,6}", "--[a-z_]{0,6}", "[A-Z][a-z]{0,3}"],
        tables in prop::collection::vec("[A-Z][a-z]{0,6}", 0..100),
        complete_arguments in any::<bool>(),
    ) {
        let completer = Completer::new(Vocabulary::with_tables(tables), complete_arguments);
        let candidates = completer.candidates(&text);

        prop_assert!(candidates.len() <= MAX_CANDIDATES);
        for candidate in &candidates {
            prop_assert!(candidate.starts_with(&text), "{candidate:?} does not extend {text:?}");
            prop_assert!(candidate.ends_with(' '));
        }
    }

    /// Property: `complete` walks the candidate list, then reports exhaustion
    #[test]
    fn prop_complete_indexes_candidates(text in "[a-z_]{0,4}", index in 0usize..64) {
        let completer = Completer::new(Vocabulary::builtin(), true);
        let candidates = completer.candidates(&text);
        prop_assert_eq!(completer.complete(&text, index), candidates.get(index).cloned());
    }
}
