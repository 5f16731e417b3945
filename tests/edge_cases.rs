//! Edge Case Testing
//!
//! This module tests edge cases and boundary conditions to ensure grnsh
//! handles unusual responses and input gracefully. Tests include:
//! - Large result sets
//! - Special characters and Unicode
//! - Numeric extremes
//! - Empty strings vs null
//! - Completion boundaries (empty input, flag prefix alone, candidate cap)
//!
//! These tests ensure the console always prints something sensible for
//! every response.

use grnsh::completion::{parse_table_names, FLAG_PREFIX};
use grnsh::{format_select, normalize, Completer, CommandKind, Vocabulary, MAX_CANDIDATES};
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

/// Build a select response line from columns and rows
fn select_response(columns: &[(&str, &str)], rows: &[serde_json::Value]) -> String {
    let mut block = vec![json!([rows.len()])];
    block.push(json!(columns.iter().map(|(n, t)| json!([n, t])).collect::<Vec<_>>()));
    block.extend(rows.iter().cloned());
    json!([[0, 1_700_000_000.0, 0.5], [block]]).to_string()
}

// ============================================================================
// Large Result Sets
// ============================================================================

#[test]
fn test_many_rows() {
    let rows: Vec<_> = (1..=500).map(|i| json!([i, format!("user{i}")])).collect();
    let raw = select_response(&[("_id", "UInt32"), ("name", "ShortText")], &rows);

    let rendered = format_select(&raw);

    assert_eq!(rendered.lines().count(), 500 * 3 + 1);
    assert!(rendered.contains(" 500. row "));
    assert!(rendered.ends_with("500 records / 500 hits (0.5 sec)"));
}

#[test]
fn test_large_generic_response() {
    let values: Vec<_> = (0..10_000).collect();
    let raw = json!([[0, 0.0, 0.1], values]).to_string();

    let rendered = normalize(&raw);

    assert_eq!(rendered.lines().count(), 10_000 + 9);
}

// ============================================================================
// Unicode and Special Characters
// ============================================================================

#[test]
fn test_unicode_column_alignment_counts_characters() {
    let raw =
        select_response(&[("名前", "ShortText"), ("id", "UInt32")], &[json!(["山田", 1])]);
    let rendered = format_select(&raw);
    let lines: Vec<&str> = rendered.lines().collect();

    // Widest name is two characters, so names are right-aligned to five.
    assert_eq!(lines[1], "   名前: 山田");
    assert_eq!(lines[2], "   id: 1");
}

#[test]
fn test_values_with_newlines_and_quotes() {
    let raw = select_response(&[("body", "Text")], &[json!(["line one\nline \"two\""])]);
    let rendered = format_select(&raw);

    assert!(rendered.contains("   body: line one\nline \"two\""));
}

#[test]
fn test_escaped_unicode_is_unescaped() {
    let rendered = normalize(r#"["été","😀"]"#);
    assert!(rendered.contains("été"));
    assert!(rendered.contains('😀'));
}

// ============================================================================
// Numeric Extremes and Null
// ============================================================================

#[test]
fn test_numeric_extremes() {
    let raw = select_response(
        &[("big", "Int64"), ("small", "Int64"), ("float", "Float")],
        &[json!([u64::MAX, i64::MIN, 1.0e-300])],
    );
    let rendered = format_select(&raw);

    assert!(rendered.contains(&format!("big: {}", u64::MAX)));
    assert!(rendered.contains(&format!("small: {}", i64::MIN)));
    assert!(rendered.contains("float: 1e-300"));
}

#[test]
fn test_empty_string_vs_null() {
    let raw = select_response(&[("a", "ShortText"), ("b", "ShortText")], &[json!(["", null])]);
    let rendered = format_select(&raw);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[1], "   a: ");
    assert_eq!(lines[2], "   b: null");
}

#[test]
fn test_hit_count_overflow_is_raw() {
    let raw = r#"[[0,0,0.5],[[[-1],[["_id","UInt32"]]]]]"#;
    assert_eq!(format_select(raw), raw);
}

// ============================================================================
// Input Classification
// ============================================================================

#[test]
fn test_suffix_must_be_at_end() {
    assert_eq!(CommandKind::classify("load.grn.bak"), CommandKind::Other);
    assert_eq!(
        CommandKind::classify("select --query x.grn"),
        CommandKind::Script("select --query x.grn".into())
    );
}

// ============================================================================
// Completion Boundaries
// ============================================================================

#[test]
fn test_flag_prefix_alone_lists_arguments() {
    let completer = Completer::new(Vocabulary::builtin(), false);
    let candidates = completer.candidates(FLAG_PREFIX);

    assert_eq!(candidates.len(), MAX_CANDIDATES);
    assert!(candidates.iter().all(|c| c.starts_with("--") && c.ends_with(' ')));
}

#[test]
fn test_unknown_prefix_has_no_candidates() {
    let completer = Completer::new(Vocabulary::builtin(), true);
    assert_eq!(completer.complete("zzz_no_such_thing", 0), None);
    assert_eq!(completer.complete("--zzz", 0), None);
}

#[test]
fn test_out_of_range_index() {
    let completer = Completer::new(Vocabulary::builtin(), false);
    assert_eq!(completer.complete("select", 0).as_deref(), Some("select "));
    assert_eq!(completer.complete("select", 1), None);
    assert_eq!(completer.complete("select", usize::MAX), None);
}

#[test]
fn test_many_tables_respect_cap() {
    let tables: Vec<String> = (0..200).map(|i| format!("Table{i:03}")).collect();
    let completer = Completer::new(Vocabulary::with_tables(tables), false);

    let candidates = completer.candidates("Table");
    assert_eq!(candidates.len(), MAX_CANDIDATES);
    assert_eq!(candidates[0], "Table000 ");
}

#[test]
fn test_table_listing_with_unnamed_rows() {
    let raw = r#"[[0,0,0],[[["id","UInt32"],["name","ShortText"]],[256,"Users"],[257,null],[258]]]"#;
    assert_eq!(parse_table_names(raw).unwrap(), vec!["Users"]);
}
