//! Tests for src/output/mod.rs - tables and structured output

use cilium_status::cli::OutputFormat;
use cilium_status::output::{colorize_ready, format_structured, format_table_raw, strip_ansi_codes};
use serde::Serialize;

#[derive(Serialize)]
struct Sample {
    name: String,
    ready: bool,
}

fn sample() -> Sample {
    Sample {
        name: "east".to_string(),
        ready: true,
    }
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table_raw(&["NAME"], &[]), "No resources found");
}

#[test]
fn test_format_table_aligns_columns() {
    let rows = vec![
        vec!["cilium-abcde".to_string(), "east".to_string()],
        vec!["cilium-x".to_string(), "west".to_string()],
    ];
    let table = strip_ansi_codes(&format_table_raw(&["POD", "CLUSTER"], &rows));
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("POD"));
    let column = lines[0].find("CLUSTER").unwrap();
    assert_eq!(lines[1].find("east"), Some(column));
    assert_eq!(lines[2].find("west"), Some(column));
}

#[test]
fn test_format_table_ignores_color_codes_for_width() {
    let rows = vec![
        vec![colorize_ready(true), "a".to_string()],
        vec![colorize_ready(false), "b".to_string()],
    ];
    let table = strip_ansi_codes(&format_table_raw(&["READY", "X"], &rows));
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[1].find('a'), lines[2].find('b'));
}

// ============================================================================
// ANSI handling
// ============================================================================

#[test]
fn test_strip_ansi_codes() {
    assert_eq!(strip_ansi_codes("\x1b[32mtrue\x1b[39m"), "true");
    assert_eq!(strip_ansi_codes("plain"), "plain");
}

#[test]
fn test_colorize_ready() {
    assert_eq!(strip_ansi_codes(&colorize_ready(true)), "true");
    assert_eq!(strip_ansi_codes(&colorize_ready(false)), "false");
}

// ============================================================================
// Structured output
// ============================================================================

#[test]
fn test_format_structured_json() {
    let out = format_structured(&sample(), OutputFormat::Json).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["name"], "east");
    assert_eq!(value["ready"], true);
}

#[test]
fn test_format_structured_yaml() {
    let out = format_structured(&sample(), OutputFormat::Yaml).unwrap().unwrap();
    assert!(out.contains("name: east"));
    assert!(out.contains("ready: true"));
}

#[test]
fn test_format_structured_summary_is_none() {
    assert!(format_structured(&sample(), OutputFormat::Summary).unwrap().is_none());
}
