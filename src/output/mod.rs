//! Output formatting for cilium-status

use crate::cli::OutputFormat;
use crate::error::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format raw headers and rows as a table
pub fn format_table_raw(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "No resources found".to_string();
    }

    // Calculate column widths
    let num_cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < num_cols {
                widths[i] = widths[i].max(strip_ansi_codes(cell).chars().count());
            }
        }
    }

    let mut output = String::new();

    let mut header_line = String::new();
    for (i, header) in headers.iter().enumerate() {
        let padding = widths[i].saturating_sub(header.len());
        header_line.push_str(header);
        header_line.push_str(&" ".repeat(padding + 2));
    }
    output.push_str(&header_line.trim_end().bold().to_string());
    output.push('\n');

    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i < num_cols {
                let stripped_len = strip_ansi_codes(cell).chars().count();
                let padding = widths[i].saturating_sub(stripped_len);
                line.push_str(cell);
                line.push_str(&" ".repeat(padding + 2));
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Strip ANSI escape codes for length calculation
pub fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Colorize a readiness flag
pub fn colorize_ready(ready: bool) -> String {
    if ready {
        "true".green().to_string()
    } else {
        "false".red().to_string()
    }
}

/// Render `value` as JSON or YAML, `None` for the summary format
pub fn format_structured<T: Serialize>(value: &T, output: OutputFormat) -> Result<Option<String>> {
    match output {
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
        OutputFormat::Summary => Ok(None),
    }
}

/// Print `text`, dropping colors when they are disabled
pub fn print_text(text: &str, colors: bool) {
    if colors {
        println!("{text}");
    } else {
        println!("{}", strip_ansi_codes(text));
    }
}
