//! Reduce container logs to the lines worth showing in a status report

/// Levels of error-or-worse lines
const ERROR_LEVELS: &[&str] = &["error", "fatal", "panic"];

/// Value of the `level` key of a logfmt line, quoted values included
fn logfmt_level(line: &str) -> Option<&str> {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut token_start = true;

    for (i, c) in line.char_indices() {
        if token_start && !in_quotes {
            if let Some(rest) = line[i..].strip_prefix("level=") {
                let value = rest.split_whitespace().next().unwrap_or_default();
                return Some(value.trim_matches('"'));
            }
        }
        token_start = false;
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => token_start = true,
            _ => {}
        }
    }
    None
}

/// Level of a log line, JSON objects are read through their `level` key
fn line_level(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return value.get("level")?.as_str().map(str::to_ascii_lowercase);
        }
    }
    logfmt_level(trimmed).map(str::to_ascii_lowercase)
}

fn is_error_line(line: &str) -> bool {
    line_level(line).is_some_and(|level| ERROR_LEVELS.contains(&level.as_str()))
}

/// Reduce `logs` to its error-level lines.
///
/// Without `verbose` only the last error line is kept. With `verbose` every
/// distinct error line is kept, in order of first appearance. Logs without
/// any error line reduce to their last non-empty line.
pub fn reduce(logs: &str, verbose: bool) -> String {
    let errors: Vec<&str> = logs
        .lines()
        .map(str::trim_end)
        .filter(|l| is_error_line(l))
        .collect();

    if errors.is_empty() {
        return logs
            .lines()
            .rev()
            .map(str::trim_end)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();
    }

    if !verbose {
        return errors.last().copied().unwrap_or_default().to_string();
    }

    let mut seen = std::collections::HashSet::new();
    errors
        .into_iter()
        .filter(|l| seen.insert(*l))
        .collect::<Vec<_>>()
        .join("\n")
}
