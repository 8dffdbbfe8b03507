//! Git input/output formatting helpers.

use std::process::Output;

use chrono::{DateTime, FixedOffset};

use super::types::LogEntry;

/// `git log --format` string matched by [`parse_log`].
pub const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%cn%x1f%s";

/// Formats a git error with both stdout and stderr for better debugging.
pub fn format_git_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    match (stderr.is_empty(), stdout.is_empty()) {
        (true, true) => format!(
            "Command failed with exit code {}",
            output.status.code().unwrap_or(-1)
        ),
        (true, false) => stdout,
        (false, true) => stderr,
        (false, false) => format!("{}\n{}", stderr, stdout),
    }
}

/// Renders a timestamp in git's internal date format (`<unix> <+hhmm>`),
/// which git parses without locale or format guessing.
pub fn format_git_date(when: &DateTime<FixedOffset>) -> String {
    format!("{} {}", when.timestamp(), when.format("%z"))
}

/// Reads a single object id from `git rev-parse` style output.
pub fn parse_object_id(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    let id = text.lines().next()?.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// Parses `git log` output produced with [`LOG_FORMAT`]. Malformed lines
/// are skipped.
pub fn parse_log(stdout: &[u8]) -> Vec<LogEntry> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(6, '\x1f');
            Some(LogEntry {
                id: fields.next()?.to_string(),
                author_name: fields.next()?.to_string(),
                author_email: fields.next()?.to_string(),
                author_date: fields.next()?.to_string(),
                committer_name: fields.next()?.to_string(),
                subject: fields.next()?.to_string(),
            })
        })
        .collect()
}
