//! Turn pipeline failures into one line a user can act on.
//!
//! Rules are tried in order and the first one that matches wins. Each rule
//! looks at the typed variant first and falls back to the message text, so
//! errors that arrive wrapped as plain strings (for example from the browser
//! backend) are still recognised.

use crate::{Error, WaitStrategy};
use std::io::ErrorKind;

type Rule = fn(&Error, &str) -> Option<String>;

const RULES: &[Rule] = &[
    file_not_found,
    selector_not_found,
    timeout,
    missing_output_dir,
    network,
    missing_argument,
    invalid_wait,
];

/// Map `err` to a single user-facing message. Never panics.
pub fn translate(err: &Error) -> String {
    let message = err.to_string();
    RULES
        .iter()
        .find_map(|rule| rule(err, &message))
        .unwrap_or_else(|| format!("Error: {}", capitalize(&message)))
}

fn file_not_found(err: &Error, message: &str) -> Option<String> {
    let path = match err {
        Error::FileNotFound(path) => path.display().to_string(),
        _ => message.strip_prefix("HTML file not found: ")?.to_string(),
    };
    Some(format!("HTML file not found: {}. Check the path and try again.", path))
}

fn selector_not_found(err: &Error, message: &str) -> Option<String> {
    let selector = match err {
        Error::SelectorNotFound(selector) => selector.as_str(),
        _ => message.strip_prefix("Selector not found: ")?,
    };
    Some(format!(
        "Selector not found: {}. Check that --selector matches an element on the page.",
        selector
    ))
}

fn timeout(err: &Error, message: &str) -> Option<String> {
    let detail = match err {
        Error::NavigationTimeout(ms) => format!(" after {}ms", ms),
        _ if message.contains("Timeout") || message.contains("timed out") => String::new(),
        _ => return None,
    };
    Some(format!(
        "Navigation timed out{}. Increase --timeout or try a different --wait strategy.",
        detail
    ))
}

fn missing_output_dir(err: &Error, message: &str) -> Option<String> {
    let path = match err {
        Error::FilesystemWrite { path, source } if source.kind() == ErrorKind::NotFound => {
            path.display().to_string()
        }
        _ if message.contains("ENOENT") => "(unknown path)".to_string(),
        _ => return None,
    };
    Some(format!(
        "Cannot write output file {}. Check the output directory exists and is writable.",
        path
    ))
}

fn network(_err: &Error, message: &str) -> Option<String> {
    let start = message.find("net::ERR_")?;
    let detail = message[start..]
        .split_whitespace()
        .next()
        .unwrap_or("net::ERR_FAILED");
    Some(format!(
        "Network error: could not load the page ({}). Check the URL and your connection.",
        detail
    ))
}

fn missing_argument(err: &Error, message: &str) -> Option<String> {
    let name = match err {
        Error::MissingArgument(name) => name.clone(),
        _ => {
            let rest = message.strip_prefix("missing required argument '")?;
            rest.split('\'').next()?.to_string()
        }
    };
    Some(format!(
        "Missing required argument: {}. Usage: html2slide <input> [options]",
        name
    ))
}

fn invalid_wait(err: &Error, _message: &str) -> Option<String> {
    let Error::InvalidWaitStrategy(value) = err else {
        return None;
    };
    let allowed: Vec<&str> = WaitStrategy::ALL.iter().map(|w| w.as_str()).collect();
    Some(format!(
        "Invalid --wait value '{}'. Use one of: {}.",
        value,
        allowed.join(", ")
    ))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown error".to_string(),
    }
}
