//! Request parsing
//!
//! Splits a raw line into a verb and arguments. Arguments containing spaces
//! may be wrapped in double quotes.

use crate::protocol::Request;

/// Parses a raw line into a `Request`.
///
/// The verb is case-insensitive. A known verb with the wrong arguments yields
/// `INVALID` with a usage hint.
pub fn parse_request(raw: &str) -> Request {
    let tokens = tokenize(raw.trim());
    let Some((verb, args)) = tokens.split_first() else {
        return Request::UNKNOWN;
    };
    let verb = verb.to_ascii_uppercase();

    match (verb.as_str(), args) {
        ("SETTINGS", []) => Request::SETTINGS,
        ("CONSENT", [answer]) => match answer.to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "accept" => Request::CONSENT(true),
            "no" | "n" | "false" | "decline" => Request::CONSENT(false),
            _ => Request::INVALID("Usage: CONSENT <yes|no>".into()),
        },
        ("ROOT", []) => Request::ROOT(None),
        ("ROOT", [path]) => Request::ROOT(Some(path.clone())),
        ("RESET", []) => Request::RESET,
        ("LIST", []) => Request::LIST(None),
        ("LIST", [path]) => Request::LIST(Some(path.clone())),
        ("READ", [path]) => Request::READ(path.clone()),
        ("TRASH", [path]) => Request::TRASH(path.clone()),
        ("RENAME", [old, new_name]) => Request::RENAME(old.clone(), new_name.clone()),
        ("COPY", [src, dest]) => Request::COPY(src.clone(), dest.clone()),
        // Anything that is not an integer falls back to the default limit.
        ("AUDIT", []) => Request::AUDIT(None),
        ("AUDIT", [limit]) => Request::AUDIT(limit.parse().ok()),
        ("LIVE", []) => Request::LIVE(None),
        ("LIVE", [n]) => Request::LIVE(n.parse().ok()),
        ("HELP", _) => Request::HELP,
        ("QUIT", _) | ("Q", _) | ("EXIT", _) => Request::QUIT,
        ("CONSENT", _) => Request::INVALID("Usage: CONSENT <yes|no>".into()),
        ("ROOT", _) => Request::INVALID("Usage: ROOT [absolute-path]".into()),
        ("LIST", _) => Request::INVALID("Usage: LIST [path]".into()),
        ("READ", _) => Request::INVALID("Usage: READ <path>".into()),
        ("TRASH", _) => Request::INVALID("Usage: TRASH <path>".into()),
        ("RENAME", _) => Request::INVALID("Usage: RENAME <path> <new-name>".into()),
        ("COPY", _) => Request::INVALID("Usage: COPY <src> <dest>".into()),
        ("AUDIT", _) => Request::INVALID("Usage: AUDIT [limit]".into()),
        ("LIVE", _) => Request::INVALID("Usage: LIVE [count]".into()),
        ("SETTINGS", _) | ("RESET", _) => {
            Request::INVALID(format!("{verb} takes no arguments"))
        }
        _ => Request::UNKNOWN,
    }
}

/// Whitespace-separated tokens; `"..."` keeps spaces and may be empty.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}
