use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::UpdateError;

/// A target selector: `@<kind>` plus its bracketed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// One of `a`, `p`, `r`, `e`.
    pub kind: char,
    pub args: IndexMap<String, String>,
}

static SELECTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@[apre](\[.*\])?$").unwrap());

/// Positional argument keys, assigned in this order to unlabeled entries.
const IMPLICIT_KEYS: [&str; 4] = ["x", "y", "z", "r"];

/// Decode a selector token. Returns `Ok(None)` when the token is not a
/// selector at all (the caller falls back to plain handling), and an error
/// only when it is a selector with more unlabeled arguments than there are
/// implicit keys.
pub fn parse_selector(token: &str) -> Result<Option<Selector>, UpdateError> {
    let caps = match SELECTOR.captures(token) {
        Some(caps) => caps,
        None => return Ok(None),
    };
    let kind = token.as_bytes()[1] as char;

    let mut args = IndexMap::new();
    if let Some(body) = caps.get(1) {
        let inner = &body.as_str()[1..body.as_str().len() - 1];
        if !inner.is_empty() {
            let mut implicit = 0;
            for entry in inner.split(',') {
                match entry.split_once('=') {
                    Some((key, value)) => {
                        args.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        if implicit >= IMPLICIT_KEYS.len() {
                            return Err(UpdateError::MalformedSelector {
                                selector: token.to_string(),
                            });
                        }
                        args.insert(IMPLICIT_KEYS[implicit].to_string(), entry.to_string());
                        implicit += 1;
                    }
                }
            }
        }
    }

    Ok(Some(Selector { kind, args }))
}

impl Selector {
    /// Shorthand for the `type` argument, which names the entity kind the
    /// selector targets.
    pub fn entity_type(&self) -> Option<&str> {
        self.args.get("type").map(String::as_str)
    }
}

impl fmt::Display for Selector {
    /// Arguments are always written out as explicit `key=value` pairs, even
    /// when they were parsed from implicit positional form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.kind)?;
        if !self.args.is_empty() {
            f.write_str("[")?;
            for (i, (key, value)) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
