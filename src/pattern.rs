use std::collections::BTreeMap;

use regex::Regex;

/// Three coordinates, each relative (`~`, `~-3`) or absolute (`42`, `.5`).
/// The leading space sits inside the repetition so templates can place the
/// group flush against the command word.
pub const POS3: &str = r"(?: (?:~?-?(?:\d+(?:\.\d*)?|\.\d+)|~)){3}";

/// A single coordinate.
const COORD: &str = r"(?:~?-?(?:\d+(?:\.\d*)?|\.\d+)|~)";

/// Sub-pattern for a capture, chosen by the placeholder name's prefix.
fn fragment_for(name: &str) -> &'static str {
    if name.starts_with("pos") {
        POS3
    } else if matches!(name, "x" | "y" | "z") {
        COORD
    } else if name.starts_with("nbt") {
        r"\{.*\}"
    } else if name.starts_with("json") {
        r".*"
    } else if name.starts_with("cmd") {
        r".+"
    } else if name.starts_with("line") {
        r".*"
    } else {
        r"\S+"
    }
}

/// True for `{name}` spans that are capture placeholders rather than regex
/// repetition counts like `{3}`.
fn is_placeholder(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Compile a command template into an anchored pattern.
///
/// Text outside placeholders passes through as regex source; each `{name}`
/// becomes a named capture group whose sub-pattern is picked by
/// `fragment_for`. The leading `/` of a command is always optional.
pub fn compile_template(template: &str) -> Regex {
    let mut pattern = String::from("^/?");
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        pattern.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[1..close]) => {
                let name = &after[1..close];
                pattern.push_str("(?P<");
                pattern.push_str(name);
                pattern.push('>');
                pattern.push_str(fragment_for(name));
                pattern.push(')');
                rest = &after[close + 1..];
            }
            _ => {
                // Not a placeholder (e.g. a `{3}` repetition): copy the
                // brace through as regex source.
                pattern.push('{');
                rest = &after[1..];
            }
        }
    }
    pattern.push_str(rest);
    pattern.push('$');
    Regex::new(&pattern).unwrap()
}

/// Fill `{name}` placeholders in an output template from the capture map.
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[1..close]) => {
                if let Some(value) = values.get(&after[1..close]) {
                    out.push_str(value);
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
