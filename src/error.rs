use std::fmt;

/// A fatal error raised while rewriting a single command.
///
/// Structural errors carry the offending text and the 0-based character
/// offset where scanning stopped, so the caller can point at the problem.
/// A command that simply matches no rewrite rule is *not* an error.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// A specific separator or opener was required but something else was found.
    ExpectedChar {
        expected: char,
        found: Option<char>,
        offset: usize,
        text: String,
    },
    /// A `{` was opened but the input ended before the matching `}`.
    UnterminatedCompound { text: String },
    /// A `[` was opened but the input ended before the matching `]`.
    UnterminatedList { text: String },
    /// A `"` was opened but the input ended before an unescaped closing `"`.
    UnterminatedString { text: String },
    /// The payload parsed as neither a compound nor a list.
    InvalidJson { text: String },
    /// An `id` field held a numeric item id with no entry in the item table.
    UnknownItemId { id: String },
    /// A selector carried more unlabeled arguments than there are implicit keys.
    MalformedSelector { selector: String },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::ExpectedChar {
                expected,
                found,
                offset,
                text,
            } => match found {
                Some(ch) => write!(
                    f,
                    "expected '{}' but found '{}' at index {} in \"{}\"",
                    expected, ch, offset, text
                ),
                None => write!(
                    f,
                    "expected '{}' but reached the end of \"{}\"",
                    expected, text
                ),
            },
            UpdateError::UnterminatedCompound { text } => {
                write!(f, "compound is never closed in \"{}\"", text)
            }
            UpdateError::UnterminatedList { text } => {
                write!(f, "list is never closed in \"{}\"", text)
            }
            UpdateError::UnterminatedString { text } => {
                write!(f, "string is never closed in \"{}\"", text)
            }
            UpdateError::InvalidJson { text } => {
                write!(f, "invalid json \"{}\"", text)
            }
            UpdateError::UnknownItemId { id } => {
                write!(f, "no item is known for numeric id {}", id)
            }
            UpdateError::MalformedSelector { selector } => {
                write!(f, "too many unlabeled arguments in selector \"{}\"", selector)
            }
        }
    }
}

impl std::error::Error for UpdateError {}
