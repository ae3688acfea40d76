use crate::error::UpdateError;
use crate::value::{Compound, Value};

/// Scanner state: tracks position in the input string.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

/// Parse one value starting at `start`, returning the index just past it
/// and the parsed tree. Dispatches on the first character: `{` compound,
/// `[` list, `"` quoted scalar, anything else a bare scalar.
pub fn parse_value(input: &str, start: usize) -> Result<(usize, Value), UpdateError> {
    let mut scanner = Scanner { input, pos: start };
    let value = scanner.value(None)?;
    Ok((scanner.pos, value))
}

/// Parse a compound starting at `start`. Errors if the character there is
/// not `{`.
pub fn parse_compound(input: &str, start: usize) -> Result<(usize, Compound), UpdateError> {
    let mut scanner = Scanner { input, pos: start };
    let map = scanner.compound()?;
    Ok((scanner.pos, map))
}

/// Parse a whole document of unknown shape: a compound if it starts like
/// one, otherwise a list. Used for JSON-like payloads where either form is
/// legal at the top level.
pub fn parse_document(input: &str) -> Result<Value, UpdateError> {
    let trimmed = input.trim();
    if let Ok((_, map)) = parse_compound(trimmed, 0) {
        return Ok(Value::Compound(map));
    }
    let mut scanner = Scanner {
        input: trimmed,
        pos: 0,
    };
    match scanner.list() {
        Ok(items) => Ok(Value::List(items)),
        Err(_) => Err(UpdateError::InvalidJson {
            text: trimmed.to_string(),
        }),
    }
}

impl<'a> Scanner<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn eat_char(&mut self, ch: char) -> bool {
        if self.peek_char() == Some(ch) {
            self.advance(ch);
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, ch: char) -> Result<(), UpdateError> {
        if self.eat_char(ch) {
            Ok(())
        } else {
            Err(UpdateError::ExpectedChar {
                expected: ch,
                found: self.peek_char(),
                offset: self.pos,
                text: self.input.to_string(),
            })
        }
    }

    // ── Values ──────────────────────────────────────────────────────

    /// `terminators` carries the separator set of the enclosing structure,
    /// or None at the top level (a bare scalar then runs to end of input).
    fn value(&mut self, terminators: Option<&[char]>) -> Result<Value, UpdateError> {
        match self.peek_char() {
            Some('{') => self.compound().map(Value::Compound),
            Some('[') => self.list().map(Value::List),
            Some('"') => self.quoted_scalar().map(Value::Scalar),
            _ => Ok(Value::Scalar(self.bare_scalar(terminators))),
        }
    }

    fn compound(&mut self) -> Result<Compound, UpdateError> {
        self.expect_char('{')?;

        let mut map = Compound::new();
        let mut first = true;
        loop {
            match self.peek_char() {
                None => {
                    return Err(UpdateError::UnterminatedCompound {
                        text: self.input.to_string(),
                    })
                }
                Some('}') => {
                    self.advance('}');
                    return Ok(map);
                }
                Some(_) => {}
            }

            if !first {
                self.expect_char(',')?;
                // A trailing comma before the closer is tolerated.
                if self.eat_char('}') {
                    return Ok(map);
                }
            }
            first = false;

            let key = self.key()?;
            let value = self.value(Some(&[',', '}']))?;
            map.insert(key, value);
        }
    }

    fn list(&mut self) -> Result<Vec<Value>, UpdateError> {
        self.expect_char('[')?;

        let mut items = Vec::new();
        let mut first = true;
        loop {
            match self.peek_char() {
                None => {
                    return Err(UpdateError::UnterminatedList {
                        text: self.input.to_string(),
                    })
                }
                Some(']') => {
                    self.advance(']');
                    return Ok(items);
                }
                Some(_) => {}
            }

            if !first {
                self.expect_char(',')?;
            }
            first = false;

            let value = self.value(Some(&[',', ']']))?;
            items.push(value);
        }
    }

    /// A key runs up to the `:` separator. Whitespace around and inside the
    /// key is skipped, not included.
    fn key(&mut self) -> Result<String, UpdateError> {
        let mut key = String::new();
        loop {
            match self.peek_char() {
                None => {
                    return Err(UpdateError::ExpectedChar {
                        expected: ':',
                        found: None,
                        offset: self.pos,
                        text: self.input.to_string(),
                    })
                }
                Some(':') => {
                    self.advance(':');
                    return Ok(key);
                }
                Some(ch) if ch.is_whitespace() => self.advance(ch),
                Some(ch) => {
                    key.push(ch);
                    self.advance(ch);
                }
            }
        }
    }

    /// A quoted scalar keeps its surrounding quotes and copies escape pairs
    /// verbatim; `\` never terminates the string and carries no meaning
    /// beyond shielding the next character.
    fn quoted_scalar(&mut self) -> Result<String, UpdateError> {
        self.expect_char('"')?;
        let mut token = String::from('"');
        loop {
            match self.peek_char() {
                None => {
                    return Err(UpdateError::UnterminatedString {
                        text: self.input.to_string(),
                    })
                }
                Some('\\') => {
                    self.advance('\\');
                    token.push('\\');
                    match self.peek_char() {
                        None => {
                            return Err(UpdateError::UnterminatedString {
                                text: self.input.to_string(),
                            })
                        }
                        Some(ch) => {
                            token.push(ch);
                            self.advance(ch);
                        }
                    }
                }
                Some('"') => {
                    self.advance('"');
                    token.push('"');
                    return Ok(token);
                }
                Some(ch) => {
                    token.push(ch);
                    self.advance(ch);
                }
            }
        }
    }

    /// A bare scalar runs until the separator set of the enclosing
    /// structure, accumulated exactly as written.
    fn bare_scalar(&mut self, terminators: Option<&[char]>) -> String {
        let mut token = String::new();
        while let Some(ch) = self.peek_char() {
            if let Some(stops) = terminators {
                if stops.contains(&ch) {
                    break;
                }
            }
            token.push(ch);
            self.advance(ch);
        }
        token
    }
}
