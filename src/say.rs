use once_cell::sync::Lazy;
use regex::Regex;

use crate::formatter::{SayMode, Updater};

const BOLD: u8 = 0b00001;
const OBFUSCATED: u8 = 0b00010;
const STRIKETHROUGH: u8 = 0b00100;
const UNDERLINED: u8 = 0b01000;
const ITALIC: u8 = 0b10000;

const STYLE_FIELDS: [(u8, &str); 5] = [
    (BOLD, "bold"),
    (OBFUSCATED, "obfuscated"),
    (STRIKETHROUGH, "strikethrough"),
    (UNDERLINED, "underlined"),
    (ITALIC, "italic"),
];

const COLOR_RESET: usize = 16;

/// Color names indexed by their legacy code, `§0` through `§f`, with
/// `reset` at the end for `§r`.
const COLOR_NAMES: [&str; 17] = [
    "black",
    "dark_blue",
    "dark_green",
    "dark_aqua",
    "dark_red",
    "dark_purple",
    "gold",
    "gray",
    "dark_gray",
    "blue",
    "green",
    "aqua",
    "red",
    "light_purple",
    "yellow",
    "white",
    "reset",
];

fn color_code(code: char) -> Option<usize> {
    match code {
        '0'..='9' => Some(code as usize - '0' as usize),
        'a'..='f' => Some(code as usize - 'a' as usize + 10),
        'r' => Some(COLOR_RESET),
        _ => None,
    }
}

fn style_bit(code: char) -> Option<u8> {
    match code {
        'l' => Some(BOLD),
        'k' => Some(OBFUSCATED),
        'm' => Some(STRIKETHROUGH),
        'n' => Some(UNDERLINED),
        'o' => Some(ITALIC),
        _ => None,
    }
}

/// A candidate target selector embedded in chat text. The regex alone
/// over-matches; `selector_end` trims it to a real word boundary.
static CHAT_SELECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[apre](?:\[(?:\w+=\w+(?:,\w+=\w+)*)?\])?").unwrap());

enum Piece {
    Text(String),
    Selector(String),
}

/// Split one formatting run into literal text and selector pieces. A bare
/// `@p` in the middle of a word is not a selector; it must be followed by
/// whitespace, end of text, or carry an argument list.
fn split_selectors(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = 0;
    for m in CHAT_SELECTOR.find_iter(text) {
        let end = m.end();
        let bounded = m.as_str().ends_with(']')
            || text[end..].chars().next().map_or(true, char::is_whitespace);
        if !bounded {
            continue;
        }
        if m.start() > rest {
            pieces.push(Piece::Text(text[rest..m.start()].to_string()));
        }
        pieces.push(Piece::Selector(m.as_str().to_string()));
        rest = end;
    }
    if rest < text.len() {
        pieces.push(Piece::Text(text[rest..].to_string()));
    }
    pieces
}

/// Split a chat line on `§` formatting codes into runs of
/// `(color index, style bits, text)`. Styles accumulate until a color code
/// resets them.
fn split_codes(value: &str) -> Vec<(usize, u8, String)> {
    let mut runs = Vec::new();
    let mut color = COLOR_RESET;
    let mut styles = 0u8;
    let mut parts = value.split('§');
    if let Some(first) = parts.next() {
        runs.push((color, styles, first.to_string()));
    }
    for part in parts {
        let mut chars = part.chars();
        match chars.next() {
            Some(code) => {
                if let Some(bit) = style_bit(code) {
                    styles |= bit;
                } else if let Some(index) = color_code(code) {
                    color = index;
                    styles = 0;
                }
                let rest = chars.as_str();
                if !rest.is_empty() {
                    runs.push((color, styles, rest.to_string()));
                }
            }
            None => continue,
        }
    }
    runs
}

fn escape_json(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Updater {
    /// Render a `/say` line as a `/tellraw` command, carrying legacy `§`
    /// formatting codes over as component fields and promoting embedded
    /// selectors to selector components.
    pub(crate) fn say_to_tellraw(&self, value: &str) -> String {
        let mut objects = Vec::new();
        for (color, styles, text) in split_codes(value) {
            let mut fields = Vec::new();
            for (bit, name) in STYLE_FIELDS {
                if styles & bit != 0 {
                    fields.push(format!("\"{}\":true", name));
                }
            }
            fields.push(format!("\"color\":\"{}\"", COLOR_NAMES[color]));
            for piece in split_selectors(&text) {
                let mut fields = fields.clone();
                match piece {
                    Piece::Selector(sel) => {
                        fields.push(format!("\"selector\":\"{}\"", sel));
                    }
                    Piece::Text(text) => match self.options().say_mode {
                        SayMode::Translate => {
                            let placeholders = text.matches('=').count();
                            let escaped = escape_json(&text.replace('%', "%%"))
                                .replace('=', "%s");
                            fields.push(format!("\"translate\":\"{}\"", escaped));
                            if placeholders > 0 {
                                let with = vec!["\"=\""; placeholders].join(",");
                                fields.push(format!("\"with\":[{}]", with));
                            }
                        }
                        _ => {
                            fields.push(format!("\"text\":\"{}\"", escape_json(&text)));
                        }
                    },
                }
                objects.push(format!("{{{}}}", fields.join(",")));
            }
        }
        format!("/tellraw @a [\"\",{}]", objects.join(","))
    }
}
