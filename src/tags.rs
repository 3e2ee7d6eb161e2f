//! Parser for field tag strings.
//!
//! A tag string is a space-separated list of `key:"value"` pairs, e.g.
//! `len:"3" sep:"\x1c" padding:"0"`. Values are quoted and may contain
//! escape sequences.
//!
//! Values are text, not bytes: `\xHH` denotes the code point U+00HH. A
//! separator written `\xff` therefore matches the UTF-8 encoding of U+00FF
//! (`C3 BF`) in the input, not a raw `0xFF` byte. Only escapes up to `\x7f`
//! match a single byte.

use std::collections::HashMap;

/// Attribute names understood by the schema resolver.
pub const TYPE: &str = "type";
pub const LEN: &str = "len";
pub const SEP: &str = "sep";
pub const PADDING: &str = "padding";
pub const COUNT: &str = "count";

/// A flat mapping from attribute name to its unescaped value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    attrs: HashMap<String, String>,
}

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tag string. On a malformed tag the error is a human-readable
    /// reason; callers attach the record and field it belongs to.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut attrs = HashMap::new();
        let mut rest = text.trim_start();

        while !rest.is_empty() {
            let colon = rest
                .find(':')
                .ok_or_else(|| format!("Missing ':' in tag: {}", rest))?;
            let key = &rest[..colon];
            if key.is_empty() || key.contains(char::is_whitespace) || key.contains('"') {
                return Err(format!("Invalid tag key: {:?}", key));
            }

            let after = &rest[colon + 1..];
            let (value, consumed) = Self::parse_quoted(after)?;

            // First occurrence wins
            attrs.entry(key.to_string()).or_insert(value);
            rest = after[consumed..].trim_start();
        }

        Ok(Self { attrs })
    }

    /// Parse a quoted value at the start of `text`.
    /// Returns the unescaped value and the number of bytes consumed.
    fn parse_quoted(text: &str) -> std::result::Result<(String, usize), String> {
        let mut chars = text.char_indices();
        match chars.next() {
            Some((_, '"')) => {}
            _ => return Err(format!("Tag value must be quoted: {}", text)),
        }

        let mut value = String::new();
        while let Some((pos, c)) = chars.next() {
            match c {
                '"' => return Ok((value, pos + 1)),
                '\\' => {
                    let (_, esc) = chars
                        .next()
                        .ok_or_else(|| "Unterminated escape in tag value".to_string())?;
                    match esc {
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        '0' => value.push('\0'),
                        'x' => {
                            let code = Self::take_hex(&mut chars, 2)?;
                            value.push(Self::to_char(code)?);
                        }
                        'u' => {
                            let code = if text[pos + 2..].starts_with('{') {
                                chars.next();
                                let mut digits = String::new();
                                loop {
                                    match chars.next() {
                                        Some((_, '}')) => break,
                                        Some((_, d)) => digits.push(d),
                                        None => {
                                            return Err("Unterminated \\u{...} escape".to_string())
                                        }
                                    }
                                }
                                u32::from_str_radix(&digits, 16)
                                    .map_err(|_| format!("Invalid \\u{{{}}} escape", digits))?
                            } else {
                                Self::take_hex(&mut chars, 4)?
                            };
                            value.push(Self::to_char(code)?);
                        }
                        other => return Err(format!("Unknown escape '\\{}' in tag value", other)),
                    }
                }
                _ => value.push(c),
            }
        }

        Err(format!("Unterminated tag value: {}", text))
    }

    fn take_hex(chars: &mut std::str::CharIndices<'_>, n: usize) -> std::result::Result<u32, String> {
        let digits: String = chars.by_ref().take(n).map(|(_, c)| c).collect();
        if digits.len() != n {
            return Err(format!("Truncated hex escape: {:?}", digits));
        }
        u32::from_str_radix(&digits, 16).map_err(|_| format!("Invalid hex escape: {:?}", digits))
    }

    fn to_char(code: u32) -> std::result::Result<char, String> {
        char::from_u32(code).ok_or_else(|| format!("Invalid code point U+{:04X}", code))
    }

    /// Sets an attribute, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Returns true if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
