use std::borrow::Cow;

use crate::error::{
    FeatureTreeError,
    Result,
};

fn needs_escape(
    byte: u8,
    attribute: bool,
) -> bool {
    matches!(byte, 0x00..=0x1E | b'%' | 0x7F)
        || (attribute && matches!(byte, b';' | b'=' | b'&' | b','))
}

/// Escapes control bytes, `%` and DEL as upper-case `%XX`. With
/// `attribute` set, `; = & ,` are escaped as well.
pub fn percent_encode(
    text: &str,
    attribute: bool,
) -> Cow<'_, str> {
    if !text.bytes().any(|b| needs_escape(b, attribute)) {
        return Cow::Borrowed(text);
    }
    let mut encoded = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if ch.is_ascii() && needs_escape(ch as u8, attribute) {
            encoded.push_str(&format!("%{:02X}", ch as u8));
        }
        else {
            encoded.push(ch);
        }
    }
    Cow::Owned(encoded)
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Reverses [`percent_encode`]. Hex digits of either case are accepted; a
/// `%` that is not followed by two hex digits is kept as is.
pub fn percent_decode(text: &str) -> Result<String> {
    if !text.contains('%') {
        return Ok(text.to_string());
    }
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        let escaped = match bytes[idx] {
            b'%' => {
                bytes
                    .get(idx + 1)
                    .and_then(|hi| hex_value(*hi))
                    .zip(bytes.get(idx + 2).and_then(|lo| hex_value(*lo)))
            },
            _ => None,
        };
        match escaped {
            Some((hi, lo)) => {
                decoded.push(hi << 4 | lo);
                idx += 3;
            },
            None => {
                decoded.push(bytes[idx]);
                idx += 1;
            },
        }
    }
    String::from_utf8(decoded).map_err(|_| {
        FeatureTreeError::Encoding {
            text: text.to_string(),
        }
    })
}
