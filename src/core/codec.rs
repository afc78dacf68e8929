//! Purpose: Escape codec between raw text and the JSON wire form.
//! Exports: `encode`, `decode`.
//! Invariants: `decode(encode(s)) == s` for any string without a literal
//! backslash that happens to precede a recognized escape letter.

use crate::core::error::{Error, ErrorKind};

// Escape letters recognized at the start of a two-character sequence.
const ESCAPE_STARTERS: [char; 9] = ['\\', '/', '"', 'u', 'b', 'f', 'n', 'r', 't'];

/// Replaces `"` and the control characters with their two-character
/// escapes. A literal backslash is doubled unless it already starts a
/// recognized escape, in which case it passes through unchanged so that
/// pre-escaped input is not escaped twice.
pub fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => {
                if chars.peek().is_some_and(|next| ESCAPE_STARTERS.contains(next)) {
                    out.push('\\');
                } else {
                    out.push_str("\\\\");
                }
            }
            '\u{0008}' => out.push_str("\\b"),
            '\u{000c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Expands the two-character escapes and `\uXXXX` sequences into their
/// UTF-8 characters. Code points up to 0x7F take one byte, up to 0x7FF
/// two, up to 0xFFFF three; surrogate pairs are out of scope and the
/// surrogate range is rejected outright.
pub fn decode(escaped: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => out.push(decode_unicode(&mut chars)?),
            Some(other) => {
                return Err(Error::new(ErrorKind::UnexpectedCharacter)
                    .with_message(format!("unrecognized escape \\{other}")));
            }
            None => {
                return Err(Error::new(ErrorKind::UnexpectedCharacter)
                    .with_message("dangling backslash at end of input"));
            }
        }
    }
    Ok(out)
}

fn decode_unicode(chars: &mut std::str::Chars<'_>) -> Result<char, Error> {
    let mut code_point = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|ch| ch.to_digit(16))
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidUnicode)
                    .with_message("expected 4 hex digits after \\u")
            })?;
        code_point = code_point * 16 + digit;
    }
    char::from_u32(code_point).ok_or_else(|| {
        Error::new(ErrorKind::InvalidUnicode)
            .with_message(format!("code point {code_point:#06x} is not a scalar value"))
    })
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::core::error::ErrorKind;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(encode("hello world"), "hello world");
        assert_eq!(decode("hello world").expect("decode"), "hello world");
    }

    #[test]
    fn control_characters_round_trip() {
        let raw = "a\"b\\c\nd\te\rf\u{0008}g\u{000c}h";
        let escaped = encode(raw);
        assert_eq!(escaped, "a\\\"b\\\\c\\nd\\te\\rf\\bg\\fh");
        assert_eq!(decode(&escaped).expect("decode"), raw);
    }

    #[test]
    fn pre_escaped_sequences_are_not_doubled() {
        // The backslash already starts \n, so encode leaves it alone.
        assert_eq!(encode("a\\nb"), "a\\nb");
        // \q is not a recognized escape, so the backslash is doubled.
        assert_eq!(encode("a\\qb"), "a\\\\qb");
    }

    #[test]
    fn unicode_escapes_expand_to_utf8() {
        assert_eq!(decode("\\u0041").expect("ascii"), "A");
        let two_byte = decode("\\u00e9").expect("two byte");
        assert_eq!(two_byte, "é");
        assert_eq!(two_byte.len(), 2);
        let three_byte = decode("\\u4e2d").expect("three byte");
        assert_eq!(three_byte, "中");
        assert_eq!(three_byte.len(), 3);
    }

    #[test]
    fn invalid_unicode_digits_are_rejected() {
        let err = decode("\\u12G4").expect_err("non-hex digit");
        assert_eq!(err.kind(), ErrorKind::InvalidUnicode);

        let err = decode("\\u00").expect_err("truncated digits");
        assert_eq!(err.kind(), ErrorKind::InvalidUnicode);

        let err = decode("\\ud800").expect_err("surrogate");
        assert_eq!(err.kind(), ErrorKind::InvalidUnicode);
    }

    #[test]
    fn unknown_escape_letter_is_rejected() {
        let err = decode("\\q").expect_err("unknown escape");
        assert_eq!(err.kind(), ErrorKind::UnexpectedCharacter);

        let err = decode("tail\\").expect_err("dangling backslash");
        assert_eq!(err.kind(), ErrorKind::UnexpectedCharacter);
    }
}
