use std::string::FromUtf8Error;

/// Escape a field for PostgreSQL's COPY text format.
///
/// Backslash and the line/field separators are written as backslash
/// sequences. The delimiter itself is escaped with a leading backslash so
/// that a field never splits the row, whatever delimiter the caller picked.
pub fn escape_copy_text(value: &str, delimiter: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => escaped.push_str(r"\n"),
            '\r' => escaped.push_str(r"\r"),
            '\t' => escaped.push_str(r"\t"),
            '\\' => escaped.push_str(r"\\"),
            '\0' => escaped.push_str(r"\000"),
            c if c == delimiter => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Reverse of [`escape_copy_text`], following the server's reading rules:
/// `\b \f \n \r \t \v`, octal `\NNN`, hex `\xHH`, and backslash followed by
/// any other character standing for that character.
///
/// Octal and hex escapes denote raw bytes, so the result is checked as
/// UTF-8 once every sequence is resolved.
pub fn unescape_copy_text(raw: &str) -> Result<String, FromUtf8Error> {
    let mut out = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut utf8 = [0u8; 4];

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            continue;
        }

        let Some(next) = chars.next() else {
            out.push(b'\\');
            break;
        };

        let byte = match next {
            'b' => 0x08,
            'f' => 0x0c,
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'v' => 0x0b,
            '0'..='7' => {
                let mut code = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                (code & 0xff) as u8
            }
            'x' if chars.peek().is_some_and(|c| c.is_ascii_hexdigit()) => {
                let mut code = 0;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            code = code * 16 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                code as u8
            }
            other => {
                out.extend_from_slice(other.encode_utf8(&mut utf8).as_bytes());
                continue;
            }
        };
        out.push(byte);
    }

    String::from_utf8(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape_copy_text("a\tb\nc\\d", '\t'), r"a\tb\nc\\d");
        assert_eq!(escape_copy_text("nul\0", '\t'), r"nul\000");
    }

    #[test]
    fn test_escape_custom_delimiter() {
        assert_eq!(escape_copy_text("a|b", '|'), r"a\|b");
        assert_eq!(escape_copy_text("a|b", '\t'), "a|b");
    }

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape_copy_text(r"a\tb\nc\\d").unwrap(), "a\tb\nc\\d");
        assert_eq!(unescape_copy_text(r"\101\x42\|").unwrap(), "AB|");
        assert_eq!(unescape_copy_text(r"\xzz").unwrap(), "xzz");
        assert_eq!(unescape_copy_text("trailing\\").unwrap(), "trailing\\");
    }

    #[test]
    fn test_unescape_multibyte_sequences() {
        assert_eq!(unescape_copy_text(r"caf\303\251").unwrap(), "café");
        assert_eq!(unescape_copy_text(r"caf\xc3\xa9").unwrap(), "café");
        assert_eq!(unescape_copy_text(r"\342\202\254 and é").unwrap(), "€ and é");
    }

    #[test]
    fn test_unescape_rejects_invalid_utf8() {
        assert!(unescape_copy_text(r"\377").is_err());
        assert!(unescape_copy_text(r"caf\303").is_err());
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let raw = "multi\nline\twith \\ and | pipes\r";
        assert_eq!(unescape_copy_text(&escape_copy_text(raw, '|')).unwrap(), raw);
    }
}
