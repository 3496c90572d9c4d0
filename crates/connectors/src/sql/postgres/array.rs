//! Postgres array literals: `{1,2,3}`, `{{a,b},{c,d}}`, `{"x y",NULL}`.

use crate::sql::{base::error::DecodeError, postgres::encoder::PgCopyValueEncoder};
use model::core::value::Value;
use std::{iter::Peekable, str::Chars};

/// Renders values as an array literal. Nested arrays become nested braces;
/// elements are quoted only when the server would otherwise misread them.
pub fn encode_array_literal(items: &[Value]) -> String {
    let mut literal = String::from('{');
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            literal.push(',');
        }
        match item {
            Value::Null => literal.push_str("NULL"),
            Value::Array(inner) => literal.push_str(&encode_array_literal(inner)),
            other => push_array_item(&mut literal, &PgCopyValueEncoder::value_text(other)),
        }
    }
    literal.push('}');
    literal
}

fn push_array_item(literal: &mut String, item: &str) {
    if !needs_quotes(item) {
        literal.push_str(item);
        return;
    }

    literal.push('"');
    for ch in item.chars() {
        if matches!(ch, '"' | '\\') {
            literal.push('\\');
        }
        literal.push(ch);
    }
    literal.push('"');
}

fn needs_quotes(item: &str) -> bool {
    item.is_empty()
        || item.eq_ignore_ascii_case("NULL")
        || item
            .chars()
            .any(|c| matches!(c, '{' | '}' | ',' | '"' | '\\') || c.is_whitespace())
}

/// One parsed element of an array literal, before typing.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayNode {
    Null,
    Item(String),
    Array(Vec<ArrayNode>),
}

/// Parses an array literal into its element tree.
pub fn parse_array_literal(literal: &str) -> Result<Vec<ArrayNode>, DecodeError> {
    let mut parser = ArrayParser {
        literal,
        chars: literal.chars().peekable(),
    };

    parser.skip_whitespace();
    parser.expect('{')?;
    let items = parser.parse_items()?;
    parser.skip_whitespace();

    match parser.chars.next() {
        None => Ok(items),
        Some(c) => Err(parser.error(format!("unexpected '{c}' after closing brace"))),
    }
}

struct ArrayParser<'a> {
    literal: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl ArrayParser<'_> {
    /// Parses elements up to and including the closing brace of the current
    /// level; the opening brace has already been consumed.
    fn parse_items(&mut self) -> Result<Vec<ArrayNode>, DecodeError> {
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.chars.peek() == Some(&'}') {
            self.chars.next();
            return Ok(items);
        }

        loop {
            self.skip_whitespace();
            let node = match self.chars.peek() {
                Some('{') => {
                    self.chars.next();
                    ArrayNode::Array(self.parse_items()?)
                }
                Some('"') => {
                    self.chars.next();
                    ArrayNode::Item(self.parse_quoted()?)
                }
                Some(_) => {
                    let raw = self.parse_unquoted()?;
                    if raw.eq_ignore_ascii_case("NULL") {
                        ArrayNode::Null
                    } else {
                        ArrayNode::Item(raw)
                    }
                }
                None => return Err(self.error("unterminated array")),
            };
            items.push(node);

            self.skip_whitespace();
            match self.chars.next() {
                Some(',') => continue,
                Some('}') => return Ok(items),
                Some(c) => return Err(self.error(format!("unexpected '{c}' between elements"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_quoted(&mut self) -> Result<String, DecodeError> {
        let mut item = String::new();
        loop {
            match self.chars.next() {
                Some('\\') => match self.chars.next() {
                    Some(c) => item.push(c),
                    None => return Err(self.error("dangling escape in quoted element")),
                },
                Some('"') => return Ok(item),
                Some(c) => item.push(c),
                None => return Err(self.error("unterminated quoted element")),
            }
        }
    }

    fn parse_unquoted(&mut self) -> Result<String, DecodeError> {
        let mut item = String::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                ',' | '}' => break,
                '{' | '"' => return Err(self.error(format!("unexpected '{c}' in element"))),
                '\\' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some(escaped) => item.push(escaped),
                        None => return Err(self.error("dangling escape in element")),
                    }
                }
                _ => {
                    item.push(c);
                    self.chars.next();
                }
            }
        }

        let trimmed = item.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(self.error("empty unquoted element"));
        }
        Ok(trimmed)
    }

    fn expect(&mut self, expected: char) -> Result<(), DecodeError> {
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            _ => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn error(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::InvalidArray {
            literal: self.literal.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(s: &str) -> ArrayNode {
        ArrayNode::Item(s.to_string())
    }

    #[test]
    fn test_encode_quotes_only_when_needed() {
        let values = vec![
            Value::from("plain"),
            Value::from("with space"),
            Value::from(""),
            Value::from("null"),
            Value::from(r#"q"uote"#),
            Value::from("a,b"),
            Value::Null,
        ];
        assert_eq!(
            encode_array_literal(&values),
            r#"{plain,"with space","","null","q\"uote","a,b",NULL}"#
        );
    }

    #[test]
    fn test_encode_nested_and_empty() {
        assert_eq!(encode_array_literal(&[]), "{}");
        let nested = Value::from(vec![vec![1, 2], vec![3, 4]]);
        let Value::Array(items) = nested else {
            panic!("expected array");
        };
        assert_eq!(encode_array_literal(&items), "{{1,2},{3,4}}");
    }

    #[test]
    fn test_parse_flat() {
        assert_eq!(
            parse_array_literal("{1,2,3}").unwrap(),
            vec![item("1"), item("2"), item("3")]
        );
        assert_eq!(parse_array_literal("{}").unwrap(), vec![]);
        assert_eq!(parse_array_literal(" { } ").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_quoted_and_null() {
        assert_eq!(
            parse_array_literal(r#"{"a b",NULL,"NULL","x\"y",  z  }"#).unwrap(),
            vec![
                item("a b"),
                ArrayNode::Null,
                item("NULL"),
                item(r#"x"y"#),
                item("z")
            ]
        );
    }

    #[test]
    fn test_parse_nested() {
        assert_eq!(
            parse_array_literal("{{1,2},{3,4}}").unwrap(),
            vec![
                ArrayNode::Array(vec![item("1"), item("2")]),
                ArrayNode::Array(vec![item("3"), item("4")]),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for literal in ["1,2", "{1,2", "{1,,2}", r#"{"open}"#, "{1}x", "{a{b}"] {
            assert!(
                matches!(
                    parse_array_literal(literal),
                    Err(DecodeError::InvalidArray { .. })
                ),
                "{literal} should be rejected"
            );
        }
    }
}
