//! Defines the `Dialect` trait for database-specific SQL syntax.

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Renders a string literal that the server reads back byte for byte,
    /// control characters included.
    fn quote_literal(&self, value: &str) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn quote_literal(&self, value: &str) -> String {
        // Escape-string syntax keeps tabs and other control characters
        // readable regardless of standard_conforming_strings.
        let mut literal = String::with_capacity(value.len() + 3);
        literal.push_str("E'");
        for ch in value.chars() {
            match ch {
                '\\' => literal.push_str(r"\\"),
                '\'' => literal.push_str("''"),
                '\t' => literal.push_str(r"\t"),
                '\n' => literal.push_str(r"\n"),
                '\r' => literal.push_str(r"\r"),
                c if c.is_ascii_control() => literal.push_str(&format!("\\x{:02x}", c as u8)),
                c => literal.push(c),
            }
        }
        literal.push('\'');
        literal
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }
}
