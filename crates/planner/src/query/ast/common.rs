use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Splits `schema.table` into its parts; a bare name has no schema.
    pub fn from_qualified(name: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => TableRef {
                schema: Some(schema.to_string()),
                name: table.to_string(),
            },
            _ => TableRef {
                schema: None,
                name: name.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TableRef;

    #[test]
    fn test_from_qualified() {
        let table = TableRef::from_qualified("public.eek");
        assert_eq!(table.schema.as_deref(), Some("public"));
        assert_eq!(table.name, "eek");

        let table = TableRef::from_qualified("eek");
        assert_eq!(table.schema, None);
        assert_eq!(table.name, "eek");
    }
}
