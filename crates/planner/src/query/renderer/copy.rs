use crate::query::ast::copy::{Copy, CopyDirection, CopyEndpoint, CopyOptionValue};
use crate::query::renderer::Render;

impl Render for Copy {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("COPY ");
        r.render_table_ref(&self.table);

        if !self.columns.is_empty() {
            r.sql.push_str(" (");
            let cols: Vec<String> = self
                .columns
                .iter()
                .map(|col| r.dialect.quote_identifier(col))
                .collect();
            r.sql.push_str(&cols.join(", "));
            r.sql.push(')');
        }

        match self.direction {
            CopyDirection::From => r.sql.push_str(" FROM "),
            CopyDirection::To => r.sql.push_str(" TO "),
        }

        match &self.endpoint {
            CopyEndpoint::Stdin => r.sql.push_str("STDIN"),
            CopyEndpoint::Stdout => r.sql.push_str("STDOUT"),
        }

        if !self.options.is_empty() {
            r.sql.push_str(" WITH (");
            for (i, option) in self.options.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                r.sql.push_str(&option.key);
                match &option.value {
                    Some(CopyOptionValue::Keyword(value)) => {
                        r.sql.push(' ');
                        r.sql.push_str(value);
                    }
                    Some(CopyOptionValue::Literal(value)) => {
                        r.sql.push(' ');
                        let quoted = r.dialect.quote_literal(value);
                        r.sql.push_str(&quoted);
                    }
                    None => {}
                }
            }
            r.sql.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::TableRef,
            copy::{CopyDirection, CopyEndpoint},
        },
        builder::copy::CopyBuilder,
        dialect::Postgres,
        renderer::{Render, Renderer, render_sql},
    };

    #[test]
    fn test_render_copy_from_stdin() {
        let copy = CopyBuilder::new(TableRef {
            schema: Some("public".to_string()),
            name: "eek".to_string(),
        })
        .columns(&["label", "data"])
        .direction(CopyDirection::From)
        .endpoint(CopyEndpoint::Stdin)
        .option("FORMAT", Some("text"))
        .build();

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        copy.render(&mut renderer);
        let sql = renderer.finish();

        assert_eq!(
            sql,
            r#"COPY "public"."eek" ("label", "data") FROM STDIN WITH (FORMAT text)"#
        );
    }

    #[test]
    fn test_render_copy_with_literal_options() {
        let copy = CopyBuilder::new(crate::table_ref!("eek"))
            .columns(&["label"])
            .option("FORMAT", Some("text"))
            .literal_option("DELIMITER", "\t")
            .literal_option("NULL", r"\N")
            .build();

        assert_eq!(
            render_sql(&copy, &Postgres),
            r#"COPY "eek" ("label") FROM STDIN WITH (FORMAT text, DELIMITER E'\t', NULL E'\\N')"#
        );
    }

    #[test]
    fn test_render_copy_to_stdout_without_columns() {
        let copy = CopyBuilder::new(crate::table_ref!("public", "eek"))
            .direction(CopyDirection::To)
            .endpoint(CopyEndpoint::Stdout)
            .build();

        assert_eq!(render_sql(&copy, &Postgres), r#"COPY "public"."eek" TO STDOUT"#);
    }
}
