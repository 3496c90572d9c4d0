#![allow(dead_code)]

use connectors::sql::{base::adapter::SqlAdapter, postgres::adapter::PgAdapter};
use std::env;
use tracing::warn;

/// Binds a connected adapter or returns from the enclosing test.
macro_rules! pg_or_skip {
    () => {
        match crate::pg_adapter().await {
            Some(adapter) => adapter,
            None => return,
        }
    };
}

pub mod utils;

/// Connection string of the scratch database the tests create tables in.
const TEST_PG_URL_VAR: &str = "COPYFY_TEST_PG_URL";

/// Connects to the test database. Returns `None` when no test database is
/// configured so the calling test can bail out early.
async fn pg_adapter() -> Option<PgAdapter> {
    match env::var(TEST_PG_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => {
            Some(PgAdapter::connect(&url).await.expect("connect postgres"))
        }
        _ => {
            warn!("{TEST_PG_URL_VAR} is not set, skipping live database test");
            None
        }
    }
}

/// Drop & recreate `table` from a DDL template whose `{table}` placeholder
/// is replaced with the table name.
async fn recreate_table(adapter: &PgAdapter, table: &str, ddl: &str) {
    adapter
        .exec(&format!("DROP TABLE IF EXISTS {table};"))
        .await
        .expect("drop test table");
    adapter
        .exec(&ddl.replace("{table}", table))
        .await
        .expect("create test table");
}
