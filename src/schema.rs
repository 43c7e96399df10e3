use rusqlite::Connection;

use crate::errors::KvGraphError;

pub const KV_TABLE: &str = "kv";

pub fn ensure_schema(conn: &Connection) -> Result<(), KvGraphError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY NOT NULL,
            value BLOB NOT NULL
        ) WITHOUT ROWID;
        "#,
    )
    .map_err(|e| KvGraphError::connection(format!("creating {KV_TABLE} table: {e}")))?;
    Ok(())
}
