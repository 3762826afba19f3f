use crate::error::{EtlError, Result};
use crate::table::Table;
use crate::transform::DESTINATION_COLUMNS;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

pub const DESTINATION_TABLE: &str = "titanic_passengers";

const MIGRATION_SQL: &str = include_str!("../migrations/001_create_titanic_passengers.sql");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { rows: usize },
    /// Nothing was extracted, so the destination was not touched
    Skipped,
    DryRun,
}

/// Open a connection to the destination database file.
pub fn connect<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    info!("🔌 Connecting to database at {}", path.display());
    Ok(Connection::open(path)?)
}

/// Create the destination table if it does not exist yet.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    info!("Running database migrations...");
    conn.execute_batch(MIGRATION_SQL)?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Replace the destination table's contents with `table`.
///
/// Absent input is a no-op and never opens a connection. The connection is
/// dropped (closed) on every return path.
#[instrument(skip_all, fields(db = %db_path.as_ref().display()))]
pub fn load<P: AsRef<Path>>(db_path: P, table: Option<&Table>) -> Result<LoadOutcome> {
    let Some(table) = table else {
        info!("No data to load, leaving destination untouched");
        return Ok(LoadOutcome::Skipped);
    };
    check_schema(table)?;

    let mut conn = connect(db_path)?;
    let rows = load_into(&mut conn, table)?;
    Ok(LoadOutcome::Loaded { rows })
}

/// Truncate and bulk insert inside one transaction on an open connection.
///
/// Any failure drops the uncommitted transaction, which rolls it back.
pub fn load_into(conn: &mut Connection, table: &Table) -> Result<usize> {
    check_schema(table)?;

    let tx = conn.transaction()?;
    let cleared = tx.execute(&format!("DELETE FROM {DESTINATION_TABLE}"), [])?;
    info!("🧹 Cleared {} existing rows from '{}'", cleared, DESTINATION_TABLE);

    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&insert_sql())?;
        for row in table.rows() {
            inserted += stmt.execute(params_from_iter(row))?;
        }
    }
    tx.commit()?;

    crate::metrics::load::rows_loaded(inserted);
    info!("💾 Inserted {} rows into '{}'", inserted, DESTINATION_TABLE);
    Ok(inserted)
}

fn check_schema(table: &Table) -> Result<()> {
    let found = table.column_names();
    if found != DESTINATION_COLUMNS {
        return Err(EtlError::SchemaMismatch {
            expected: DESTINATION_COLUMNS.iter().map(|c| c.to_string()).collect(),
            found: found.iter().map(|c| c.to_string()).collect(),
        });
    }
    Ok(())
}

fn insert_sql() -> String {
    let placeholders: Vec<String> = (1..=DESTINATION_COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        DESTINATION_TABLE,
        DESTINATION_COLUMNS.join(", "),
        placeholders.join(", ")
    )
}
