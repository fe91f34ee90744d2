use rusqlite::{Connection, ErrorCode, Transaction};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::{Error, Result};
use crate::files::{check_destination, publish, read_json, staging_file};
use crate::parser::{parse_record, ParsedRow};
use crate::schema::{DependencyResolver, TableSchema, ALL_TABLES};
use crate::ui::{Phase, Ui};

/// Rows between progress updates
const PROGRESS_INTERVAL: u64 = 1000;

/// Rows inserted per table, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub tables: Vec<(String, u64)>,
}

impl LoadReport {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, n)| n).sum()
    }

    pub fn rows_in(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, n)| *n)
    }
}

/// A table together with its parsed rows
pub type TableRows = (&'static TableSchema, Vec<ParsedRow>);

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open a database at `db_path` with foreign-key enforcement on
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        let enforced: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if enforced != 1 {
            return Err(Error::Schema(
                "this SQLite build cannot enforce foreign keys".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    /// Create all tables for the given schemas
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        debug!(tables = schemas.len(), "creating tables");

        for schema in schemas {
            let sql = generate_create_table(schema);
            self.conn.execute_batch(&sql).map_err(|e| {
                Error::Schema(format!("failed to create table {}: {}", schema.name, e))
            })?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute_batch(&index_sql).map_err(|e| {
                    Error::Schema(format!("failed to create index for {}: {}", schema.name, e))
                })?;
            }
        }

        Ok(())
    }

    /// Insert every table's rows in the given order, in one transaction.
    ///
    /// Any failing row rolls back the whole load.
    pub fn insert_all(&mut self, tables: &[TableRows], ui: &mut impl Ui) -> Result<LoadReport> {
        let tx = self.conn.transaction()?;
        let mut report = LoadReport::default();

        for (schema, rows) in tables {
            let count = insert_table(&tx, schema, rows, ui)?;
            debug!(table = schema.name, rows = count, "inserted");
            report.tables.push((schema.name.to_string(), count));
        }

        tx.commit()?;
        Ok(report)
    }

    /// Optimize and close the connection
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        self.conn.close().map_err(|(_, e)| Error::Sqlite(e))
    }
}

fn insert_table(
    tx: &Transaction,
    schema: &TableSchema,
    rows: &[ParsedRow],
    ui: &mut impl Ui,
) -> Result<u64> {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut stmt = tx.prepare_cached(&insert_sql)?;
    let total = rows.len() as u64;
    let mut count: u64 = 0;

    for (idx, row) in rows.iter().enumerate() {
        let result = row
            .values
            .iter()
            .enumerate()
            .try_for_each(|(i, value)| value.bind_to(i + 1, &mut stmt))
            .and_then(|_| stmt.raw_execute());

        if let Err(e) = result {
            return Err(integrity_error(e, schema, idx, row));
        }

        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            ui.set_progress(count, total, schema.name);
        }
    }

    ui.set_progress(count, total, schema.name);
    Ok(count)
}

/// Attach table and row context to constraint failures
fn integrity_error(err: rusqlite::Error, schema: &TableSchema, row: usize, parsed: &ParsedRow) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(code, message) if code.code == ErrorCode::ConstraintViolation => {
            Error::Integrity {
                table: schema.name.to_string(),
                row,
                values: parsed.describe(schema),
                message: message.clone().unwrap_or_else(|| code.to_string()),
            }
        }
        _ => Error::Sqlite(err),
    }
}

/// Parse and type-check every section of a flat document before anything
/// is written. Sections absent from the document are loaded as empty.
pub fn parse_document(doc: &Value, order: &[&'static TableSchema]) -> Result<Vec<TableRows>> {
    let sections = doc.as_object().ok_or_else(|| Error::MalformedDocument {
        table: "(document)".to_string(),
        row: 0,
        message: "expected an object with one array per table".to_string(),
    })?;

    if let Some(unknown) = sections
        .keys()
        .find(|k| !order.iter().any(|t| t.name == k.as_str()))
    {
        return Err(Error::MalformedDocument {
            table: unknown.clone(),
            row: 0,
            message: "no such table in the schema".to_string(),
        });
    }

    let mut parsed = Vec::with_capacity(order.len());
    for schema in order {
        let rows = match sections.get(schema.name) {
            None | Some(Value::Null) => {
                warn!(table = schema.name, "section missing from document; loading no rows");
                Vec::new()
            }
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(row, item)| {
                    parse_record(item, schema).map_err(|message| Error::MalformedDocument {
                        table: schema.name.to_string(),
                        row,
                        message,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::MalformedDocument {
                    table: schema.name.to_string(),
                    row: 0,
                    message: "section must be an array of rows".to_string(),
                })
            }
        };
        parsed.push((*schema, rows));
    }

    Ok(parsed)
}

/// Load a flat document into a new database at `output_db`.
///
/// The database is assembled in a staging file and only renamed onto
/// `output_db` after every row has been committed.
pub fn load_document(
    doc: &Value,
    tables: &[&'static TableSchema],
    output_db: &Path,
    force: bool,
    ui: &mut impl Ui,
) -> Result<LoadReport> {
    check_destination(output_db, force)?;

    let order = DependencyResolver::new(tables)?.insertion_order()?;
    let parsed = parse_document(doc, &order)?;

    let staged = staging_file(output_db)?;
    let mut writer = SqliteWriter::open(staged.path())?;

    ui.set_phase(Phase::CreatingSchema);
    writer.create_tables(&order)?;

    ui.set_phase(Phase::Loading);
    let report = writer.insert_all(&parsed, ui)?;
    writer.finalize()?;

    publish(staged, output_db, force)?;

    info!(
        output = %output_db.display(),
        rows = report.total_rows(),
        "database written"
    );
    Ok(report)
}

/// Read a flat document file and load it with the built-in schema
pub fn load_file(
    input: &Path,
    output_db: &Path,
    force: bool,
    ui: &mut impl Ui,
) -> Result<LoadReport> {
    check_destination(output_db, force)?;

    ui.set_phase(Phase::Reading);
    let doc = read_json(input)?;
    load_document(&doc, ALL_TABLES, output_db, force, ui)
}
