use crate::error::{EtlError, Result};
use crate::table::{Table, Value};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Header names the input file must carry.
pub const SOURCE_COLUMNS: [&str; 12] = [
    "PassengerId",
    "Survived",
    "Pclass",
    "Name",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Ticket",
    "Fare",
    "Cabin",
    "Embarked",
];

/// Read the passenger CSV at `path`.
///
/// Returns `Ok(None)` when the file does not exist; every other failure is an error.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Option<Table>> {
    let path = path.as_ref();
    info!("📂 Starting extraction from {}", path.display());

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Input file not found at '{}'", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let table = read_table(file)?;
    crate::metrics::extract::rows_extracted(table.row_count());
    info!("✅ Extracted {} rows", table.row_count());
    Ok(Some(table))
}

/// Parse CSV from any reader into a table, checking the header.
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let names: Vec<&str> = headers.iter().map(str::trim).collect();
    if let Some(missing) = SOURCE_COLUMNS.iter().find(|c| !names.contains(*c)) {
        return Err(EtlError::MissingColumn(missing.to_string()));
    }

    let mut table = Table::with_header(names);
    for result in rdr.records() {
        let record = result?;
        table.push_row(record.iter().map(Value::parse).collect())?;
    }
    Ok(table)
}
