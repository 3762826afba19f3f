//! In-memory columnar table shared by the extract, transform and load stages.

use crate::error::{EtlError, Result};
use rusqlite::types::{Null, ToSql, ToSqlOutput};
use std::fmt;

/// Field contents treated as missing, in addition to the empty string.
pub const NA_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Infer a cell from a raw CSV field.
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() || NA_MARKERS.contains(&field) {
            return Value::Missing;
        }
        if let Ok(i) = field.parse::<i64>() {
            return Value::Int(i);
        }
        match field.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            _ => Value::Text(field.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "<missing>"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Missing => ToSqlOutput::from(Null),
            Value::Int(i) => ToSqlOutput::from(*i),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Replace every value through a fixed integer-code mapping.
    ///
    /// Integral floats such as `1.0` match their integer code. A value outside
    /// the mapping (including a missing one) is an error and leaves the column
    /// untouched.
    pub fn recode(&mut self, mapping: &[(i64, &str)]) -> Result<()> {
        let mut recoded = Vec::with_capacity(self.values.len());
        for (row, value) in self.values.iter().enumerate() {
            let code = match value {
                Value::Int(code) => Some(*code),
                Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
                _ => None,
            };
            let label = code.and_then(|code| {
                mapping
                    .iter()
                    .find(|(known, _)| *known == code)
                    .map(|(_, label)| *label)
            });
            match label {
                Some(label) => recoded.push(Value::Text(label.to_string())),
                None => {
                    return Err(EtlError::UnmappedValue {
                        column: self.name.clone(),
                        row,
                        value: value.to_string(),
                    })
                }
            }
        }
        self.values = recoded;
        Ok(())
    }

    /// Arithmetic mean of the observed values; `None` when nothing is observed.
    pub fn mean(&self) -> Result<Option<f64>> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for (row, value) in self.values.iter().enumerate() {
            if value.is_missing() {
                continue;
            }
            let x = value.as_f64().ok_or_else(|| EtlError::NonNumeric {
                column: self.name.clone(),
                row,
                value: value.to_string(),
            })?;
            sum += x;
            count += 1;
        }
        Ok((count > 0).then(|| sum / count as f64))
    }

    /// Most frequent observed value. Ties go to the value seen first.
    pub fn mode(&self) -> Option<Value> {
        let mut counts: Vec<(&Value, usize)> = Vec::new();
        for value in self.values.iter().filter(|v| !v.is_missing()) {
            match counts.iter_mut().find(|(seen, _)| *seen == value) {
                Some((_, n)) => *n += 1,
                None => counts.push((value, 1)),
            }
        }

        let mut best: Option<(&Value, usize)> = None;
        for (value, n) in counts {
            if best.map_or(true, |(_, top)| n > top) {
                best = Some((value, n));
            }
        }
        best.map(|(value, _)| value.clone())
    }

    /// Fill missing cells with `fill`, returning how many were filled.
    pub fn fill_missing(&mut self, fill: &Value) -> usize {
        let mut filled = 0;
        for value in self.values.iter_mut().filter(|v| v.is_missing()) {
            *value = fill.clone();
            filled += 1;
        }
        filled
    }
}

/// Ordered named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build an empty table with the given header.
    pub fn with_header<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names
                .into_iter()
                .map(|name| Column::new(name, Vec::new()))
                .collect(),
        }
    }

    /// Append one row; `row` must have one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::Shape(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.values.push(value);
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    }

    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            if !self.has_column(name) {
                return Err(EtlError::MissingColumn(name.to_string()));
            }
        }
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
        Ok(())
    }

    /// Rename columns through `(from, to)` pairs. Unlisted columns keep their names.
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) -> Result<()> {
        for (from, _) in renames {
            if !self.has_column(from) {
                return Err(EtlError::MissingColumn(from.to_string()));
            }
        }
        for column in &mut self.columns {
            if let Some((_, to)) = renames.iter().find(|(from, _)| *from == column.name) {
                column.name = to.to_string();
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count()).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }
}
