use crate::error::{EtlError, Result};
use crate::table::{Table, Value};
use serde::Serialize;
use tracing::{debug, info, instrument};

pub const SURVIVAL_LABELS: &[(i64, &str)] = &[(0, "did not survive"), (1, "survived")];

pub const CLASS_LABELS: &[(i64, &str)] = &[
    (1, "first class"),
    (2, "second class"),
    (3, "third class"),
];

pub const DROPPED_COLUMNS: &[&str] = &["Cabin", "Ticket", "Name"];

/// Source header → destination field.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("PassengerId", "passenger_id"),
    ("Survived", "survived"),
    ("Pclass", "passenger_class"),
    ("Sex", "sex"),
    ("Age", "age"),
    ("SibSp", "siblings_spouses_aboard"),
    ("Parch", "parents_children_aboard"),
    ("Fare", "fare"),
    ("Embarked", "embarkation_port"),
];

/// Destination columns, in insert order.
pub const DESTINATION_COLUMNS: [&str; 9] = [
    "passenger_id",
    "survived",
    "passenger_class",
    "sex",
    "age",
    "siblings_spouses_aboard",
    "parents_children_aboard",
    "fare",
    "embarkation_port",
];

/// What the transform filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformSummary {
    pub rows: usize,
    pub ages_imputed: usize,
    pub age_mean: Option<f64>,
    pub ports_imputed: usize,
    pub port_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub table: Table,
    pub summary: TransformSummary,
}

/// Apply the cleaning steps to an extracted table. Absent input stays absent.
#[instrument(skip_all)]
pub fn transform(table: Option<Table>) -> Result<Option<Transformed>> {
    let Some(mut table) = table else {
        debug!("No table to transform");
        return Ok(None);
    };
    info!("🔧 Transforming {} rows...", table.row_count());

    table.column_mut("Survived")?.recode(SURVIVAL_LABELS)?;
    table.column_mut("Pclass")?.recode(CLASS_LABELS)?;

    let (ages_imputed, age_mean) = impute_mean(&mut table, "Age")?;

    table.drop_columns(DROPPED_COLUMNS)?;
    table.rename_columns(COLUMN_RENAMES)?;

    let (ports_imputed, port_mode) = impute_mode(&mut table, "embarkation_port")?;

    let summary = TransformSummary {
        rows: table.row_count(),
        ages_imputed,
        age_mean,
        ports_imputed,
        port_mode: port_mode.map(|v| match v {
            Value::Text(s) => s,
            other => other.to_string(),
        }),
    };
    info!(
        "✅ Transformation finished ({} ages and {} ports imputed)",
        summary.ages_imputed, summary.ports_imputed
    );
    Ok(Some(Transformed { table, summary }))
}

/// Fill missing cells of `column` with its mean. Returns the fill count and the mean used.
fn impute_mean(table: &mut Table, column: &str) -> Result<(usize, Option<f64>)> {
    let col = table.column_mut(column)?;
    if col.missing_count() == 0 {
        return Ok((0, None));
    }
    let mean = col
        .mean()?
        .ok_or_else(|| EtlError::NothingToImpute(column.to_string()))?;
    let filled = col.fill_missing(&Value::Float(mean));
    debug!(column, mean, filled, "Imputed missing values with mean");
    crate::metrics::transform::values_imputed(column, filled);
    Ok((filled, Some(mean)))
}

/// Fill missing cells of `column` with its most frequent value.
fn impute_mode(table: &mut Table, column: &str) -> Result<(usize, Option<Value>)> {
    let col = table.column_mut(column)?;
    if col.missing_count() == 0 {
        return Ok((0, None));
    }
    let mode = col
        .mode()
        .ok_or_else(|| EtlError::NothingToImpute(column.to_string()))?;
    let filled = col.fill_missing(&mode);
    debug!(column, mode = %mode, filled, "Imputed missing values with mode");
    crate::metrics::transform::values_imputed(column, filled);
    Ok((filled, Some(mode)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SOURCE_COLUMNS;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn row(id: i64, survived: i64, class: i64, age: Value, embarked: Value) -> Vec<Value> {
        vec![
            Value::Int(id),
            Value::Int(survived),
            Value::Int(class),
            text("Someone, Mr. Test"),
            text("male"),
            age,
            Value::Int(0),
            Value::Int(0),
            text("A/5 21171"),
            Value::Float(7.25),
            Value::Missing,
            embarked,
        ]
    }

    fn source_table(rows: Vec<Vec<Value>>) -> Table {
        let mut table = Table::with_header(SOURCE_COLUMNS);
        for r in rows {
            table.push_row(r).unwrap();
        }
        table
    }

    fn column(table: &Table, name: &str) -> Vec<Value> {
        table.column(name).unwrap().values.clone()
    }

    #[test]
    fn test_absent_table_stays_absent() {
        assert!(transform(None).unwrap().is_none());
    }

    #[test]
    fn test_recodes_survival_and_class() {
        let table = source_table(vec![
            row(1, 0, 1, Value::Int(30), text("S")),
            row(2, 1, 2, Value::Int(30), text("S")),
            row(3, 1, 3, Value::Int(30), text("S")),
        ]);
        let out = transform(Some(table)).unwrap().unwrap().table;

        assert_eq!(
            column(&out, "survived"),
            vec![text("did not survive"), text("survived"), text("survived")]
        );
        assert_eq!(
            column(&out, "passenger_class"),
            vec![text("first class"), text("second class"), text("third class")]
        );
    }

    #[test]
    fn test_imputes_age_with_mean() {
        let table = source_table(vec![
            row(1, 0, 3, Value::Int(22), text("S")),
            row(2, 1, 1, Value::Missing, text("C")),
            row(3, 1, 3, Value::Int(38), text("S")),
        ]);
        let out = transform(Some(table)).unwrap().unwrap();

        assert_eq!(out.summary.ages_imputed, 1);
        assert_eq!(out.summary.age_mean, Some(30.0));
        let ages: Vec<f64> = column(&out.table, "age")
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(ages, vec![22.0, 30.0, 38.0]);
    }

    #[test]
    fn test_imputes_port_with_first_seen_mode() {
        let table = source_table(vec![
            row(1, 0, 3, Value::Int(1), text("S")),
            row(2, 0, 3, Value::Int(1), text("C")),
            row(3, 0, 3, Value::Int(1), Value::Missing),
            row(4, 0, 3, Value::Int(1), text("S")),
            row(5, 0, 3, Value::Int(1), text("C")),
        ]);
        let out = transform(Some(table)).unwrap().unwrap();

        assert_eq!(out.summary.port_mode.as_deref(), Some("S"));
        assert_eq!(out.summary.ports_imputed, 1);
        assert_eq!(column(&out.table, "embarkation_port")[2], text("S"));
    }

    #[test]
    fn test_output_schema_and_row_count() {
        let table = source_table(vec![
            row(1, 0, 3, Value::Missing, Value::Missing),
            row(2, 1, 1, Value::Float(4.5), text("Q")),
        ]);
        let out = transform(Some(table)).unwrap().unwrap().table;

        assert_eq!(out.column_names(), DESTINATION_COLUMNS.to_vec());
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.column("age").unwrap().missing_count(), 0);
        assert_eq!(out.column("embarkation_port").unwrap().missing_count(), 0);
        assert!(!out.has_column("Name"));
    }

    #[test]
    fn test_unmapped_survival_code_fails() {
        let table = source_table(vec![row(1, 7, 3, Value::Int(30), text("S"))]);
        let err = transform(Some(table)).unwrap_err();
        assert!(matches!(err, EtlError::UnmappedValue { ref column, row: 0, .. } if column == "Survived"));
    }

    #[test]
    fn test_unmapped_class_code_fails() {
        let table = source_table(vec![row(1, 0, 4, Value::Int(30), text("S"))]);
        let err = transform(Some(table)).unwrap_err();
        assert!(matches!(err, EtlError::UnmappedValue { ref column, .. } if column == "Pclass"));
    }

    #[test]
    fn test_all_ages_missing_fails() {
        let table = source_table(vec![row(1, 0, 3, Value::Missing, text("S"))]);
        assert!(matches!(
            transform(Some(table)),
            Err(EtlError::NothingToImpute(ref c)) if c == "Age"
        ));
    }

    #[test]
    fn test_empty_table_transforms_cleanly() {
        let out = transform(Some(source_table(vec![]))).unwrap().unwrap();
        assert_eq!(out.table.row_count(), 0);
        assert_eq!(out.summary, TransformSummary::default());
    }
}
