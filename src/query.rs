use std::cmp::Ordering;

use crate::db_types::{Row, Value, ValueKind};
use crate::error::{DbError, DbResult};

/// Aborts on the first row lacking `column`, even after earlier matches.
pub fn search_records(rows: &[Row], column: &str, value: &Value) -> DbResult<Vec<Row>> {
    let mut result = Vec::new();

    for row in rows {
        let val = row
            .get(column)
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))?;

        if val == value {
            result.push(row.clone());
        }
    }

    Ok(result)
}

/// A cell type with a total order that rows can be sorted by.
pub trait SortKey {
    const KIND: ValueKind;

    fn extract(value: &Value) -> Option<&Self>;

    fn compare(&self, other: &Self) -> Ordering;
}

impl SortKey for f64 {
    const KIND: ValueKind = ValueKind::Number;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl SortKey for str {
    const KIND: ValueKind = ValueKind::Text;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl SortKey for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Every row is checked before anything moves. Ties have no fixed order.
pub fn sort_rows_as<T: SortKey + ?Sized>(
    rows: &mut [Row],
    column: &str,
    descending: bool,
) -> DbResult<()> {
    for row in rows.iter() {
        let val = row
            .get(column)
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))?;
        if T::extract(val).is_none() {
            return Err(DbError::TypeMismatch {
                column: column.to_string(),
                expected: T::KIND,
                found: val.kind(),
            });
        }
    }

    rows.sort_unstable_by(|a, b| {
        let ordering = match (
            a.get(column).and_then(T::extract),
            b.get(column).and_then(T::extract),
        ) {
            (Some(x), Some(y)) => x.compare(y),
            _ => Ordering::Equal,
        };
        if descending { ordering.reverse() } else { ordering }
    });

    Ok(())
}

// Key type comes from the first row.
pub fn sort_rows(rows: &mut [Row], column: &str, descending: bool) -> DbResult<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let kind = first
        .get(column)
        .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))?
        .kind();

    match kind {
        ValueKind::Number => sort_rows_as::<f64>(rows, column, descending),
        ValueKind::Text => sort_rows_as::<str>(rows, column, descending),
        ValueKind::Bool => sort_rows_as::<bool>(rows, column, descending),
        kind => Err(DbError::Unorderable {
            column: column.to_string(),
            kind,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn ids(rows: &[Row]) -> Vec<f64> {
        rows.iter().filter_map(|r| r["id"].as_number()).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row! { "id" => 1.0, "x" => 3.0 },
            row! { "id" => 2.0, "x" => 1.0 },
            row! { "id" => 3.0, "x" => 2.0 },
        ]
    }

    #[test]
    fn search_returns_matches_in_scan_order() {
        let rows = vec![
            row! { "id" => 1.0, "x" => 5.0 },
            row! { "id" => 2.0, "x" => 7.0 },
            row! { "id" => 3.0, "x" => 5.0 },
        ];

        let mut found = search_records(&rows, "x", &Value::Number(5.0)).unwrap();
        assert_eq!(ids(&found), vec![1.0, 3.0]);

        found[0].insert("x".into(), Value::Number(99.0));
        assert_eq!(rows[0]["x"], Value::Number(5.0));
    }

    #[test]
    fn search_aborts_on_missing_column() {
        let rows = vec![row! { "id" => 1.0, "x" => 5.0 }, row! { "id" => 2.0 }];
        let err = search_records(&rows, "x", &Value::Number(5.0)).unwrap_err();
        assert!(matches!(err, DbError::ColumnNotFound(c) if c == "x"));
    }

    #[test]
    fn search_does_not_coerce_types() {
        let rows = vec![row! { "id" => 1.0, "x" => "5" }];
        let found = search_records(&rows, "x", &Value::Number(5.0)).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn sort_ascending_and_descending() {
        let mut rows = sample();
        sort_rows(&mut rows, "x", false).unwrap();
        assert_eq!(ids(&rows), vec![2.0, 3.0, 1.0]);

        sort_rows(&mut rows, "x", true).unwrap();
        assert_eq!(ids(&rows), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn sort_by_text_column() {
        let mut rows = vec![
            row! { "id" => 1.0, "name" => "carol" },
            row! { "id" => 2.0, "name" => "alice" },
            row! { "id" => 3.0, "name" => "bob" },
        ];
        sort_rows_as::<str>(&mut rows, "name", false).unwrap();
        assert_eq!(ids(&rows), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn sort_rejects_mixed_kinds_without_reordering() {
        let mut rows = sample();
        rows[2].insert("x".into(), Value::Text("2".into()));

        let err = sort_rows(&mut rows, "x", false).unwrap_err();
        assert!(matches!(
            err,
            DbError::TypeMismatch { expected: ValueKind::Number, found: ValueKind::Text, .. }
        ));
        assert_eq!(ids(&rows), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sort_rejects_missing_column() {
        let mut rows = sample();
        rows[1].remove("x");
        let err = sort_rows(&mut rows, "x", true).unwrap_err();
        assert!(matches!(err, DbError::ColumnNotFound(_)));
    }

    #[test]
    fn sort_rejects_unorderable_kinds() {
        let mut rows = vec![row! { "id" => 1.0 }, row! { "id" => 2.0 }];
        rows[0].insert("tags".into(), Value::List(vec![]));
        rows[1].insert("tags".into(), Value::List(vec![]));
        let err = sort_rows(&mut rows, "tags", false).unwrap_err();
        assert!(matches!(err, DbError::Unorderable { kind: ValueKind::List, .. }));
    }

    #[test]
    fn sort_empty_is_noop() {
        let mut rows: Vec<Row> = Vec::new();
        sort_rows(&mut rows, "x", false).unwrap();
    }
}
