use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use parking_lot::RwLock;

use crate::db_types::{ID_COLUMN, Row, Tables, Value, ValueKind};
use crate::error::{DbError, DbResult};
use crate::query;

/// In-memory tables loaded from a JSON file.
///
/// Table membership is fixed at load time; only rows change. Mutations hold
/// the write guard for their whole body and reads hold the read guard, so a
/// reader never sees a half-applied mutation. Reads hand out owned copies.
#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Database {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// The `.json` extension is checked before the filesystem is touched.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let name = path.to_string_lossy();
        if name.rsplit('.').next() != Some("json") {
            return Err(DbError::InvalidFormat(name.into_owned()));
        }

        let file = File::open(path).map_err(DbError::Io)?;
        let tables: Tables =
            serde_json::from_reader(BufReader::new(file)).map_err(DbError::Decode)?;

        Ok(Self::new(tables))
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_table(&self, name: &str) -> DbResult<Vec<Row>> {
        let tables = self.tables.read();
        let rows = tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        Ok(rows.clone())
    }

    pub fn get_row_by_id(&self, name: &str, id: f64) -> DbResult<Row> {
        let tables = self.tables.read();
        let rows = tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        let index = position_by_id(rows, id)?;
        Ok(rows[index].clone())
    }

    /// New id is the previous last row's id + 1, or 1 for an empty table.
    /// If reading the row back by id fails, the append is undone.
    pub fn add_row(&self, name: &str, mut body: Row) -> DbResult<Row> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;

        let id = match rows.last() {
            None => 1.0,
            Some(last) => next_id(last)?,
        };
        body.insert(ID_COLUMN.to_string(), Value::Number(id));
        rows.push(body);

        match position_by_id(rows, id) {
            Ok(index) => Ok(rows[index].clone()),
            Err(err) => {
                rows.pop();
                Err(err)
            }
        }
    }

    pub fn edit_row_by_id(&self, name: &str, id: f64, body: Row) -> DbResult<Row> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;

        let index = position_by_id(rows, id)?;
        rows[index] = body;
        Ok(rows[index].clone())
    }

    pub fn delete_row_by_id(&self, name: &str, id: f64) -> DbResult<()> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;

        let index = position_by_id(rows, id)?;
        rows.remove(index);
        Ok(())
    }

    pub fn search_table(&self, name: &str, column: &str, value: &Value) -> DbResult<Vec<Row>> {
        let tables = self.tables.read();
        let rows = tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        query::search_records(rows, column, value)
    }

    pub fn sort_table(&self, name: &str, column: &str, descending: bool) -> DbResult<()> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        query::sort_rows(rows, column, descending)
    }
}

// A row without an id ahead of the match fails the whole scan.
fn position_by_id(rows: &[Row], id: f64) -> DbResult<usize> {
    let wanted = Value::Number(id);
    for (i, row) in rows.iter().enumerate() {
        let val = row
            .get(ID_COLUMN)
            .ok_or_else(|| DbError::ColumnNotFound(ID_COLUMN.to_string()))?;
        if *val == wanted {
            return Ok(i);
        }
    }
    Err(DbError::RecordNotFound)
}

fn next_id(last: &Row) -> DbResult<f64> {
    let val = last
        .get(ID_COLUMN)
        .ok_or_else(|| DbError::ColumnNotFound(ID_COLUMN.to_string()))?;
    val.as_number()
        .map(|id| id + 1.0)
        .ok_or_else(|| DbError::TypeMismatch {
            column: ID_COLUMN.to_string(),
            expected: ValueKind::Number,
            found: val.kind(),
        })
}
