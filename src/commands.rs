use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::db_types::{Row, Value};
use crate::error::DbResult;
use crate::query;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DbCommand {
    ListTables,
    /// Reads the whole table; `sort` orders the returned copy only.
    GetTable {
        table: String,
        #[serde(default)]
        sort: Option<SortSpec>,
    },
    GetRow {
        table: String,
        id: f64,
    },
    #[serde(rename = "insert")]
    AddRow {
        table: String,
        body: Row,
    },
    #[serde(rename = "update")]
    EditRow {
        table: String,
        id: f64,
        body: Row,
    },
    #[serde(rename = "delete")]
    DeleteRow {
        table: String,
        id: f64,
    },
    /// Filters a snapshot of the table and optionally sorts the result.
    Search {
        table: String,
        column: String,
        value: Value,
        #[serde(default)]
        sort: Option<SortSpec>,
    },
    /// Reorders the stored table.
    Sort {
        table: String,
        column: String,
        #[serde(default)]
        descending: bool,
    },
}

#[derive(Debug, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Ok,
    Tables { tables: Vec<String> },
    Row { row: Row },
    Rows { rows: Vec<Row> },
}

impl Database {
    pub fn execute(&self, cmd: DbCommand) -> DbResult<CommandOutput> {
        match cmd {
            DbCommand::ListTables => Ok(CommandOutput::Tables {
                tables: self.table_names(),
            }),

            DbCommand::GetTable { table, sort } => {
                let mut rows = self.get_table(&table)?;
                if let Some(spec) = sort {
                    query::sort_rows(&mut rows, &spec.column, spec.descending)?;
                }
                Ok(CommandOutput::Rows { rows })
            }

            DbCommand::GetRow { table, id } => Ok(CommandOutput::Row {
                row: self.get_row_by_id(&table, id)?,
            }),

            DbCommand::AddRow { table, body } => Ok(CommandOutput::Row {
                row: self.add_row(&table, body)?,
            }),

            DbCommand::EditRow { table, id, body } => Ok(CommandOutput::Row {
                row: self.edit_row_by_id(&table, id, body)?,
            }),

            DbCommand::DeleteRow { table, id } => {
                self.delete_row_by_id(&table, id)?;
                Ok(CommandOutput::Ok)
            }

            DbCommand::Search {
                table,
                column,
                value,
                sort,
            } => {
                let mut rows = self.search_table(&table, &column, &value)?;
                if let Some(spec) = sort {
                    query::sort_rows(&mut rows, &spec.column, spec.descending)?;
                }
                Ok(CommandOutput::Rows { rows })
            }

            DbCommand::Sort {
                table,
                column,
                descending,
            } => {
                self.sort_table(&table, &column, descending)?;
                Ok(CommandOutput::Ok)
            }
        }
    }
}
