use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::commands::{CommandOutput, DbCommand, SortSpec};
use crate::db::Database;
use crate::db_types::{Row, Value};
use crate::error::DbError;

type AppState = Arc<Database>;

pub fn create_router(db: Arc<Database>) -> Router {
    Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/:table", get(get_table).post(add_row))
        .route(
            "/tables/:table/:id",
            get(get_row).put(edit_row).delete(delete_row),
        )
        .route("/command", post(run_command))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub column: Option<String>,
    /// JSON text; anything that does not parse is matched as a string.
    pub value: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl TableQuery {
    fn into_command(self, table: String) -> Result<DbCommand, ApiError> {
        let descending = match self.order.as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("unknown order: {other}")));
            }
        };
        let sort = self.sort.map(|column| SortSpec { column, descending });

        match (self.column, self.value) {
            (Some(column), Some(value)) => Ok(DbCommand::Search {
                table,
                column,
                value: parse_value(value),
                sort,
            }),
            (None, None) => Ok(DbCommand::GetTable { table, sort }),
            _ => Err(ApiError::BadRequest(
                "column and value must be given together".into(),
            )),
        }
    }
}

fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::Text(raw))
}

async fn list_tables(State(db): State<AppState>) -> Response {
    respond(&db, DbCommand::ListTables)
}

async fn get_table(
    State(db): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<TableQuery>,
) -> Response {
    match query.into_command(table) {
        Ok(cmd) => respond(&db, cmd),
        Err(err) => err.into_response(),
    }
}

async fn get_row(
    State(db): State<AppState>,
    path: Result<Path<(String, f64)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((table, id)) = path?;
    Ok(respond(&db, DbCommand::GetRow { table, id }))
}

async fn add_row(
    State(db): State<AppState>,
    Path(table): Path<String>,
    body: Result<Json<Row>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let output = db.execute(DbCommand::AddRow { table, body })?;
    Ok((StatusCode::CREATED, ok_body(output)).into_response())
}

async fn edit_row(
    State(db): State<AppState>,
    path: Result<Path<(String, f64)>, PathRejection>,
    body: Result<Json<Row>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path((table, id)) = path?;
    let Json(body) = body?;
    Ok(respond(&db, DbCommand::EditRow { table, id, body }))
}

async fn delete_row(
    State(db): State<AppState>,
    path: Result<Path<(String, f64)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((table, id)) = path?;
    Ok(respond(&db, DbCommand::DeleteRow { table, id }))
}

async fn run_command(
    State(db): State<AppState>,
    cmd: Result<Json<DbCommand>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(cmd) = cmd?;
    Ok(respond(&db, cmd))
}

fn respond(db: &Database, cmd: DbCommand) -> Response {
    match db.execute(cmd) {
        Ok(output) => ok_body(output).into_response(),
        Err(err) => ApiError::Db(err).into_response(),
    }
}

fn ok_body(output: CommandOutput) -> Json<serde_json::Value> {
    let mut body = match serde_json::to_value(output) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    body.insert("ok".into(), json!(true));
    Json(serde_json::Value::Object(body))
}

#[derive(Debug)]
pub enum ApiError {
    Db(DbError),
    BadRequest(String),
    /// An extractor refused the request before it reached the store.
    Rejected { status: StatusCode, message: String },
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Db(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

pub fn status_for(err: &DbError) -> StatusCode {
    match err {
        DbError::TableNotFound(_) | DbError::RecordNotFound => StatusCode::NOT_FOUND,
        DbError::ColumnNotFound(_) | DbError::TypeMismatch { .. } | DbError::Unorderable { .. } => {
            StatusCode::BAD_REQUEST
        }
        DbError::RecordAlreadyExists => StatusCode::CONFLICT,
        DbError::InvalidFormat(_) | DbError::Io(_) | DbError::Decode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Db(err) => (status_for(err), err.kind(), err.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BadRequest", msg.clone()),
            ApiError::Rejected { status, message } => (*status, "BadRequest", message.clone()),
        };
        tracing::warn!(%status, kind, %message, "request failed");

        let body = json!({
            "ok": false,
            "error": { "kind": kind, "message": message },
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> TableQuery {
        let mut q = TableQuery::default();
        for (key, val) in pairs {
            let val = Some(val.to_string());
            match *key {
                "column" => q.column = val,
                "value" => q.value = val,
                "sort" => q.sort = val,
                "order" => q.order = val,
                _ => {}
            }
        }
        q
    }

    #[test]
    fn plain_query_reads_table() {
        let cmd = query(&[]).into_command("t".into()).unwrap();
        assert!(matches!(cmd, DbCommand::GetTable { table, sort: None } if table == "t"));

        let cmd = query(&[("sort", "x"), ("order", "desc")])
            .into_command("t".into())
            .unwrap();
        let DbCommand::GetTable { sort: Some(spec), .. } = cmd else {
            panic!("expected sorted read");
        };
        assert_eq!(spec.column, "x");
        assert!(spec.descending);
    }

    #[test]
    fn search_value_is_parsed_as_json() {
        let cmd = query(&[("column", "x"), ("value", "5")])
            .into_command("t".into())
            .unwrap();
        let DbCommand::Search { value, .. } = cmd else {
            panic!("expected search");
        };
        assert_eq!(value, Value::Number(5.0));

        let cmd = query(&[("column", "name"), ("value", "bob")])
            .into_command("t".into())
            .unwrap();
        let DbCommand::Search { value, .. } = cmd else {
            panic!("expected search");
        };
        assert_eq!(value, Value::Text("bob".into()));
    }

    #[test]
    fn half_a_filter_is_rejected() {
        let err = query(&[("column", "x")]).into_command("t".into()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err = query(&[("order", "sideways")])
            .into_command("t".into())
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(status_for(&DbError::RecordNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&DbError::TableNotFound("t".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&DbError::ColumnNotFound("id".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DbError::RecordAlreadyExists), StatusCode::CONFLICT);
    }
}
