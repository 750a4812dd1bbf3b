// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use palika_model::{EntityId, EntityKind};
use palika_registry::{upsert_building, upsert_business, upsert_family, NewBuilding, NewBusiness, NewFamily};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tracing::warn;

#[derive(Debug)]
pub struct SubmissionError(pub String);

impl Display for SubmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SubmissionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub form_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub count: Option<u64>,
}

/// Seam to the external survey-collection backend. The protocol behind it is
/// that backend's own; this service only pulls rows and reports the outcome.
#[async_trait]
pub trait SubmissionSource: Send + Sync + 'static {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Value>, SubmissionError>;
}

pub struct HttpSubmissionSource {
    base_url: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl HttpSubmissionSource {
    #[must_use]
    pub fn new(base_url: &str, bearer_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SubmissionSource for HttpSubmissionSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Value>, SubmissionError> {
        let url = format!(
            "{}/v1/forms/{}/submissions",
            self.base_url, request.form_id
        );
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(start) = &request.start_date {
            query.push(("startDate", start.clone()));
        }
        if let Some(end) = &request.end_date {
            query.push(("endDate", end.clone()));
        }
        if let Some(count) = request.count {
            query.push(("count", count.to_string()));
        }
        let mut req = self.client.get(&url).query(&query);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| SubmissionError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SubmissionError(format!(
                "submission fetch failed: {}",
                resp.status()
            )));
        }
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| SubmissionError(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub fetched: usize,
    pub inserted: usize,
    pub failed: usize,
}

fn field_str(row: &Value, name: &str) -> Option<String> {
    row.get(name).and_then(Value::as_str).map(ToString::to_string)
}

fn field_i64(row: &Value, name: &str) -> Option<i64> {
    row.get(name).and_then(Value::as_i64)
}

fn field_list(row: &Value, name: &str) -> Vec<String> {
    row.get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn row_id(row: &Value) -> Option<EntityId> {
    EntityId::parse(row.get("id").and_then(Value::as_str)?).ok()
}

fn apply_row(conn: &Connection, kind: EntityKind, row: &Value) -> bool {
    let Some(id) = row_id(row) else {
        warn!(kind = kind.table(), "submission row without a usable id");
        return false;
    };
    let result = match kind {
        EntityKind::Building => upsert_building(
            conn,
            &NewBuilding {
                id,
                ward_number: field_i64(row, "wardNumber"),
                geom: row.get("geom").cloned(),
                total_families: field_i64(row, "totalFamilies"),
                total_businesses: field_i64(row, "totalBusinesses"),
            },
        ),
        EntityKind::Business => upsert_business(
            conn,
            &NewBusiness {
                id,
                ward_number: field_i64(row, "wardNumber"),
                name: field_str(row, "name"),
                nature_of_business: field_str(row, "natureOfBusiness"),
                employee_count: field_i64(row, "employeeCount"),
                crops: field_list(row, "crops"),
                animals: field_list(row, "animals"),
                gps: row.get("gps").cloned(),
            },
        ),
        EntityKind::Family => upsert_family(
            conn,
            &NewFamily {
                id,
                ward_number: field_i64(row, "wardNumber"),
                head_name: field_str(row, "headName"),
                member_count: field_i64(row, "memberCount"),
                facilities: field_list(row, "facilities"),
                gps: row.get("gps").cloned(),
            },
        ),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(kind = kind.table(), "submission row rejected: {e}");
            false
        }
    }
}

/// Apply fetched rows to the registry, row by row. A bad row is counted and
/// skipped; it never aborts the batch.
pub fn apply_submissions(conn: &Connection, kind: EntityKind, rows: &[Value]) -> IngestReport {
    let mut inserted = 0usize;
    let mut failed = 0usize;
    for row in rows {
        if apply_row(conn, kind, row) {
            inserted += 1;
        } else {
            failed += 1;
        }
    }
    IngestReport {
        fetched: rows.len(),
        inserted,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palika_registry::init_schema;
    use rusqlite::Connection;
    use serde_json::json;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open memory db");
        init_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn batch_counts_good_and_bad_rows() {
        let conn = conn();
        let rows = vec![
            json!({"id": "f1", "wardNumber": 3, "headName": "Ram", "memberCount": 4,
                   "facilities": ["water"], "gps": {"type": "Point", "coordinates": [85.3, 27.7]}}),
            json!({"headName": "no id"}),
            json!({"id": "f2", "memberCount": 2}),
        ];
        let report = apply_submissions(&conn, EntityKind::Family, &rows);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed, 1);

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM family", [], |row| row.get(0))
            .expect("count");
        assert_eq!(total, 2);
    }

    #[test]
    fn business_rows_decode_lists_and_counts() {
        let conn = conn();
        let rows = vec![json!({
            "id": "biz1",
            "wardNumber": 2,
            "name": "Mill",
            "natureOfBusiness": "agro",
            "employeeCount": 7,
            "crops": ["rice", "maize"],
            "animals": [],
        })];
        let report = apply_submissions(&conn, EntityKind::Business, &rows);
        assert_eq!(report.inserted, 1);
        let (name, crops): (String, String) = conn
            .query_row(
                "SELECT name, crops FROM business WHERE id = 'biz1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("row");
        assert_eq!(name, "Mill");
        assert_eq!(crops, "[\"rice\",\"maize\"]");
    }

    #[test]
    fn refetch_resets_review_status_to_pending() {
        let conn = conn();
        let rows = vec![json!({"id": "b1", "wardNumber": 1})];
        apply_submissions(&conn, EntityKind::Building, &rows);
        conn.execute_batch("UPDATE building SET status = 'approved' WHERE id = 'b1'")
            .expect("approve");
        apply_submissions(&conn, EntityKind::Building, &rows);
        let status: String = conn
            .query_row("SELECT status FROM building WHERE id = 'b1'", [], |row| {
                row.get(0)
            })
            .expect("row");
        assert_eq!(status, "pending");
    }
}
