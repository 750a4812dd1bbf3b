#![forbid(unsafe_code)]

use palika_model::{is_valid_point, EntityKind, ReviewStatus};
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod reads;

pub use reads::{
    get_area, list_areas, list_enumerators, list_wards, AreaDetail, AreaRow, EnumeratorRow,
    TokenRow, WardRow,
};

pub const CRATE_NAME: &str = "palika-query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    NotFound,
    BadRequest,
    Internal,
}

impl QueryErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for QueryError {}

impl From<rusqlite::Error> for QueryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::new(QueryErrorCode::Internal, e.to_string())
    }
}

/// Closed set of sortable columns. Unrecognized `sortBy` strings resolve to
/// `Id` at the parse boundary; no raw identifier ever reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Id,
    WardNumber,
    AreaId,
    Status,
}

impl SortKey {
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        match raw {
            "id" => Self::Id,
            "wardNumber" => Self::WardNumber,
            "areaId" => Self::AreaId,
            "status" => Self::Status,
            _ => Self::Id,
        }
    }

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::WardNumber => "wardNumber",
            Self::AreaId => "areaId",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        match raw {
            "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFilter {
    pub ward_number: Option<i64>,
    pub area_id: Option<String>,
    pub enumerator_id: Option<String>,
    pub status: Option<ReviewStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_limit: usize,
    pub default_limit: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_limit: 500,
            default_limit: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub filter: EntityFilter,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page_size: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
    pub id: String,
    pub ward_number: Option<i64>,
    pub area_id: Option<String>,
    pub enumerator_id: Option<String>,
    pub building_token: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_families: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_businesses: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nature_of_business: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crops: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<String>>,
}

/// One row shape serves every kind; columns a table does not have are
/// projected as NULL so the mapper stays positional.
fn projection(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Building => {
            "id, wardNumber, areaId, enumeratorId, buildingToken, status, geom, \
             totalFamilies, totalBusinesses, \
             NULL, NULL, NULL, NULL, NULL, \
             NULL, NULL, NULL"
        }
        EntityKind::Business => {
            "id, wardNumber, areaId, enumeratorId, buildingToken, status, gps, \
             NULL, NULL, \
             name, natureOfBusiness, employeeCount, crops, animals, \
             NULL, NULL, NULL"
        }
        EntityKind::Family => {
            "id, wardNumber, areaId, enumeratorId, buildingToken, status, gps, \
             NULL, NULL, \
             NULL, NULL, NULL, NULL, NULL, \
             headName, memberCount, facilities"
        }
    }
}

/// Stored location text becomes a wire value only when it still parses as a
/// well-formed point; anything else is silently omitted.
fn decode_location(raw: Option<String>) -> Option<Value> {
    let value: Value = serde_json::from_str(&raw?).ok()?;
    if is_valid_point(&value) {
        Some(value)
    } else {
        None
    }
}

fn decode_list(raw: Option<String>) -> Option<Vec<String>> {
    serde_json::from_str(&raw?).ok()
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<EntityRow> {
    Ok(EntityRow {
        id: row.get(0)?,
        ward_number: row.get(1)?,
        area_id: row.get(2)?,
        enumerator_id: row.get(3)?,
        building_token: row.get(4)?,
        status: row.get(5)?,
        location: decode_location(row.get(6)?),
        total_families: row.get(7)?,
        total_businesses: row.get(8)?,
        name: row.get(9)?,
        nature_of_business: row.get(10)?,
        employee_count: row.get(11)?,
        crops: decode_list(row.get(12)?),
        animals: decode_list(row.get(13)?),
        head_name: row.get(14)?,
        member_count: row.get(15)?,
        facilities: decode_list(row.get(16)?),
    })
}

fn build_conditions(filter: &EntityFilter) -> (Vec<String>, Vec<SqlValue>) {
    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();

    if let Some(ward) = filter.ward_number {
        where_parts.push("wardNumber = ?".to_string());
        params.push(SqlValue::Integer(ward));
    }
    if let Some(area) = &filter.area_id {
        where_parts.push("areaId = ?".to_string());
        params.push(SqlValue::Text(area.clone()));
    }
    if let Some(enumerator) = &filter.enumerator_id {
        where_parts.push("enumeratorId = ?".to_string());
        params.push(SqlValue::Text(enumerator.clone()));
    }
    if let Some(status) = filter.status {
        where_parts.push("status = ?".to_string());
        params.push(SqlValue::Text(status.as_str().to_string()));
    }
    (where_parts, params)
}

fn validate_request(req: &ListRequest, limits: &QueryLimits) -> Result<(), QueryError> {
    if req.limit == 0 || req.limit > limits.max_limit {
        return Err(QueryError::new(
            QueryErrorCode::BadRequest,
            format!("limit must be between 1 and {}", limits.max_limit),
        ));
    }
    Ok(())
}

pub fn list_entities(
    conn: &Connection,
    kind: EntityKind,
    req: &ListRequest,
    limits: &QueryLimits,
) -> Result<ListPage<EntityRow>, QueryError> {
    validate_request(req, limits)?;

    let (where_parts, mut params) = build_conditions(&req.filter);
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", kind.table(), where_clause);
    let total: i64 = conn.query_row(&count_sql, params_from_iter(params.iter()), |row| {
        row.get(0)
    })?;

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
        projection(kind),
        kind.table(),
        where_clause,
        req.sort_key.column(),
        req.sort_order.keyword(),
    );
    params.push(SqlValue::Integer(req.limit as i64));
    params.push(SqlValue::Integer(req.offset as i64));

    let mut stmt = conn.prepare(&sql)?;
    let data = stmt
        .query_map(params_from_iter(params.iter()), map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListPage {
        data,
        pagination: Pagination {
            total: total as u64,
            page_size: req.limit,
            offset: req.offset,
        },
    })
}

pub fn get_entity(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
) -> Result<EntityRow, QueryError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1",
        projection(kind),
        kind.table()
    );
    conn.query_row(&sql, rusqlite::params![id], map_row)
        .optional()?
        .ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::NotFound,
                format!("{} not found: {id}", kind.table()),
            )
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub total: u64,
    pub by_status: Vec<StatusCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_members: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_total: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Aggregates are computed at query time on every call; nothing is cached.
pub fn get_stats(conn: &Connection, kind: EntityKind) -> Result<EntityStats, QueryError> {
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", kind.table()),
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT status, COUNT(*) FROM {} GROUP BY status ORDER BY status",
        kind.table()
    ))?;
    let by_status = stmt
        .query_map([], |row| {
            Ok(StatusCount {
                status: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let average_members = match kind {
        EntityKind::Family => conn.query_row(
            "SELECT AVG(memberCount) FROM family WHERE memberCount IS NOT NULL",
            [],
            |row| row.get::<_, Option<f64>>(0),
        )?,
        _ => None,
    };
    let employee_total = match kind {
        EntityKind::Business => conn.query_row(
            "SELECT SUM(employeeCount) FROM business",
            [],
            |row| row.get::<_, Option<i64>>(0),
        )?,
        _ => None,
    };

    Ok(EntityStats {
        total: total as u64,
        by_status,
        average_members,
        employee_total,
    })
}
