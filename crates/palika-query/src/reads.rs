// SPDX-License-Identifier: Apache-2.0

use crate::{QueryError, QueryErrorCode};
use palika_model::AreaStatus;
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection, OptionalExtension, Row};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WardRow {
    pub ward_number: i64,
    pub ward_area_code: i64,
}

pub fn list_wards(conn: &Connection) -> Result<Vec<WardRow>, QueryError> {
    let mut stmt =
        conn.prepare("SELECT wardNumber, wardAreaCode FROM ward ORDER BY wardNumber")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(WardRow {
                ward_number: row.get(0)?,
                ward_area_code: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRow {
    pub id: String,
    pub code: String,
    pub ward_number: i64,
    pub status: String,
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Value>,
}

fn map_area(row: &Row<'_>) -> rusqlite::Result<AreaRow> {
    let geometry: Option<String> = row.get(5)?;
    let centroid: Option<String> = row.get(6)?;
    Ok(AreaRow {
        id: row.get(0)?,
        code: row.get(1)?,
        ward_number: row.get(2)?,
        status: row.get(3)?,
        assigned_to: row.get(4)?,
        geometry: geometry.and_then(|g| serde_json::from_str(&g).ok()),
        centroid: centroid.and_then(|c| serde_json::from_str(&c).ok()),
    })
}

const AREA_PROJECTION: &str = "id, code, wardNumber, status, assignedTo, geometry, centroid";

pub fn list_areas(
    conn: &Connection,
    ward_number: Option<i64>,
    status: Option<AreaStatus>,
) -> Result<Vec<AreaRow>, QueryError> {
    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();
    if let Some(ward) = ward_number {
        where_parts.push("wardNumber = ?".to_string());
        params.push(SqlValue::Integer(ward));
    }
    if let Some(status) = status {
        where_parts.push("status = ?".to_string());
        params.push(SqlValue::Text(status.as_str().to_string()));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let sql = format!("SELECT {AREA_PROJECTION} FROM area{where_clause} ORDER BY code");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map_area)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRow {
    pub token: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaDetail {
    #[serde(flatten)]
    pub area: AreaRow,
    pub tokens: Vec<TokenRow>,
}

pub fn get_area(conn: &Connection, id: &str) -> Result<AreaDetail, QueryError> {
    let sql = format!("SELECT {AREA_PROJECTION} FROM area WHERE id = ?1");
    let area = conn
        .query_row(&sql, rusqlite::params![id], map_area)
        .optional()?
        .ok_or_else(|| {
            QueryError::new(QueryErrorCode::NotFound, format!("area not found: {id}"))
        })?;
    let mut stmt =
        conn.prepare("SELECT token, status FROM areaToken WHERE areaId = ?1 ORDER BY token")?;
    let tokens = stmt
        .query_map(rusqlite::params![id], |row| {
            Ok(TokenRow {
                token: row.get(0)?,
                status: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AreaDetail { area, tokens })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratorRow {
    pub id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub ward_number: Option<i64>,
    pub is_active: bool,
}

pub fn list_enumerators(
    conn: &Connection,
    ward_number: Option<i64>,
    is_active: Option<bool>,
) -> Result<Vec<EnumeratorRow>, QueryError> {
    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();
    if let Some(ward) = ward_number {
        where_parts.push("wardNumber = ?".to_string());
        params.push(SqlValue::Integer(ward));
    }
    if let Some(active) = is_active {
        where_parts.push("isActive = ?".to_string());
        params.push(SqlValue::Integer(active as i64));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let sql = format!(
        "SELECT id, name, phoneNumber, wardNumber, isActive FROM enumerator{where_clause} ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(EnumeratorRow {
                id: row.get(0)?,
                name: row.get(1)?,
                phone_number: row.get(2)?,
                ward_number: row.get(3)?,
                is_active: row.get::<_, i64>(4)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
