use crate::{ErrorCode, RegistryError};
use palika_model::{
    parse_ward_number, AreaId, EntityId, EntityKind, EnumeratorId, GeoPoint, GeoPolygon, TokenCode,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::info;

pub fn create_ward(
    conn: &mut Connection,
    ward_number: i64,
    ward_area_code: i64,
) -> Result<(), RegistryError> {
    let ward = parse_ward_number(ward_number)
        .map_err(|e| RegistryError::new(ErrorCode::BadRequest, e.to_string()))?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO ward (wardNumber, wardAreaCode) VALUES (?1, ?2)",
        params![ward, ward_area_code],
    )?;
    if inserted == 0 {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!("ward {ward} already exists"),
        ));
    }
    info!(ward, "ward created");
    Ok(())
}

pub fn update_ward_area_code(
    conn: &mut Connection,
    ward_number: i64,
    ward_area_code: i64,
) -> Result<(), RegistryError> {
    let updated = conn.execute(
        "UPDATE ward SET wardAreaCode = ?1 WHERE wardNumber = ?2",
        params![ward_area_code, ward_number],
    )?;
    if updated == 0 {
        return Err(RegistryError::not_found("ward", &ward_number.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewArea {
    pub id: AreaId,
    pub code: String,
    pub ward_number: i64,
    pub geometry: Option<Value>,
    pub centroid: Option<Value>,
    pub tokens: Vec<TokenCode>,
}

/// Register an area with its boundary and pre-issued token pool. The area
/// starts `unassigned`; every token starts `unallocated`.
pub fn create_area(conn: &mut Connection, area: &NewArea) -> Result<(), RegistryError> {
    if area.code.trim().is_empty() {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            "area code must not be empty",
        ));
    }

    let geometry = match &area.geometry {
        Some(value) => Some(
            GeoPolygon::parse(value)
                .map_err(|e| RegistryError::new(ErrorCode::BadRequest, e.to_string()))?,
        ),
        None => None,
    };
    let centroid = match (&area.centroid, &geometry) {
        (Some(value), _) => Some(
            GeoPoint::parse(value)
                .map_err(|e| RegistryError::new(ErrorCode::BadRequest, e.to_string()))?,
        ),
        (None, Some(polygon)) => Some(polygon.centroid()),
        (None, None) => None,
    };

    let tx = conn.transaction()?;
    let ward: Option<i64> = tx
        .query_row(
            "SELECT wardNumber FROM ward WHERE wardNumber = ?1",
            params![area.ward_number],
            |row| row.get(0),
        )
        .optional()?;
    if ward.is_none() {
        return Err(RegistryError::not_found(
            "ward",
            &area.ward_number.to_string(),
        ));
    }

    let inserted = tx.execute(
        "INSERT OR IGNORE INTO area (id, code, wardNumber, geometry, centroid, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 'unassigned')",
        params![
            area.id.as_str(),
            area.code.trim(),
            area.ward_number,
            geometry.as_ref().map(|g| g.to_value().to_string()),
            centroid.as_ref().map(|c| c.to_value().to_string()),
        ],
    )?;
    if inserted == 0 {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!("area {} already exists", area.id),
        ));
    }

    for token in &area.tokens {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO areaToken (token, areaId, status) VALUES (?1, ?2, 'unallocated')",
            params![token.as_str(), area.id.as_str()],
        )?;
        if inserted == 0 {
            return Err(RegistryError::new(
                ErrorCode::BadRequest,
                format!("token {token} is already issued"),
            ));
        }
    }

    tx.commit()?;
    info!(
        area = area.id.as_str(),
        ward = area.ward_number,
        tokens = area.tokens.len(),
        "area created"
    );
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewEnumerator {
    pub id: EnumeratorId,
    pub name: String,
    pub phone_number: Option<String>,
    pub ward_number: Option<i64>,
    pub is_active: bool,
}

pub fn create_enumerator(
    conn: &mut Connection,
    enumerator: &NewEnumerator,
) -> Result<(), RegistryError> {
    if enumerator.name.trim().is_empty() {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            "enumerator name must not be empty",
        ));
    }
    let tx = conn.transaction()?;
    if let Some(ward) = enumerator.ward_number {
        let found: Option<i64> = tx
            .query_row(
                "SELECT wardNumber FROM ward WHERE wardNumber = ?1",
                params![ward],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(RegistryError::not_found("ward", &ward.to_string()));
        }
    }
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO enumerator (id, name, phoneNumber, wardNumber, isActive)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            enumerator.id.as_str(),
            enumerator.name.trim(),
            enumerator.phone_number,
            enumerator.ward_number,
            enumerator.is_active as i64,
        ],
    )?;
    if inserted == 0 {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!("enumerator {} already exists", enumerator.id),
        ));
    }
    tx.commit()?;
    Ok(())
}

/// Profile edit; absent fields stay untouched. Credentials live in the
/// upstream auth layer, so there is nothing password-shaped here.
#[derive(Debug, Clone, Default)]
pub struct EnumeratorUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub ward_number: Option<i64>,
    pub is_active: Option<bool>,
}

pub fn update_enumerator(
    conn: &mut Connection,
    id: &EnumeratorId,
    update: &EnumeratorUpdate,
) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    let found: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM enumerator WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(RegistryError::not_found("enumerator", id.as_str()));
    }
    if let Some(ward) = update.ward_number {
        let exists: Option<i64> = tx
            .query_row(
                "SELECT wardNumber FROM ward WHERE wardNumber = ?1",
                params![ward],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(RegistryError::not_found("ward", &ward.to_string()));
        }
    }
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(RegistryError::new(
                ErrorCode::BadRequest,
                "enumerator name must not be empty",
            ));
        }
        tx.execute(
            "UPDATE enumerator SET name = ?1 WHERE id = ?2",
            params![name.trim(), id.as_str()],
        )?;
    }
    if let Some(phone) = &update.phone_number {
        tx.execute(
            "UPDATE enumerator SET phoneNumber = ?1 WHERE id = ?2",
            params![phone, id.as_str()],
        )?;
    }
    if let Some(ward) = update.ward_number {
        tx.execute(
            "UPDATE enumerator SET wardNumber = ?1 WHERE id = ?2",
            params![ward, id.as_str()],
        )?;
    }
    if let Some(active) = update.is_active {
        tx.execute(
            "UPDATE enumerator SET isActive = ?1 WHERE id = ?2",
            params![active as i64, id.as_str()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// The only physical delete in the system. Releases any held token before
/// the row goes.
pub fn delete_entity(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &EntityId,
) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    let sql = format!(
        "SELECT buildingToken FROM {} WHERE id = ?1",
        kind.table()
    );
    let row: Option<Option<String>> = tx
        .query_row(&sql, params![entity_id.as_str()], |row| row.get(0))
        .optional()?;
    let Some(token) = row else {
        return Err(RegistryError::not_found(kind.table(), entity_id.as_str()));
    };
    if let Some(token) = token {
        tx.execute(
            "UPDATE areaToken SET status = 'unallocated' WHERE token = ?1",
            params![token],
        )?;
    }
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
    tx.execute(&sql, params![entity_id.as_str()])?;
    tx.commit()?;
    info!(
        kind = kind.table(),
        entity = entity_id.as_str(),
        "entity deleted"
    );
    Ok(())
}
