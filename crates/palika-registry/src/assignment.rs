// SPDX-License-Identifier: Apache-2.0

use crate::{ErrorCode, RegistryError};
use palika_model::{
    AreaId, AreaStatus, EntityId, EntityKind, EnumeratorId, ReviewAction, ReviewStatus, TokenCode,
    TokenStatus,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

fn entity_refs(
    conn: &Connection,
    kind: EntityKind,
    id: &EntityId,
) -> Result<Option<(Option<String>, Option<String>)>, RegistryError> {
    let sql = format!(
        "SELECT areaId, buildingToken FROM {} WHERE id = ?1",
        kind.table()
    );
    Ok(conn
        .query_row(&sql, params![id.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?)
}

fn area_status(conn: &Connection, id: &AreaId) -> Result<Option<AreaStatus>, RegistryError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT status FROM area WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        None => Ok(None),
        Some(s) => AreaStatus::parse(&s)
            .map(Some)
            .map_err(|e| RegistryError::new(ErrorCode::Internal, e.to_string())),
    }
}

fn enumerator_exists(conn: &Connection, id: &EnumeratorId) -> Result<bool, RegistryError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM enumerator WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn release_token(conn: &Connection, token: &str) -> Result<(), RegistryError> {
    conn.execute(
        "UPDATE areaToken SET status = 'unallocated' WHERE token = ?1",
        params![token],
    )?;
    Ok(())
}

/// Re-point an entity's area reference and, optionally, its token.
///
/// A cleared area always clears the token with it, and a token may only be
/// taken from the pool of the area being assigned. Both updates and the token
/// bookkeeping land in one transaction; the select-filtering the admin UI
/// does is not trusted here.
pub fn assign_area(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &EntityId,
    area_id: Option<&AreaId>,
    token: Option<&TokenCode>,
) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    let Some((current_area, current_token)) = entity_refs(&tx, kind, entity_id)? else {
        return Err(RegistryError::not_found(kind.table(), entity_id.as_str()));
    };

    match area_id {
        None => {
            if let Some(old) = current_token.as_deref() {
                release_token(&tx, old)?;
            }
            let sql = format!(
                "UPDATE {} SET areaId = NULL, buildingToken = NULL WHERE id = ?1",
                kind.table()
            );
            tx.execute(&sql, params![entity_id.as_str()])?;
        }
        Some(area) => {
            if area_status(&tx, area)?.is_none() {
                return Err(RegistryError::not_found("area", area.as_str()));
            }
            if let Some(tok) = token {
                let found: Option<(String, String)> = tx
                    .query_row(
                        "SELECT areaId, status FROM areaToken WHERE token = ?1",
                        params![tok.as_str()],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                let Some((token_area, token_status)) = found else {
                    return Err(RegistryError::not_found("token", tok.as_str()));
                };
                if token_area != area.as_str() {
                    return Err(RegistryError::new(
                        ErrorCode::BadRequest,
                        format!("token {tok} does not belong to area {area}"),
                    ));
                }
                let status = TokenStatus::parse(&token_status)
                    .map_err(|e| RegistryError::new(ErrorCode::Internal, e.to_string()))?;
                let held_already = current_token.as_deref() == Some(tok.as_str());
                if status == TokenStatus::Allocated && !held_already {
                    return Err(RegistryError::new(
                        ErrorCode::BadRequest,
                        format!("token {tok} is already allocated"),
                    ));
                }
                if let Some(old) = current_token.as_deref() {
                    if old != tok.as_str() {
                        release_token(&tx, old)?;
                    }
                }
                tx.execute(
                    "UPDATE areaToken SET status = 'allocated' WHERE token = ?1",
                    params![tok.as_str()],
                )?;
                let sql = format!(
                    "UPDATE {} SET areaId = ?1, buildingToken = ?2 WHERE id = ?3",
                    kind.table()
                );
                tx.execute(&sql, params![area.as_str(), tok.as_str(), entity_id.as_str()])?;
            } else if current_area.as_deref() == Some(area.as_str()) {
                let sql = format!("UPDATE {} SET areaId = ?1 WHERE id = ?2", kind.table());
                tx.execute(&sql, params![area.as_str(), entity_id.as_str()])?;
            } else {
                // a held token never outlives its area association
                if let Some(old) = current_token.as_deref() {
                    release_token(&tx, old)?;
                }
                let sql = format!(
                    "UPDATE {} SET areaId = ?1, buildingToken = NULL WHERE id = ?2",
                    kind.table()
                );
                tx.execute(&sql, params![area.as_str(), entity_id.as_str()])?;
            }
        }
    }

    tx.commit()?;
    info!(
        kind = kind.table(),
        entity = entity_id.as_str(),
        area = area_id.map(AreaId::as_str),
        "area assignment applied"
    );
    Ok(())
}

/// Set or clear the ward reference. A ward that contradicts the entity's
/// current area is rejected; ward and area must agree at the row level.
pub fn assign_ward(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &EntityId,
    ward_number: Option<i64>,
) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    let Some((current_area, _)) = entity_refs(&tx, kind, entity_id)? else {
        return Err(RegistryError::not_found(kind.table(), entity_id.as_str()));
    };

    if let Some(ward) = ward_number {
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
        if let Some(area) = current_area.as_deref() {
            let area_ward: Option<i64> = tx
                .query_row(
                    "SELECT wardNumber FROM area WHERE id = ?1",
                    params![area],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(area_ward) = area_ward {
                if area_ward != ward {
                    return Err(RegistryError::new(
                        ErrorCode::BadRequest,
                        format!(
                            "ward {ward} contradicts assigned area {area} in ward {area_ward}"
                        ),
                    ));
                }
            }
        }
        let sql = format!("UPDATE {} SET wardNumber = ?1 WHERE id = ?2", kind.table());
        tx.execute(&sql, params![ward, entity_id.as_str()])?;
    } else {
        let sql = format!("UPDATE {} SET wardNumber = NULL WHERE id = ?1", kind.table());
        tx.execute(&sql, params![entity_id.as_str()])?;
    }

    tx.commit()?;
    Ok(())
}

/// Entity-level enumerator assignment. Never touches area status; only
/// area-level actions move an area through its lifecycle.
pub fn assign_enumerator(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &EntityId,
    enumerator_id: &EnumeratorId,
) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    if entity_refs(&tx, kind, entity_id)?.is_none() {
        return Err(RegistryError::not_found(kind.table(), entity_id.as_str()));
    }
    if !enumerator_exists(&tx, enumerator_id)? {
        return Err(RegistryError::not_found(
            "enumerator",
            enumerator_id.as_str(),
        ));
    }
    let sql = format!(
        "UPDATE {} SET enumeratorId = ?1 WHERE id = ?2",
        kind.table()
    );
    tx.execute(&sql, params![enumerator_id.as_str(), entity_id.as_str()])?;
    tx.commit()?;
    Ok(())
}

pub fn assign_area_to_enumerator(
    conn: &mut Connection,
    area_id: &AreaId,
    enumerator_id: &EnumeratorId,
) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    let Some(status) = area_status(&tx, area_id)? else {
        return Err(RegistryError::not_found("area", area_id.as_str()));
    };
    if !enumerator_exists(&tx, enumerator_id)? {
        return Err(RegistryError::not_found(
            "enumerator",
            enumerator_id.as_str(),
        ));
    }
    if !status.can_transition(AreaStatus::Assigned) {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!("area {area_id} cannot move from {status} to assigned"),
        ));
    }
    tx.execute(
        "UPDATE area SET status = 'assigned', assignedTo = ?1 WHERE id = ?2",
        params![enumerator_id.as_str(), area_id.as_str()],
    )?;
    tx.commit()?;
    info!(
        area = area_id.as_str(),
        enumerator = enumerator_id.as_str(),
        "area assigned"
    );
    Ok(())
}

pub fn complete_area(conn: &mut Connection, area_id: &AreaId) -> Result<(), RegistryError> {
    let tx = conn.transaction()?;
    let Some(status) = area_status(&tx, area_id)? else {
        return Err(RegistryError::not_found("area", area_id.as_str()));
    };
    if !status.can_transition(AreaStatus::Pending) {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!("area {area_id} cannot move from {status} to pending"),
        ));
    }
    tx.execute(
        "UPDATE area SET status = 'pending' WHERE id = ?1",
        params![area_id.as_str()],
    )?;
    tx.commit()?;
    Ok(())
}

/// Withdrawal returns an active area to `unassigned` and dissociates whoever
/// held it. The requesting user must be identified; an anonymous withdrawal
/// is rejected before the row is even read.
pub fn withdraw_area(
    conn: &mut Connection,
    area_id: &AreaId,
    user_id: &str,
) -> Result<(), RegistryError> {
    if user_id.trim().is_empty() {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            "withdrawal requires a non-empty user id",
        ));
    }
    let tx = conn.transaction()?;
    let Some(status) = area_status(&tx, area_id)? else {
        return Err(RegistryError::not_found("area", area_id.as_str()));
    };
    if !status.is_withdrawable() {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!("area {area_id} in status {status} cannot be withdrawn"),
        ));
    }
    tx.execute(
        "UPDATE area SET status = 'unassigned', assignedTo = NULL WHERE id = ?1",
        params![area_id.as_str()],
    )?;
    tx.commit()?;
    info!(
        area = area_id.as_str(),
        user = user_id,
        from = status.as_str(),
        "area withdrawn"
    );
    Ok(())
}

/// Apply an admin review verdict to a submitted entity. Verdicts only apply
/// to `pending` rows, for every entity kind alike; a row sent back for edits
/// re-enters `pending` through ingestion when the corrected upload arrives.
pub fn review_entity(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &EntityId,
    action: ReviewAction,
) -> Result<ReviewStatus, RegistryError> {
    let tx = conn.transaction()?;
    let sql = format!("SELECT status FROM {} WHERE id = ?1", kind.table());
    let raw: Option<String> = tx
        .query_row(&sql, params![entity_id.as_str()], |row| row.get(0))
        .optional()?;
    let Some(raw) = raw else {
        return Err(RegistryError::not_found(kind.table(), entity_id.as_str()));
    };
    let status = ReviewStatus::parse(&raw)
        .map_err(|e| RegistryError::new(ErrorCode::Internal, e.to_string()))?;
    if !status.can_apply(action) {
        return Err(RegistryError::new(
            ErrorCode::BadRequest,
            format!(
                "cannot {} a {} submission in status {}",
                action.as_str(),
                kind.table(),
                status
            ),
        ));
    }
    let next = action.resulting_status();
    let sql = format!("UPDATE {} SET status = ?1 WHERE id = ?2", kind.table());
    tx.execute(&sql, params![next.as_str(), entity_id.as_str()])?;
    tx.commit()?;
    info!(
        kind = kind.table(),
        entity = entity_id.as_str(),
        action = action.as_str(),
        "review applied"
    );
    Ok(next)
}
