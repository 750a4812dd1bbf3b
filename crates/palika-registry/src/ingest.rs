use crate::RegistryError;
use palika_model::{is_valid_point, EntityId};
use rusqlite::{params, Connection};
use serde_json::Value;

/// Malformed location payloads are dropped, not rejected; viewers simply get
/// no map widget for the row.
fn point_text(value: Option<&Value>) -> Option<String> {
    value.filter(|v| is_valid_point(v)).map(Value::to_string)
}

fn list_text(items: &[String]) -> Result<String, RegistryError> {
    serde_json::to_string(items)
        .map_err(|e| RegistryError::new(crate::ErrorCode::Internal, e.to_string()))
}

#[derive(Debug, Clone)]
pub struct NewBuilding {
    pub id: EntityId,
    pub ward_number: Option<i64>,
    pub geom: Option<Value>,
    pub total_families: Option<i64>,
    pub total_businesses: Option<i64>,
}

/// Insert or refresh a building row from a submission. A re-submitted row
/// returns to `pending` review; its assignment references are preserved.
pub fn upsert_building(conn: &Connection, building: &NewBuilding) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO building (id, wardNumber, geom, totalFamilies, totalBusinesses, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending')
         ON CONFLICT(id) DO UPDATE SET
           wardNumber = excluded.wardNumber,
           geom = excluded.geom,
           totalFamilies = excluded.totalFamilies,
           totalBusinesses = excluded.totalBusinesses,
           status = 'pending'",
        params![
            building.id.as_str(),
            building.ward_number,
            point_text(building.geom.as_ref()),
            building.total_families,
            building.total_businesses,
        ],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub id: EntityId,
    pub ward_number: Option<i64>,
    pub name: Option<String>,
    pub nature_of_business: Option<String>,
    pub employee_count: Option<i64>,
    pub crops: Vec<String>,
    pub animals: Vec<String>,
    pub gps: Option<Value>,
}

pub fn upsert_business(conn: &Connection, business: &NewBusiness) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO business (id, wardNumber, name, natureOfBusiness, employeeCount, crops, animals, gps, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending')
         ON CONFLICT(id) DO UPDATE SET
           wardNumber = excluded.wardNumber,
           name = excluded.name,
           natureOfBusiness = excluded.natureOfBusiness,
           employeeCount = excluded.employeeCount,
           crops = excluded.crops,
           animals = excluded.animals,
           gps = excluded.gps,
           status = 'pending'",
        params![
            business.id.as_str(),
            business.ward_number,
            business.name,
            business.nature_of_business,
            business.employee_count,
            list_text(&business.crops)?,
            list_text(&business.animals)?,
            point_text(business.gps.as_ref()),
        ],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewFamily {
    pub id: EntityId,
    pub ward_number: Option<i64>,
    pub head_name: Option<String>,
    pub member_count: Option<i64>,
    pub facilities: Vec<String>,
    pub gps: Option<Value>,
}

pub fn upsert_family(conn: &Connection, family: &NewFamily) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO family (id, wardNumber, headName, memberCount, facilities, gps, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending')
         ON CONFLICT(id) DO UPDATE SET
           wardNumber = excluded.wardNumber,
           headName = excluded.headName,
           memberCount = excluded.memberCount,
           facilities = excluded.facilities,
           gps = excluded.gps,
           status = 'pending'",
        params![
            family.id.as_str(),
            family.ward_number,
            family.head_name,
            family.member_count,
            list_text(&family.facilities)?,
            point_text(family.gps.as_ref()),
        ],
    )?;
    Ok(())
}
