// SPDX-License-Identifier: Apache-2.0

use crate::RegistryError;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

/// Column names follow the survey-collection tool's schemas verbatim, which
/// is why they are camelCase inside SQLite.
pub fn init_schema(conn: &Connection) -> Result<(), RegistryError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS ward (
          wardNumber INTEGER PRIMARY KEY,
          wardAreaCode INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS area (
          id TEXT PRIMARY KEY,
          code TEXT NOT NULL,
          wardNumber INTEGER NOT NULL,
          geometry TEXT,
          centroid TEXT,
          status TEXT NOT NULL DEFAULT 'unassigned',
          assignedTo TEXT
        );
        CREATE TABLE IF NOT EXISTS areaToken (
          token TEXT PRIMARY KEY,
          areaId TEXT NOT NULL,
          status TEXT NOT NULL DEFAULT 'unallocated'
        );
        CREATE TABLE IF NOT EXISTS building (
          id TEXT PRIMARY KEY,
          wardNumber INTEGER,
          areaId TEXT,
          enumeratorId TEXT,
          buildingToken TEXT,
          geom TEXT,
          totalFamilies INTEGER,
          totalBusinesses INTEGER,
          status TEXT NOT NULL DEFAULT 'pending'
        );
        CREATE TABLE IF NOT EXISTS business (
          id TEXT PRIMARY KEY,
          wardNumber INTEGER,
          areaId TEXT,
          enumeratorId TEXT,
          buildingToken TEXT,
          name TEXT,
          natureOfBusiness TEXT,
          employeeCount INTEGER,
          crops TEXT,
          animals TEXT,
          gps TEXT,
          status TEXT NOT NULL DEFAULT 'pending'
        );
        CREATE TABLE IF NOT EXISTS family (
          id TEXT PRIMARY KEY,
          wardNumber INTEGER,
          areaId TEXT,
          enumeratorId TEXT,
          buildingToken TEXT,
          headName TEXT,
          memberCount INTEGER,
          facilities TEXT,
          gps TEXT,
          status TEXT NOT NULL DEFAULT 'pending'
        );
        CREATE TABLE IF NOT EXISTS enumerator (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          phoneNumber TEXT,
          wardNumber INTEGER,
          isActive INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_area_ward ON area(wardNumber);
        CREATE INDEX IF NOT EXISTS idx_area_status ON area(status);
        CREATE INDEX IF NOT EXISTS idx_token_area ON areaToken(areaId);
        CREATE INDEX IF NOT EXISTS idx_building_ward ON building(wardNumber);
        CREATE INDEX IF NOT EXISTS idx_building_area ON building(areaId);
        CREATE INDEX IF NOT EXISTS idx_business_ward ON business(wardNumber);
        CREATE INDEX IF NOT EXISTS idx_business_area ON business(areaId);
        CREATE INDEX IF NOT EXISTS idx_family_ward ON family(wardNumber);
        CREATE INDEX IF NOT EXISTS idx_family_area ON family(areaId);
        ",
    )?;
    conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))?;
    Ok(())
}

pub fn open_registry(path: &Path) -> Result<Connection, RegistryError> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
        PRAGMA temp_store=MEMORY;
        PRAGMA cache_size=-16000;
        ",
    )?;
    init_schema(&conn)?;
    info!(path = %path.display(), "registry opened");
    Ok(conn)
}
