#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

mod admin;
mod assignment;
mod ingest;
mod schema;

pub use admin::{
    create_area, create_enumerator, create_ward, delete_entity, update_enumerator,
    update_ward_area_code, EnumeratorUpdate, NewArea, NewEnumerator,
};
pub use assignment::{
    assign_area, assign_area_to_enumerator, assign_enumerator, assign_ward, complete_area,
    review_entity, withdraw_area,
};
pub use ingest::{upsert_building, upsert_business, upsert_family, NewBuilding, NewBusiness, NewFamily};
pub use schema::{init_schema, open_registry, SCHEMA_VERSION};

pub const CRATE_NAME: &str = "palika-registry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    NotFound,
    BadRequest,
    Unauthorized,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError {
    pub code: ErrorCode,
    pub message: String,
}

impl RegistryError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(what: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{what} not found: {id}"))
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for RegistryError {}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::new(ErrorCode::Internal, e.to_string())
    }
}

#[cfg(test)]
mod registry_tests;
