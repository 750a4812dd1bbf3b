#![forbid(unsafe_code)]
//! Palika model SSOT.
//!
//! ```compile_fail
//! use palika_model::AreaStatus;
//!
//! fn exhaustive_match(s: AreaStatus) -> &'static str {
//!     match s {
//!         AreaStatus::Unassigned => "u",
//!         AreaStatus::Assigned => "a",
//!         AreaStatus::Pending => "p",
//!     }
//! }
//! ```

mod geo;
mod ids;
mod status;

pub use geo::{is_valid_point, GeoPoint, GeoPolygon, LATITUDE_RANGE, LONGITUDE_RANGE};
pub use ids::{
    parse_area_id, parse_entity_id, parse_enumerator_id, parse_token_code, parse_ward_number,
    AreaId, EntityId, EnumeratorId, TokenCode, ValidationError, ID_MAX_LEN, TOKEN_MAX_LEN,
};
pub use status::{AreaStatus, EntityKind, ReviewAction, ReviewStatus, TokenStatus};

pub const CRATE_NAME: &str = "palika-model";
