use crate::errors::ApiError;
use palika_model::{AreaStatus, ReviewStatus};
use palika_query::{EntityFilter, ListRequest, QueryLimits, SortKey, SortOrder};
use std::collections::BTreeMap;

/// Parse list-endpoint query parameters.
///
/// An unrecognized `sortBy` silently falls back to `id`. Filter values are
/// validated: a misspelled status would otherwise return an empty page that
/// looks like real data.
pub fn parse_list_params(
    query: &BTreeMap<String, String>,
    limits: &QueryLimits,
) -> Result<ListRequest, ApiError> {
    let limit = if let Some(raw) = query.get("limit") {
        let value = raw
            .parse::<usize>()
            .map_err(|_| ApiError::invalid_param("limit", raw))?;
        if value == 0 || value > limits.max_limit {
            return Err(ApiError::invalid_param("limit", raw));
        }
        value
    } else {
        limits.default_limit
    };

    let offset = if let Some(raw) = query.get("offset") {
        raw.parse::<usize>()
            .map_err(|_| ApiError::invalid_param("offset", raw))?
    } else {
        0
    };

    let ward_number = match query.get("wardNumber") {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::invalid_param("wardNumber", raw))?,
        ),
        None => None,
    };

    let status = match query.get("status") {
        Some(raw) => Some(
            ReviewStatus::parse(raw).map_err(|_| ApiError::invalid_param("status", raw))?,
        ),
        None => None,
    };

    Ok(ListRequest {
        filter: EntityFilter {
            ward_number,
            area_id: query.get("areaId").cloned(),
            enumerator_id: query.get("enumeratorId").cloned(),
            status,
        },
        sort_key: query
            .get("sortBy")
            .map_or(SortKey::Id, |raw| SortKey::parse_or_default(raw)),
        sort_order: query
            .get("sortOrder")
            .map_or(SortOrder::Asc, |raw| SortOrder::parse_or_default(raw)),
        limit,
        offset,
    })
}

pub fn parse_area_filters(
    query: &BTreeMap<String, String>,
) -> Result<(Option<i64>, Option<AreaStatus>), ApiError> {
    let ward_number = match query.get("wardNumber") {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::invalid_param("wardNumber", raw))?,
        ),
        None => None,
    };
    let status = match query.get("status") {
        Some(raw) => {
            Some(AreaStatus::parse(raw).map_err(|_| ApiError::invalid_param("status", raw))?)
        }
        None => None,
    };
    Ok((ward_number, status))
}

pub fn parse_enumerator_filters(
    query: &BTreeMap<String, String>,
) -> Result<(Option<i64>, Option<bool>), ApiError> {
    let ward_number = match query.get("wardNumber") {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::invalid_param("wardNumber", raw))?,
        ),
        None => None,
    };
    let is_active = match query.get("isActive") {
        Some(raw) => match raw.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => return Err(ApiError::invalid_param("isActive", raw)),
        },
        None => None,
    };
    Ok((ward_number, is_active))
}
