use palika_api::params::{parse_area_filters, parse_enumerator_filters, parse_list_params};
use palika_api::ApiErrorCode;
use palika_model::{AreaStatus, ReviewStatus};
use palika_query::{QueryLimits, SortKey, SortOrder};
use std::collections::BTreeMap;

fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn defaults_apply_when_nothing_is_passed() {
    let req = parse_list_params(&query(&[]), &QueryLimits::default()).expect("params");
    assert_eq!(req.limit, 100);
    assert_eq!(req.offset, 0);
    assert_eq!(req.sort_key, SortKey::Id);
    assert_eq!(req.sort_order, SortOrder::Asc);
    assert_eq!(req.filter.ward_number, None);
    assert_eq!(req.filter.status, None);
}

#[test]
fn filters_parse_into_the_request() {
    let req = parse_list_params(
        &query(&[
            ("wardNumber", "3"),
            ("areaId", "a1"),
            ("enumeratorId", "e1"),
            ("status", "pending"),
            ("sortBy", "wardNumber"),
            ("sortOrder", "desc"),
            ("limit", "25"),
            ("offset", "50"),
        ]),
        &QueryLimits::default(),
    )
    .expect("params");
    assert_eq!(req.filter.ward_number, Some(3));
    assert_eq!(req.filter.area_id.as_deref(), Some("a1"));
    assert_eq!(req.filter.enumerator_id.as_deref(), Some("e1"));
    assert_eq!(req.filter.status, Some(ReviewStatus::Pending));
    assert_eq!(req.sort_key, SortKey::WardNumber);
    assert_eq!(req.sort_order, SortOrder::Desc);
    assert_eq!(req.limit, 25);
    assert_eq!(req.offset, 50);
}

#[test]
fn unknown_sort_by_falls_back_to_id_without_error() {
    let req = parse_list_params(
        &query(&[("sortBy", "memberCount; DROP TABLE family")]),
        &QueryLimits::default(),
    )
    .expect("params");
    assert_eq!(req.sort_key, SortKey::Id);
}

#[test]
fn bad_limit_offset_and_status_are_rejected() {
    let limits = QueryLimits::default();
    for (key, value) in [
        ("limit", "0"),
        ("limit", "9999"),
        ("limit", "abc"),
        ("offset", "-1"),
        ("status", "done"),
        ("wardNumber", "three"),
    ] {
        let err = parse_list_params(&query(&[(key, value)]), &limits).expect_err(key);
        assert_eq!(err.code, ApiErrorCode::BadRequest);
    }
}

#[test]
fn area_filters_parse_status_enum() {
    let (ward, status) =
        parse_area_filters(&query(&[("wardNumber", "2"), ("status", "assigned")]))
            .expect("filters");
    assert_eq!(ward, Some(2));
    assert_eq!(status, Some(AreaStatus::Assigned));

    let err = parse_area_filters(&query(&[("status", "busy")])).expect_err("bad status");
    assert_eq!(err.code, ApiErrorCode::BadRequest);
}

#[test]
fn enumerator_filters_parse_activity_flag() {
    let (_, active) = parse_enumerator_filters(&query(&[("isActive", "true")])).expect("filters");
    assert_eq!(active, Some(true));
    let (_, active) = parse_enumerator_filters(&query(&[("isActive", "0")])).expect("filters");
    assert_eq!(active, Some(false));
    let err = parse_enumerator_filters(&query(&[("isActive", "maybe")])).expect_err("bad flag");
    assert_eq!(err.code, ApiErrorCode::BadRequest);
}
