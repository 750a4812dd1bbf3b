use super::*;
use palika_model::{
    AreaId, AreaStatus, EntityId, EntityKind, EnumeratorId, ReviewAction, ReviewStatus, TokenCode,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;

fn area_id(raw: &str) -> AreaId {
    AreaId::parse(raw).expect("area id")
}

fn entity_id(raw: &str) -> EntityId {
    EntityId::parse(raw).expect("entity id")
}

fn enumerator_id(raw: &str) -> EnumeratorId {
    EnumeratorId::parse(raw).expect("enumerator id")
}

fn token(raw: &str) -> TokenCode {
    TokenCode::parse(raw).expect("token")
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().expect("open memory db");
    init_schema(&conn).expect("schema");

    create_ward(&mut conn, 3, 977).expect("ward 3");
    create_ward(&mut conn, 4, 978).expect("ward 4");
    create_area(
        &mut conn,
        &NewArea {
            id: area_id("a1"),
            code: "A1".to_string(),
            ward_number: 3,
            geometry: Some(json!({"type": "Polygon", "coordinates":
                [[[85.0, 27.0], [85.1, 27.0], [85.1, 27.1], [85.0, 27.0]]]})),
            centroid: None,
            tokens: vec![token("T-1"), token("T-2")],
        },
    )
    .expect("area a1");
    create_area(
        &mut conn,
        &NewArea {
            id: area_id("a2"),
            code: "A2".to_string(),
            ward_number: 4,
            geometry: None,
            centroid: None,
            tokens: vec![token("T-9")],
        },
    )
    .expect("area a2");
    create_enumerator(
        &mut conn,
        &NewEnumerator {
            id: enumerator_id("e1"),
            name: "Sita".to_string(),
            phone_number: Some("9841000000".to_string()),
            ward_number: Some(3),
            is_active: true,
        },
    )
    .expect("enumerator");
    upsert_building(
        &conn,
        &NewBuilding {
            id: entity_id("b1"),
            ward_number: Some(3),
            geom: Some(json!({"type": "Point", "coordinates": [85.05, 27.05]})),
            total_families: Some(2),
            total_businesses: Some(1),
        },
    )
    .expect("building b1");
    upsert_building(
        &conn,
        &NewBuilding {
            id: entity_id("b2"),
            ward_number: Some(3),
            geom: None,
            total_families: None,
            total_businesses: None,
        },
    )
    .expect("building b2");
    conn
}

fn building_refs(conn: &Connection, id: &str) -> (Option<String>, Option<String>) {
    conn.query_row(
        "SELECT areaId, buildingToken FROM building WHERE id = ?1",
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .expect("building row")
}

fn token_status(conn: &Connection, tok: &str) -> String {
    conn.query_row(
        "SELECT status FROM areaToken WHERE token = ?1",
        params![tok],
        |row| row.get(0),
    )
    .expect("token row")
}

fn area_state(conn: &Connection, id: &str) -> (String, Option<String>) {
    conn.query_row(
        "SELECT status, assignedTo FROM area WHERE id = ?1",
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .expect("area row")
}

#[test]
fn assign_area_with_token_allocates_it() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("assign");
    let (area, tok) = building_refs(&conn, "b1");
    assert_eq!(area.as_deref(), Some("a1"));
    assert_eq!(tok.as_deref(), Some("T-1"));
    assert_eq!(token_status(&conn, "T-1"), "allocated");
}

#[test]
fn assign_area_null_clears_area_and_token() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("assign");
    assign_area(&mut conn, EntityKind::Building, &entity_id("b1"), None, None).expect("clear");
    let (area, tok) = building_refs(&conn, "b1");
    assert_eq!(area, None);
    assert_eq!(tok, None);
    assert_eq!(token_status(&conn, "T-1"), "unallocated");
}

#[test]
fn assign_area_null_is_a_no_op_on_unassigned_rows() {
    let mut conn = setup();
    assign_area(&mut conn, EntityKind::Building, &entity_id("b2"), None, None).expect("clear");
    let (area, tok) = building_refs(&conn, "b2");
    assert_eq!(area, None);
    assert_eq!(tok, None);
}

#[test]
fn allocated_token_cannot_move_to_another_building() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("assign b1");
    let err = assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b2"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect_err("token is taken");
    assert_eq!(err.code, ErrorCode::BadRequest);
    let (area, tok) = building_refs(&conn, "b2");
    assert_eq!(area, None, "failed mutation must leave the row untouched");
    assert_eq!(tok, None);
}

#[test]
fn token_resave_is_idempotent() {
    let mut conn = setup();
    for _ in 0..2 {
        assign_area(
            &mut conn,
            EntityKind::Building,
            &entity_id("b1"),
            Some(&area_id("a1")),
            Some(&token("T-1")),
        )
        .expect("assign");
    }
    assert_eq!(token_status(&conn, "T-1"), "allocated");
    let (_, tok) = building_refs(&conn, "b1");
    assert_eq!(tok.as_deref(), Some("T-1"));
}

#[test]
fn token_from_another_areas_pool_is_rejected() {
    let mut conn = setup();
    let err = assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-9")),
    )
    .expect_err("wrong pool");
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[test]
fn switching_token_releases_the_old_one() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("first token");
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-2")),
    )
    .expect("second token");
    assert_eq!(token_status(&conn, "T-1"), "unallocated");
    assert_eq!(token_status(&conn, "T-2"), "allocated");
}

#[test]
fn moving_areas_without_a_token_drops_the_held_token() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("assign with token");
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a2")),
        None,
    )
    .expect("move area");
    let (area, tok) = building_refs(&conn, "b1");
    assert_eq!(area.as_deref(), Some("a2"));
    assert_eq!(tok, None);
    assert_eq!(token_status(&conn, "T-1"), "unallocated");
}

#[test]
fn assign_area_unknown_entity_is_not_found() {
    let mut conn = setup();
    let err = assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("ghost"),
        Some(&area_id("a1")),
        None,
    )
    .expect_err("missing entity");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn assign_ward_validates_existence_and_area_agreement() {
    let mut conn = setup();
    let err = assign_ward(&mut conn, EntityKind::Building, &entity_id("b1"), Some(99))
        .expect_err("unknown ward");
    assert_eq!(err.code, ErrorCode::NotFound);

    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        None,
    )
    .expect("assign area in ward 3");
    let err = assign_ward(&mut conn, EntityKind::Building, &entity_id("b1"), Some(4))
        .expect_err("ward contradicts area");
    assert_eq!(err.code, ErrorCode::BadRequest);

    assign_ward(&mut conn, EntityKind::Building, &entity_id("b1"), Some(3)).expect("agreeing ward");
    assign_ward(&mut conn, EntityKind::Building, &entity_id("b1"), None).expect("clear ward");
}

#[test]
fn building_enumerator_assignment_leaves_area_status_alone() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        None,
    )
    .expect("area ref");
    assign_enumerator(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        &enumerator_id("e1"),
    )
    .expect("enumerator");

    let got: Option<String> = conn
        .query_row(
            "SELECT enumeratorId FROM building WHERE id = 'b1'",
            [],
            |row| row.get(0),
        )
        .optional()
        .expect("row");
    assert_eq!(got.as_deref(), Some("e1"));
    let (status, _) = area_state(&conn, "a1");
    assert_eq!(status, "unassigned");
}

#[test]
fn assign_enumerator_requires_both_rows() {
    let mut conn = setup();
    let err = assign_enumerator(
        &mut conn,
        EntityKind::Building,
        &entity_id("ghost"),
        &enumerator_id("e1"),
    )
    .expect_err("missing entity");
    assert_eq!(err.code, ErrorCode::NotFound);
    let err = assign_enumerator(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        &enumerator_id("e9"),
    )
    .expect_err("missing enumerator");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn area_lifecycle_assign_complete_withdraw() {
    let mut conn = setup();
    assign_area_to_enumerator(&mut conn, &area_id("a1"), &enumerator_id("e1")).expect("assign");
    let (status, holder) = area_state(&conn, "a1");
    assert_eq!(status, AreaStatus::Assigned.as_str());
    assert_eq!(holder.as_deref(), Some("e1"));

    complete_area(&mut conn, &area_id("a1")).expect("complete");
    let (status, _) = area_state(&conn, "a1");
    assert_eq!(status, AreaStatus::Pending.as_str());

    withdraw_area(&mut conn, &area_id("a1"), "admin-1").expect("withdraw");
    let (status, holder) = area_state(&conn, "a1");
    assert_eq!(status, AreaStatus::Unassigned.as_str());
    assert_eq!(holder, None);
}

#[test]
fn pending_area_cannot_be_reassigned_without_withdrawal() {
    let mut conn = setup();
    assign_area_to_enumerator(&mut conn, &area_id("a1"), &enumerator_id("e1")).expect("assign");
    complete_area(&mut conn, &area_id("a1")).expect("complete");
    let err = assign_area_to_enumerator(&mut conn, &area_id("a1"), &enumerator_id("e1"))
        .expect_err("pending area");
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[test]
fn withdraw_requires_a_user_id() {
    let mut conn = setup();
    assign_area_to_enumerator(&mut conn, &area_id("a1"), &enumerator_id("e1")).expect("assign");
    let err = withdraw_area(&mut conn, &area_id("a1"), "").expect_err("empty user");
    assert_eq!(err.code, ErrorCode::BadRequest);
    let err = withdraw_area(&mut conn, &area_id("a1"), "   ").expect_err("blank user");
    assert_eq!(err.code, ErrorCode::BadRequest);
    let (status, _) = area_state(&conn, "a1");
    assert_eq!(status, "assigned");
}

#[test]
fn withdraw_of_unassigned_area_is_rejected() {
    let mut conn = setup();
    let err = withdraw_area(&mut conn, &area_id("a1"), "admin-1").expect_err("nothing to withdraw");
    assert_eq!(err.code, ErrorCode::BadRequest);
    let err = withdraw_area(&mut conn, &area_id("nope"), "admin-1").expect_err("missing area");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn review_applies_only_to_pending_rows() {
    let mut conn = setup();
    let next = review_entity(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        ReviewAction::Approve,
    )
    .expect("approve pending");
    assert_eq!(next, ReviewStatus::Approved);

    let err = review_entity(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        ReviewAction::RequestEdit,
    )
    .expect_err("already approved");
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[test]
fn request_edit_then_resubmission_returns_to_pending() {
    let mut conn = setup();
    review_entity(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        ReviewAction::RequestEdit,
    )
    .expect("request edit");
    let status: String = conn
        .query_row("SELECT status FROM building WHERE id = 'b1'", [], |row| {
            row.get(0)
        })
        .expect("row");
    assert_eq!(status, "requested_for_edit");

    upsert_building(
        &conn,
        &NewBuilding {
            id: entity_id("b1"),
            ward_number: Some(3),
            geom: None,
            total_families: Some(3),
            total_businesses: Some(1),
        },
    )
    .expect("resubmission");
    let status: String = conn
        .query_row("SELECT status FROM building WHERE id = 'b1'", [], |row| {
            row.get(0)
        })
        .expect("row");
    assert_eq!(status, "pending");
}

#[test]
fn resubmission_preserves_assignment_references() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("assign");
    upsert_building(
        &conn,
        &NewBuilding {
            id: entity_id("b1"),
            ward_number: Some(3),
            geom: None,
            total_families: Some(5),
            total_businesses: None,
        },
    )
    .expect("resubmission");
    let (area, tok) = building_refs(&conn, "b1");
    assert_eq!(area.as_deref(), Some("a1"));
    assert_eq!(tok.as_deref(), Some("T-1"));
}

#[test]
fn ingest_drops_malformed_points() {
    let conn = setup();
    upsert_family(
        &conn,
        &NewFamily {
            id: entity_id("f1"),
            ward_number: Some(3),
            head_name: Some("Ram".to_string()),
            member_count: Some(4),
            facilities: vec!["water".to_string(), "electricity".to_string()],
            gps: Some(json!({"type": "Point", "coordinates": [200.0, 0.0]})),
        },
    )
    .expect("family");
    let gps: Option<String> = conn
        .query_row("SELECT gps FROM family WHERE id = 'f1'", [], |row| {
            row.get(0)
        })
        .expect("row");
    assert_eq!(gps, None);
}

#[test]
fn duplicate_ward_area_and_token_are_rejected() {
    let mut conn = setup();
    let err = create_ward(&mut conn, 3, 900).expect_err("duplicate ward");
    assert_eq!(err.code, ErrorCode::BadRequest);
    let err = create_area(
        &mut conn,
        &NewArea {
            id: area_id("a1"),
            code: "A1".to_string(),
            ward_number: 3,
            geometry: None,
            centroid: None,
            tokens: vec![],
        },
    )
    .expect_err("duplicate area");
    assert_eq!(err.code, ErrorCode::BadRequest);
    let err = create_area(
        &mut conn,
        &NewArea {
            id: area_id("a3"),
            code: "A3".to_string(),
            ward_number: 3,
            geometry: None,
            centroid: None,
            tokens: vec![token("T-1")],
        },
    )
    .expect_err("token already issued elsewhere");
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[test]
fn create_area_computes_centroid_from_geometry() {
    let conn = setup();
    let centroid: Option<String> = conn
        .query_row("SELECT centroid FROM area WHERE id = 'a1'", [], |row| {
            row.get(0)
        })
        .expect("row");
    let centroid = centroid.expect("computed centroid");
    let value: serde_json::Value = serde_json::from_str(&centroid).expect("json");
    assert!(palika_model::is_valid_point(&value));
}

#[test]
fn create_area_rejects_bad_geometry() {
    let mut conn = setup();
    let err = create_area(
        &mut conn,
        &NewArea {
            id: area_id("a4"),
            code: "A4".to_string(),
            ward_number: 3,
            geometry: Some(json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]})),
            centroid: None,
            tokens: vec![],
        },
    )
    .expect_err("short ring");
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[test]
fn ward_area_code_update() {
    let mut conn = setup();
    update_ward_area_code(&mut conn, 3, 999).expect("update");
    let code: i64 = conn
        .query_row("SELECT wardAreaCode FROM ward WHERE wardNumber = 3", [], |r| {
            r.get(0)
        })
        .expect("row");
    assert_eq!(code, 999);
    let err = update_ward_area_code(&mut conn, 42, 1).expect_err("missing ward");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn enumerator_profile_edit_is_partial() {
    let mut conn = setup();
    update_enumerator(
        &mut conn,
        &enumerator_id("e1"),
        &EnumeratorUpdate {
            phone_number: Some("9841999999".to_string()),
            is_active: Some(false),
            ..EnumeratorUpdate::default()
        },
    )
    .expect("update");
    let (name, phone, active): (String, Option<String>, i64) = conn
        .query_row(
            "SELECT name, phoneNumber, isActive FROM enumerator WHERE id = 'e1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("row");
    assert_eq!(name, "Sita");
    assert_eq!(phone.as_deref(), Some("9841999999"));
    assert_eq!(active, 0);
}

#[test]
fn delete_entity_releases_its_token() {
    let mut conn = setup();
    assign_area(
        &mut conn,
        EntityKind::Building,
        &entity_id("b1"),
        Some(&area_id("a1")),
        Some(&token("T-1")),
    )
    .expect("assign");
    delete_entity(&mut conn, EntityKind::Building, &entity_id("b1")).expect("delete");
    assert_eq!(token_status(&conn, "T-1"), "unallocated");
    let gone: Option<i64> = conn
        .query_row("SELECT 1 FROM building WHERE id = 'b1'", [], |row| {
            row.get(0)
        })
        .optional()
        .expect("query");
    assert_eq!(gone, None);
    let err =
        delete_entity(&mut conn, EntityKind::Building, &entity_id("b1")).expect_err("gone already");
    assert_eq!(err.code, ErrorCode::NotFound);
}
