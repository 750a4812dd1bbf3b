use palika_model::{
    parse_area_id, parse_entity_id, parse_enumerator_id, parse_token_code, parse_ward_number,
    AreaId, TokenCode, ID_MAX_LEN, TOKEN_MAX_LEN,
};

#[test]
fn area_id_accepts_opaque_identifiers() {
    let id = parse_area_id("area-07_B").expect("area id");
    assert_eq!(id.as_str(), "area-07_B");
}

#[test]
fn area_id_trims_surrounding_whitespace() {
    let id = AreaId::parse("  a1  ").expect("area id");
    assert_eq!(id.as_str(), "a1");
}

#[test]
fn area_id_rejects_empty_and_overlong() {
    assert!(parse_area_id("").is_err());
    assert!(parse_area_id("   ").is_err());
    assert!(parse_area_id(&"x".repeat(ID_MAX_LEN + 1)).is_err());
}

#[test]
fn entity_id_rejects_non_identifier_characters() {
    assert!(parse_entity_id("bld 1").is_err());
    assert!(parse_entity_id("bld/1").is_err());
    assert!(parse_entity_id("bld;DROP").is_err());
}

#[test]
fn enumerator_id_round_trips() {
    let id = parse_enumerator_id("e1").expect("enumerator id");
    assert_eq!(id.to_string(), "e1");
}

#[test]
fn token_code_rejects_underscore_and_overlong() {
    assert!(parse_token_code("tok_1").is_err());
    assert!(parse_token_code(&"9".repeat(TOKEN_MAX_LEN + 1)).is_err());
    assert_eq!(
        TokenCode::parse("T-0042").expect("token").as_str(),
        "T-0042"
    );
}

#[test]
fn ward_number_must_be_positive() {
    assert!(parse_ward_number(0).is_err());
    assert!(parse_ward_number(-3).is_err());
    assert_eq!(parse_ward_number(12).expect("ward"), 12);
}
