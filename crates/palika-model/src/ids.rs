use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const ID_MAX_LEN: usize = 64;
pub const TOKEN_MAX_LEN: usize = 32;

pub fn parse_area_id(input: &str) -> Result<AreaId, ValidationError> {
    AreaId::parse(input)
}

pub fn parse_entity_id(input: &str) -> Result<EntityId, ValidationError> {
    EntityId::parse(input)
}

pub fn parse_enumerator_id(input: &str) -> Result<EnumeratorId, ValidationError> {
    EnumeratorId::parse(input)
}

pub fn parse_token_code(input: &str) -> Result<TokenCode, ValidationError> {
    TokenCode::parse(input)
}

pub fn parse_ward_number(input: i64) -> Result<i64, ValidationError> {
    if input <= 0 {
        return Err(ValidationError(
            "ward number must be a positive integer".to_string(),
        ));
    }
    Ok(input)
}

fn parse_opaque_id(input: &str, label: &str) -> Result<String, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError(format!("{label} must not be empty")));
    }
    if s.len() > ID_MAX_LEN {
        return Err(ValidationError(format!(
            "{label} exceeds max length {ID_MAX_LEN}"
        )));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError(format!(
            "{label} must contain only [A-Za-z0-9_-]"
        )));
    }
    Ok(s.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct AreaId(String);

impl AreaId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_opaque_id(input, "area id").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for AreaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_opaque_id(input, "entity id").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct EnumeratorId(String);

impl EnumeratorId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_opaque_id(input, "enumerator id").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EnumeratorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct TokenCode(String);

impl TokenCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("token must not be empty".to_string()));
        }
        if s.len() > TOKEN_MAX_LEN {
            return Err(ValidationError(format!(
                "token exceeds max length {TOKEN_MAX_LEN}"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError(
                "token must contain only [A-Za-z0-9-]".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for TokenCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
