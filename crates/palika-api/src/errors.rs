// SPDX-License-Identifier: Apache-2.0

use palika_query::{QueryError, QueryErrorCode};
use palika_registry::{ErrorCode, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ApiErrorCode {
    NotFound,
    BadRequest,
    Unauthorized,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal => "INTERNAL",
        }
    }

    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Unauthorized => 403,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::BadRequest,
            format!("invalid query parameter: {name}"),
            json!({"parameter": name, "value": value}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_body(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::BadRequest,
            reason,
            Value::Null,
            "req-unknown",
        )
    }

    #[must_use]
    pub fn unauthorized(message: &str) -> Self {
        Self::new(
            ApiErrorCode::Unauthorized,
            message,
            Value::Null,
            "req-unknown",
        )
    }

    /// Internal causes are logged where they happen; the wire carries only a
    /// generic message.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            ApiErrorCode::Internal,
            "internal error",
            Value::Null,
            "req-unknown",
        )
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e.code {
            ErrorCode::NotFound => {
                Self::new(ApiErrorCode::NotFound, e.message, Value::Null, "req-unknown")
            }
            ErrorCode::BadRequest => {
                Self::new(ApiErrorCode::BadRequest, e.message, Value::Null, "req-unknown")
            }
            ErrorCode::Unauthorized => {
                Self::new(ApiErrorCode::Unauthorized, e.message, Value::Null, "req-unknown")
            }
            _ => Self::internal(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e.code {
            QueryErrorCode::NotFound => {
                Self::new(ApiErrorCode::NotFound, e.message, Value::Null, "req-unknown")
            }
            QueryErrorCode::BadRequest => {
                Self::new(ApiErrorCode::BadRequest, e.message, Value::Null, "req-unknown")
            }
            _ => Self::internal(),
        }
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiError>();
};
