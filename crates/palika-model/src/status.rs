use crate::ids::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Building,
    Business,
    Family,
}

impl EntityKind {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "building" => Ok(Self::Building),
            "business" => Ok(Self::Business),
            "family" => Ok(Self::Family),
            _ => Err(ValidationError(format!("unknown entity kind: {raw}"))),
        }
    }

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Business => "business",
            Self::Family => "family",
        }
    }

    /// Column holding the entity's geographic point. Buildings were surveyed
    /// with `geom`, businesses and families with `gps`.
    #[must_use]
    pub const fn point_column(self) -> &'static str {
        match self {
            Self::Building => "geom",
            Self::Business | Self::Family => "gps",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// Lifecycle of an area inside the assignment loop.
///
/// `PendingValidation`, `Rejected`, and `Removed` arrive with imported rows
/// and never transition through assignment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum AreaStatus {
    Unassigned,
    Assigned,
    Pending,
    PendingValidation,
    Rejected,
    Removed,
}

impl AreaStatus {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "unassigned" => Ok(Self::Unassigned),
            "assigned" => Ok(Self::Assigned),
            "pending" => Ok(Self::Pending),
            "pending_validation" => Ok(Self::PendingValidation),
            "rejected" => Ok(Self::Rejected),
            "removed" => Ok(Self::Removed),
            _ => Err(ValidationError(format!("unknown area status: {raw}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::Pending => "pending",
            Self::PendingValidation => "pending_validation",
            Self::Rejected => "rejected",
            Self::Removed => "removed",
        }
    }

    /// Legal transitions: assignment moves `unassigned` to `assigned`,
    /// completion moves `assigned` to `pending`, withdrawal moves either
    /// active state back to `unassigned`. Nothing skips a state; `pending`
    /// never returns to `assigned` except through a withdrawal.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unassigned, Self::Assigned)
                | (Self::Assigned, Self::Pending)
                | (Self::Assigned, Self::Unassigned)
                | (Self::Pending, Self::Unassigned)
        )
    }

    #[must_use]
    pub const fn is_withdrawable(self) -> bool {
        matches!(self, Self::Assigned | Self::Pending)
    }
}

impl Display for AreaStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Unallocated,
    Allocated,
}

impl TokenStatus {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "unallocated" => Ok(Self::Unallocated),
            "allocated" => Ok(Self::Allocated),
            _ => Err(ValidationError(format!("unknown token status: {raw}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unallocated => "unallocated",
            Self::Allocated => "allocated",
        }
    }
}

impl Display for TokenStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    RequestedForEdit,
}

impl ReviewStatus {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "requested_for_edit" => Ok(Self::RequestedForEdit),
            _ => Err(ValidationError(format!("unknown review status: {raw}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RequestedForEdit => "requested_for_edit",
        }
    }

    /// Review actions apply only to a `pending` submission, uniformly for
    /// every entity kind. A fresh upload from the field returns the row to
    /// `pending` through ingestion, not through a review action.
    #[must_use]
    pub const fn can_apply(self, _action: ReviewAction) -> bool {
        matches!(self, Self::Pending)
    }
}

impl Display for ReviewStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    RequestEdit,
}

impl ReviewAction {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "request_edit" => Ok(Self::RequestEdit),
            _ => Err(ValidationError(format!("unknown review action: {raw}"))),
        }
    }

    #[must_use]
    pub const fn resulting_status(self) -> ReviewStatus {
        match self {
            Self::Approve => ReviewStatus::Approved,
            Self::Reject => ReviewStatus::Rejected,
            Self::RequestEdit => ReviewStatus::RequestedForEdit,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RequestEdit => "request_edit",
        }
    }
}
