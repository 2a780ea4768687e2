use std::fmt;

use thiserror::Error;

/// Machine-readable error codes surfaced alongside typed errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    OrderNotFound,
    EditorNotFound,
    NotAssigned,
    UnsupportedStatusTarget,
    InvalidEnumValue,
    RatingOutOfRange,
    TargetAboveCap,
    NoPendingEdit,
    NotAwaitingApproval,
    CorruptProjection,
    StoreWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::OrderNotFound => "E2001",
            Self::EditorNotFound => "E2002",
            Self::NotAssigned => "E2003",
            Self::UnsupportedStatusTarget => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::RatingOutOfRange => "E2006",
            Self::TargetAboveCap => "E2007",
            Self::NoPendingEdit => "E2008",
            Self::NotAwaitingApproval => "E2009",
            Self::CorruptProjection => "E3001",
            Self::StoreWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::OrderNotFound => "Order not found",
            Self::EditorNotFound => "Editor not found",
            Self::NotAssigned => "Editor is not assigned to this order",
            Self::UnsupportedStatusTarget => "Requested status cannot be set by an editor",
            Self::InvalidEnumValue => "Invalid status/priority/role value",
            Self::RatingOutOfRange => "Rating outside the 1-5 range",
            Self::TargetAboveCap => "Monthly target above the configured cap",
            Self::NoPendingEdit => "Order has no pending edit to review",
            Self::NotAwaitingApproval => "Order is not awaiting approval",
            Self::CorruptProjection => "Corrupt SQLite projection",
            Self::StoreWriteFailed => "Projection write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .darkroom/config.toml and retry."),
            Self::OrderNotFound | Self::EditorNotFound => None,
            Self::NotAssigned => Some("Only assigned editors may change their contribution."),
            Self::UnsupportedStatusTarget => {
                Some("Editors may request pending, in-progress, or completed.")
            }
            Self::InvalidEnumValue => Some("Use one of the documented enum values."),
            Self::RatingOutOfRange => Some("Ratings run from 1 to 5 stars."),
            Self::TargetAboveCap => Some("Lower the target or raise targets.monthly_cap."),
            Self::NoPendingEdit => Some("The edit may have been reviewed already."),
            Self::NotAwaitingApproval => Some("Only waiting-approval orders can be approved."),
            Self::CorruptProjection => Some("Delete the projection file and reopen the store."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Typed failures raised by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpsError {
    #[error("order '{order_id}' not found")]
    OrderNotFound { order_id: String },

    #[error("editor '{editor_id}' not found")]
    EditorNotFound { editor_id: String },

    #[error("rating {rating} is outside the 1-5 range")]
    RatingOutOfRange { rating: u8 },

    #[error("target {target} exceeds the monthly cap of {cap}")]
    TargetAboveCap { target: u32, cap: u32 },

    #[error("order '{order_id}' has no pending edit")]
    NoPendingEdit { order_id: String },

    #[error("order '{order_id}' is not awaiting approval")]
    NotAwaitingApproval { order_id: String },
}

impl OpsError {
    /// Map this error to its stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::OrderNotFound { .. } => ErrorCode::OrderNotFound,
            Self::EditorNotFound { .. } => ErrorCode::EditorNotFound,
            Self::RatingOutOfRange { .. } => ErrorCode::RatingOutOfRange,
            Self::TargetAboveCap { .. } => ErrorCode::TargetAboveCap,
            Self::NoPendingEdit { .. } => ErrorCode::NoPendingEdit,
            Self::NotAwaitingApproval { .. } => ErrorCode::NotAwaitingApproval,
        }
    }
}
