use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

use super::order::ParseEnumError;

/// Access level of a team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Editor,
    TeamLeader,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::TeamLeader => "team-leader",
        }
    }
}

/// Whether an editor still works here.
///
/// Terminated editors keep their history but drop out of rosters and
/// analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Employment {
    Active,
    Terminated,
}

impl Employment {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Terminated => "terminated",
        }
    }
}

/// A team member record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default = "default_employment")]
    pub employment: Employment,
    /// Self-created orders skip the waiting-approval stage once set.
    #[serde(default)]
    pub self_order_approved: bool,
    /// Running average of order ratings attributed to this editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Monthly completion targets keyed by `YYYY-MM`.
    #[serde(default)]
    pub targets: BTreeMap<String, u32>,
}

impl Editor {
    /// The completion target for the month containing `at`, if one is set.
    ///
    /// A stored target of zero means "no target", matching how the
    /// dashboard hides the progress bar in that case.
    #[must_use]
    pub fn target_for(&self, at: DateTime<Utc>) -> Option<u32> {
        self.targets
            .get(&month_key(at))
            .copied()
            .filter(|target| *target > 0)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.employment, Employment::Active)
    }
}

/// Calendar-month bucket key, zero-padded: `2026-08`.
#[must_use]
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

const fn default_employment() -> Employment {
    Employment::Active
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Employment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editor" => Ok(Self::Editor),
            "team-leader" => Ok(Self::TeamLeader),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Employment {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "terminated" => Ok(Self::Terminated),
            _ => Err(ParseEnumError {
                expected: "employment",
                got: s.to_string(),
            }),
        }
    }
}
