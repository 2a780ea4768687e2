use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    WaitingApproval,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::WaitingApproval => "waiting-approval",
        }
    }

    /// True for statuses that count toward an editor's open workload.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// Priority attached to an order by whoever created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

impl Priority {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// How an order came to be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    /// One editor, picked by the team leader.
    Direct,
    /// Several editors, each of whom must finish their part.
    Broadcast,
    /// Created by the editor for themselves.
    #[serde(rename = "self")]
    SelfAssigned,
}

impl Assignment {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Broadcast => "broadcast",
            Self::SelfAssigned => "self",
        }
    }
}

/// An editor-proposed change set awaiting team-leader review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEdit {
    /// Editor who proposed the change.
    pub editor: String,
    pub editor_name: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub changes: FieldEdits,
}

/// Optional field changes applied to an order's descriptive payload.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telecaller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_image_url: Option<String>,
}

impl FieldEdits {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.customer.is_none()
            && self.telecaller.is_none()
            && self.remark.is_none()
            && self.priority.is_none()
            && self.sample_image_url.is_none()
    }

    /// Apply every present field to `order`, leaving the rest alone.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(customer) = &self.customer {
            order.customer.clone_from(customer);
        }
        if let Some(telecaller) = &self.telecaller {
            order.telecaller.clone_from(telecaller);
        }
        if let Some(remark) = &self.remark {
            order.remark.clone_from(remark);
        }
        if let Some(priority) = self.priority {
            order.priority = priority;
        }
        if let Some(url) = &self.sample_image_url {
            order.sample_image_url = Some(url.clone());
        }
    }
}

/// A team-leader edit: descriptive fields plus optional status override and
/// reassignment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TeamEdit {
    pub fields: FieldEdits,
    pub status: Option<Status>,
    pub assigned_editors: Option<BTreeSet<String>>,
}

/// A unit of editing work tracked through the order lifecycle.
///
/// `assigned_editors` and `completed_by` are semantically sets; they
/// serialize as ordered JSON arrays to match the document-store shape, and
/// deserializing an array with duplicates collapses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: String,
    #[serde(default)]
    pub telecaller: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_image_url: Option<String>,
    pub assignment: Assignment,
    pub status: Status,
    #[serde(default)]
    pub assigned_editors: BTreeSet<String>,
    #[serde(default)]
    pub completed_by: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_edit: Option<PendingEdit>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// A shared order needs every assigned editor to finish individually.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.assigned_editors.len() > 1
    }

    /// True while the order still sits in somebody's queue.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether `editor` gets completion credit for this order.
    ///
    /// For shared orders an editor counts as done once they joined
    /// `completed_by` (or the whole order completed); single-editor orders
    /// use the global status alone.
    #[must_use]
    pub fn counts_completed_for(&self, editor: &str) -> bool {
        if !self.assigned_editors.contains(editor) {
            return false;
        }
        if self.is_shared() {
            self.completed_by.contains(editor) || self.status == Status::Completed
        } else {
            self.status == Status::Completed
        }
    }

    /// The status `editor` sees on their own dashboard.
    ///
    /// On a shared order an editor who already signaled completion sees
    /// `completed` even while the rest of the team is still working.
    #[must_use]
    pub fn effective_status_for(&self, editor: &str) -> Status {
        if self.is_shared() && self.completed_by.contains(editor) {
            return Status::Completed;
        }
        self.status
    }

    /// `(done, total)` contributor counts for progress chips.
    ///
    /// Only contributors still in the assignee set are counted.
    #[must_use]
    pub fn completion_progress(&self) -> (usize, usize) {
        let done = self
            .completed_by
            .intersection(&self.assigned_editors)
            .count();
        (done, self.assigned_editors.len())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "waiting-approval" => Ok(Self::WaitingApproval),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Assignment {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "direct" => Ok(Self::Direct),
            "broadcast" => Ok(Self::Broadcast),
            "self" => Ok(Self::SelfAssigned),
            _ => Err(ParseEnumError {
                expected: "assignment",
                got: s.to_string(),
            }),
        }
    }
}
