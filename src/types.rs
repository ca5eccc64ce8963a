//! Domain value types
//!
//! The small set of career-tracking records the descriptor factories
//! operate on, plus the [`Keyed`] trait the generic list factories use to
//! address items.

use serde::{Deserialize, Serialize};

/// Items addressable by a stable string key inside a list.
pub trait Keyed {
    /// The item's unique key.
    fn key(&self) -> &str;
}

/// Lifecycle of a weekly assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Submitted,
    Verified,
}

impl AssignmentStatus {
    /// Wire/display name of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Verified => "verified",
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weekly assignment handed to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub status: AssignmentStatus,
    /// Whether completion evidence has been submitted.
    pub evidence_submitted: bool,
}

/// Stage of a tracked job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Wishlist,
    Applied,
    Interviewing,
    Offer,
    Rejected,
}

impl PipelineStage {
    /// Wire/display name of the stage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wishlist => "wishlist",
            Self::Applied => "applied",
            Self::Interviewing => "interviewing",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    pub company: String,
    pub role: String,
    pub stage: PipelineStage,
}

impl Keyed for Assignment {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for JobApplication {
    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_as_snake_case() {
        let json = serde_json::to_string(&AssignmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let stage: PipelineStage = serde_json::from_str("\"interviewing\"").unwrap();
        assert_eq!(stage, PipelineStage::Interviewing);
    }

    #[test]
    fn application_round_trips() {
        let app = JobApplication {
            id: "job-1".into(),
            company: "Acme".into(),
            role: "Backend Engineer".into(),
            stage: PipelineStage::Wishlist,
        };
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["stage"], "wishlist");
        let back: JobApplication = serde_json::from_value(json).unwrap();
        assert_eq!(back, app);
        assert_eq!(back.key(), "job-1");
    }
}
