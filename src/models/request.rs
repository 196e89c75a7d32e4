use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Remarks recorded when a moderator decides without leaving any.
pub const NO_REMARKS: &str = "No remarks";

// ── Pass Request ─────────────────────────────────────────────

/// An exit request. Once approved, its `id` is the pass token shown at the gate.
///
/// `decided_at`, `reviewer_name` and `reviewer_remarks` are set together by the
/// single transition out of `Pending` and are `None` before it.
///
/// Older documents may lack the descriptive fields; they load as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassRequest {
    pub id: String,
    #[serde(default, alias = "studentName")]
    pub requester_name: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, alias = "returnTime")]
    pub planned_return_time: String,
    #[serde(deserialize_with = "stored_status")]
    pub status: RequestStatus,
    #[serde(alias = "timestamp")]
    pub submitted_at: DateTime<Utc>,
    #[serde(default, alias = "processedAt")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "moderatorName")]
    pub reviewer_name: Option<String>,
    #[serde(default, alias = "moderatorRemarks")]
    pub reviewer_remarks: Option<String>,
}

impl PassRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Status as read back from a document. Older writers stored the decide
/// action verbatim, so anything other than the three canonical values is a
/// terminal state that never verified; it loads as `Rejected`.
fn stored_status<'de, D>(deserializer: D) -> Result<RequestStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(match raw.as_str() {
        "pending" => RequestStatus::Pending,
        "approved" => RequestStatus::Approved,
        "rejected" => RequestStatus::Rejected,
        other => {
            tracing::warn!(status = other, "non-canonical stored status, loading as rejected");
            RequestStatus::Rejected
        }
    })
}

// ── Decisions ────────────────────────────────────────────────

/// The terminal state a moderator moves a request into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Approved,
    Rejected,
}

impl Outcome {
    pub fn as_status(self) -> RequestStatus {
        match self {
            Outcome::Approved => RequestStatus::Approved,
            Outcome::Rejected => RequestStatus::Rejected,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.as_status().as_str()
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    /// Only the two terminal states parse; `pending` is not an outcome.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" => Ok(Outcome::Approved),
            "rejected" => Ok(Outcome::Rejected),
            other => Err(format!(
                "invalid outcome '{}': expected 'approved' or 'rejected'",
                other
            )),
        }
    }
}

/// Input to a submit. Fields are validated by the lifecycle engine, so they
/// deserialize as optional and a missing one is reported as a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassRequest {
    #[serde(default, alias = "studentName")]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, alias = "returnTime")]
    pub planned_return_time: Option<String>,
}

/// Input to a decide.
#[derive(Debug, Clone)]
pub struct Decision {
    pub outcome: Outcome,
    pub reviewer_name: String,
    pub remarks: Option<String>,
}
