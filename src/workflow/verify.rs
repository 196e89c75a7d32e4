use serde::Serialize;

use crate::models::{PassRequest, RequestStatus};
use crate::store::RequestStore;

/// Result of checking a scanned pass id at the gate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Verification {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<PassRequest>,
}

impl Verification {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            request: None,
        }
    }
}

/// A pass is valid iff it exists and is approved. Unknown, pending and
/// rejected ids all come back as `valid: false`; this never errors, since the
/// input is whatever the scanner read. Planned return time is not consulted.
pub async fn verify(store: &RequestStore, id: &str) -> Verification {
    match store.find_by_id(id.trim()).await {
        Some(req) if req.status == RequestStatus::Approved => Verification {
            valid: true,
            request: Some(req),
        },
        Some(req) => {
            tracing::debug!(pass_id = %req.id, status = %req.status, "verify: not approved");
            Verification::invalid()
        }
        None => {
            tracing::debug!(pass_id = %id, "verify: unknown pass id");
            Verification::invalid()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, NewPassRequest, Outcome};
    use crate::workflow::lifecycle::{decide, submit};

    async fn submitted(store: &RequestStore) -> PassRequest {
        submit(
            store,
            NewPassRequest {
                requester_name: Some("alice".into()),
                reason: Some("clinic".into()),
                destination: Some("city hospital".into()),
                planned_return_time: Some("2000-01-01T00:00".into()),
            },
        )
        .await
        .unwrap()
    }

    fn by_mod1(outcome: Outcome) -> Decision {
        Decision {
            outcome,
            reviewer_name: "mod1".into(),
            remarks: None,
        }
    }

    #[tokio::test]
    async fn test_approved_is_valid_even_past_return_time() {
        let store = RequestStore::in_memory();
        let req = submitted(&store).await;
        decide(&store, &req.id, by_mod1(Outcome::Approved)).await.unwrap();

        let v = verify(&store, &req.id).await;
        assert!(v.valid);
        assert_eq!(v.request.unwrap().id, req.id);
    }

    #[tokio::test]
    async fn test_pending_rejected_unknown_are_invalid() {
        let store = RequestStore::in_memory();
        let pending = submitted(&store).await;
        let rejected = submitted(&store).await;
        decide(&store, &rejected.id, by_mod1(Outcome::Rejected)).await.unwrap();

        for id in [pending.id.as_str(), rejected.id.as_str(), "GP0", "", "garbage"] {
            assert_eq!(verify(&store, id).await, Verification::invalid(), "id {:?}", id);
        }
    }

    #[tokio::test]
    async fn test_scanned_whitespace_is_ignored() {
        let store = RequestStore::in_memory();
        let req = submitted(&store).await;
        decide(&store, &req.id, by_mod1(Outcome::Approved)).await.unwrap();
        assert!(verify(&store, &format!(" {}\n", req.id)).await.valid);
    }

    #[test]
    fn test_invalid_serializes_without_request() {
        let json = serde_json::to_value(Verification::invalid()).unwrap();
        assert_eq!(json, serde_json::json!({ "valid": false }));
    }
}
