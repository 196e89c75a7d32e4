//! Request lifecycle: `pending` → `approved` | `rejected`, exactly once.
//!
//! A decide on a request that has already left `pending` is refused with a
//! conflict; the earlier decision and its reviewer metadata are never
//! overwritten.

use chrono::Utc;

use crate::errors::AppError;
use crate::models::{Decision, NewPassRequest, PassRequest, RequestStatus, NO_REMARKS};
use crate::store::RequestStore;

/// Validate and store a new pending request.
pub async fn submit(store: &RequestStore, input: NewPassRequest) -> Result<PassRequest, AppError> {
    let requester_name = required("requesterName", input.requester_name)?;
    let reason = required("reason", input.reason)?;
    let destination = required("destination", input.destination)?;
    let planned_return_time = required("plannedReturnTime", input.planned_return_time)?;

    let request = PassRequest {
        id: store.ids().generate()?,
        requester_name,
        reason,
        destination,
        planned_return_time,
        status: RequestStatus::Pending,
        submitted_at: Utc::now(),
        decided_at: None,
        reviewer_name: None,
        reviewer_remarks: None,
    };

    let request = store.insert(request).await?;
    tracing::info!(
        pass_id = %request.id,
        requester = %request.requester_name,
        "pass request submitted"
    );
    Ok(request)
}

/// Move a pending request into its terminal state.
pub async fn decide(
    store: &RequestStore,
    id: &str,
    decision: Decision,
) -> Result<PassRequest, AppError> {
    let reviewer = required("reviewerName", Some(decision.reviewer_name))?;
    let remarks = decision
        .remarks
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| NO_REMARKS.to_string());
    let outcome = decision.outcome;

    let decided = store
        .update(id, |record| {
            if !record.is_pending() {
                return Err(AppError::Conflict(format!(
                    "request {} was already {}",
                    record.id, record.status
                )));
            }
            record.status = outcome.as_status();
            record.decided_at = Some(Utc::now());
            record.reviewer_name = Some(reviewer);
            record.reviewer_remarks = Some(remarks);
            Ok(())
        })
        .await;

    match &decided {
        Ok(record) => tracing::info!(
            pass_id = %record.id,
            outcome = outcome.as_str(),
            reviewer = record.reviewer_name.as_deref().unwrap_or_default(),
            "pass request decided"
        ),
        Err(e) => tracing::warn!(pass_id = %id, outcome = outcome.as_str(), "decide refused: {}", e),
    }
    decided
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    fn new_request(name: &str) -> NewPassRequest {
        NewPassRequest {
            requester_name: Some(name.into()),
            reason: Some("clinic".into()),
            destination: Some("city hospital".into()),
            planned_return_time: Some("2024-05-01T18:00".into()),
        }
    }

    fn decision(outcome: Outcome, remarks: Option<&str>) -> Decision {
        Decision {
            outcome,
            reviewer_name: "mod1".into(),
            remarks: remarks.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_submit_creates_pending() {
        let store = RequestStore::in_memory();
        let req = submit(&store, new_request("alice")).await.unwrap();
        assert_eq!(req.status, RequestStatus::Pending);
        assert!(req.id.starts_with("GP"));
        assert!(req.decided_at.is_none());
        assert!(req.reviewer_name.is_none());
        assert!(req.reviewer_remarks.is_none());
        assert_eq!(store.find_by_id(&req.id).await.unwrap(), req);
    }

    #[tokio::test]
    async fn test_submit_trims_fields() {
        let store = RequestStore::in_memory();
        let mut input = new_request("  alice ");
        input.destination = Some(" market\n".into());
        let req = submit(&store, input).await.unwrap();
        assert_eq!(req.requester_name, "alice");
        assert_eq!(req.destination, "market");
    }

    #[tokio::test]
    async fn test_submit_with_exhausted_ids_fails_cleanly() {
        let store = RequestStore::in_memory();
        store.ids().observe("GP9223372036854775807");

        let err = submit(&store, new_request("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(store.find_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_fields() {
        let store = RequestStore::in_memory();
        let mut no_reason = new_request("alice");
        no_reason.reason = None;
        let mut blank_name = new_request("   ");
        blank_name.reason = Some("x".into());
        let mut no_return = new_request("alice");
        no_return.planned_return_time = Some(String::new());

        for input in [no_reason, blank_name, no_return] {
            let err = submit(&store, input).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
        }
        assert!(store.find_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_approve_sets_metadata_together() {
        let store = RequestStore::in_memory();
        let req = submit(&store, new_request("alice")).await.unwrap();
        let decided = decide(&store, &req.id, decision(Outcome::Approved, Some("ok")))
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.reviewer_name.as_deref(), Some("mod1"));
        assert_eq!(decided.reviewer_remarks.as_deref(), Some("ok"));
        assert!(decided.decided_at.is_some());
        assert_eq!(decided.submitted_at, req.submitted_at);
    }

    #[tokio::test]
    async fn test_blank_remarks_default_to_sentinel() {
        let store = RequestStore::in_memory();
        for remarks in [None, Some(""), Some("   ")] {
            let req = submit(&store, new_request("alice")).await.unwrap();
            let decided = decide(&store, &req.id, decision(Outcome::Rejected, remarks))
                .await
                .unwrap();
            assert_eq!(decided.reviewer_remarks.as_deref(), Some(NO_REMARKS));
        }
    }

    #[tokio::test]
    async fn test_second_decide_conflicts() {
        let store = RequestStore::in_memory();
        let req = submit(&store, new_request("alice")).await.unwrap();
        let first = decide(&store, &req.id, decision(Outcome::Approved, Some("ok")))
            .await
            .unwrap();

        let err = decide(&store, &req.id, decision(Outcome::Rejected, Some("changed my mind")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.find_by_id(&req.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_decide_unknown_id() {
        let store = RequestStore::in_memory();
        let err = decide(&store, "unknown-id", decision(Outcome::Approved, Some("x")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_decide_requires_reviewer() {
        let store = RequestStore::in_memory();
        let req = submit(&store, new_request("alice")).await.unwrap();
        let mut d = decision(Outcome::Approved, None);
        d.reviewer_name = " ".into();
        let err = decide(&store, &req.id, d).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.find_by_id(&req.id).await.unwrap().is_pending());
    }
}
