//! Read-only projections for the three roles.
//!
//! "Newest first" means reverse insertion order in the store, not a timestamp
//! sort, so a clock adjustment between two submissions cannot reorder them.

use crate::models::{PassRequest, RequestStatus};
use crate::store::RequestStore;

/// Every request submitted by `requester_name`, newest first.
pub async fn by_requester(store: &RequestStore, requester_name: &str) -> Vec<PassRequest> {
    newest_first(store, |r| r.requester_name == requester_name).await
}

/// Every request currently in `status`, newest first.
pub async fn by_status(store: &RequestStore, status: RequestStatus) -> Vec<PassRequest> {
    newest_first(store, |r| r.status == status).await
}

async fn newest_first<P>(store: &RequestStore, keep: P) -> Vec<PassRequest>
where
    P: Fn(&PassRequest) -> bool,
{
    store
        .find_all()
        .await
        .into_iter()
        .rev()
        .filter(|r| keep(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn request(id: &str, name: &str, status: RequestStatus, minutes_ago: i64) -> PassRequest {
        PassRequest {
            id: id.to_string(),
            requester_name: name.to_string(),
            reason: "r".into(),
            destination: "d".into(),
            planned_return_time: "t".into(),
            status,
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
            decided_at: None,
            reviewer_name: None,
            reviewer_remarks: None,
        }
    }

    async fn seeded() -> RequestStore {
        let store = RequestStore::in_memory();
        // Third insert carries the oldest timestamp: order must still follow insertion.
        for r in [
            request("GP1", "alice", RequestStatus::Pending, 10),
            request("GP2", "bob", RequestStatus::Approved, 5),
            request("GP3", "alice", RequestStatus::Pending, 60),
            request("GP4", "alice", RequestStatus::Approved, 1),
        ] {
            store.insert(r).await.unwrap();
        }
        store
    }

    fn ids(reqs: Vec<PassRequest>) -> Vec<String> {
        reqs.into_iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_by_requester() {
        let store = seeded().await;
        assert_eq!(ids(by_requester(&store, "alice").await), vec!["GP4", "GP3", "GP1"]);
        assert_eq!(ids(by_requester(&store, "bob").await), vec!["GP2"]);
        assert!(by_requester(&store, "Alice").await.is_empty());
    }

    #[tokio::test]
    async fn test_by_status_uses_insertion_order() {
        let store = seeded().await;
        assert_eq!(ids(by_status(&store, RequestStatus::Pending).await), vec!["GP3", "GP1"]);
        assert_eq!(ids(by_status(&store, RequestStatus::Approved).await), vec!["GP4", "GP2"]);
        assert!(by_status(&store, RequestStatus::Rejected).await.is_empty());
    }
}
