//! The request store: single source of truth for pass requests and accounts.
//!
//! All mutations are serialized through one write lock that is held across
//! "clone state → apply change → persist → publish". Readers share the read
//! lock and only ever see a fully persisted document, never a change that is
//! half applied or that failed to reach the backend.

pub mod backend;

use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{PassRequest, UserAccount};
use crate::workflow::ids::PassIdGenerator;

pub use backend::{Document, DocumentBackend, JsonFileBackend, MemoryBackend};

pub struct RequestStore {
    state: RwLock<Document>,
    backend: Box<dyn DocumentBackend>,
    ids: PassIdGenerator,
}

impl RequestStore {
    /// Load the current document from `backend` and seed the id generator
    /// with every id already in it.
    pub async fn open<B>(backend: B) -> anyhow::Result<Self>
    where
        B: DocumentBackend + 'static,
    {
        let doc = backend.load().await?;
        let ids = PassIdGenerator::new();
        for req in &doc.requests {
            ids.observe(&req.id);
        }

        tracing::info!(
            requests = doc.requests.len(),
            users = doc.users.len(),
            "request store opened"
        );

        Ok(Self {
            state: RwLock::new(doc),
            backend: Box::new(backend),
            ids,
        })
    }

    pub async fn open_file(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::open(JsonFileBackend::new(path)).await
    }

    /// An empty store that persists nothing.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(Document::default()),
            backend: Box::new(MemoryBackend),
            ids: PassIdGenerator::new(),
        }
    }

    pub fn ids(&self) -> &PassIdGenerator {
        &self.ids
    }

    // -- Request Operations --

    pub async fn insert(&self, request: PassRequest) -> Result<PassRequest, AppError> {
        self.mutate(|doc| {
            if doc.requests.iter().any(|r| r.id == request.id) {
                return Err(AppError::Conflict(format!(
                    "request {} already exists",
                    request.id
                )));
            }
            doc.requests.push(request.clone());
            Ok(request)
        })
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> Option<PassRequest> {
        self.state
            .read()
            .await
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Snapshot of every request, in insertion order.
    pub async fn find_all(&self) -> Vec<PassRequest> {
        self.state.read().await.requests.clone()
    }

    /// Atomically apply `mutator` to the request with `id` and persist.
    ///
    /// The mutator works on a copy; if it returns an error, or the save
    /// fails, nothing is published and the stored record is unchanged.
    pub async fn update<F>(&self, id: &str, mutator: F) -> Result<PassRequest, AppError>
    where
        F: FnOnce(&mut PassRequest) -> Result<(), AppError>,
    {
        self.mutate(|doc| {
            let record = doc
                .requests
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::NotFound(format!("request {}", id)))?;
            mutator(record)?;
            Ok(record.clone())
        })
        .await
    }

    // -- User Operations --

    pub async fn find_user(&self, username: &str) -> Option<UserAccount> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn users(&self) -> Vec<UserAccount> {
        self.state.read().await.users.clone()
    }

    pub async fn insert_user(&self, user: UserAccount) -> Result<UserAccount, AppError> {
        self.mutate(|doc| {
            if doc.users.iter().any(|u| u.username == user.username) {
                return Err(AppError::Conflict(format!(
                    "user {} already exists",
                    user.username
                )));
            }
            doc.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    /// Single-writer critical section shared by every mutation.
    async fn mutate<T, F>(&self, change: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Document) -> Result<T, AppError>,
    {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.backend.save(&next).await.map_err(AppError::Internal)?;
        *guard = next;
        Ok(out)
    }
}
