//! In-memory store backend.
//!
//! This module provides a fast, **ephemeral** store where all records are
//! held in RAM and **lost when the process exits** unless written out with
//! [`save_to_jsonl`]. It serves as the test double for the external
//! persistence collaborator and as the engine behind the JSONL backend.
//!
//! # Architecture
//!
//! - `HashMap<InitiativeId, Initiative>` plus an insertion-order list, so
//!   project listings are deterministic
//! - `Vec<DependencyEdge>` in insertion order (adjacency order downstream
//!   depends on it)
//! - Hash-based edge ids (`dep-xxxx`)
//!
//! The store keeps edges exactly as given: self-edges and edges pointing at
//! unknown initiatives are stored, and it is the graph builder's job to
//! decide what to skip.
//!
//! # Thread Safety
//!
//! State lives in `Arc<Mutex<InMemoryStoreInner>>`; every operation takes
//! the lock for its whole duration, so each call is atomic on its own. No
//! guarantee spans several calls.

mod inner;
mod jsonl;
mod trait_impl;

use crate::error::Result;
use crate::store::Snapshot;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{load_from_jsonl, read_jsonl_snapshot, save_to_jsonl, LoadWarning, Record};

/// Thread-safe in-memory store. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    ///
    /// ```
    /// use trellis::store::in_memory::InMemoryStore;
    ///
    /// let store = InMemoryStore::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every record with the snapshot's content.
    pub(crate) async fn replace_all(&self, snapshot: Snapshot) -> Result<()> {
        let mut fresh = InMemoryStoreInner::default();
        fresh.import(snapshot);
        *self.inner.lock().await = fresh;
        Ok(())
    }
}
