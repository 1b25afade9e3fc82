//! The content-store contract the importer writes through.
use std::fmt;

use masjid_cms_client::{Entry, EntryId, Filter};
use serde_json::Value;
use thiserror::Error;

mod cms;
mod memory;
pub use memory::{MemoryStore, OpCounts};

/// The collection types the importer writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Course,
    Lesson,
    Quiz,
}

impl EntityKind {
    /// Plural API id of the collection
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Course => "courses",
            EntityKind::Lesson => "lessons",
            EntityKind::Quiz => "quizzes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Course => "course",
            EntityKind::Lesson => "lesson",
            EntityKind::Quiz => "quiz",
        })
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cms error: {}", .0)]
    Cms(#[from] masjid_cms_client::Error),

    #[error("{kind} {id} does not exist")]
    NotFound { kind: EntityKind, id: EntryId },

    #[error("{kind} data rejected: {reason}")]
    Rejected { kind: EntityKind, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Find, create, update and publish records of each collection type.
///
/// Calls are made one at a time; implementations need no internal locking.
pub trait ContentStore {
    fn find_many(
        &mut self,
        kind: EntityKind,
        filters: &[Filter],
        limit: usize,
    ) -> StoreResult<Vec<Entry>>;

    fn create(&mut self, kind: EntityKind, data: &Value) -> StoreResult<Entry>;

    /// Update in place. The record keeps its id.
    fn update(&mut self, kind: EntityKind, id: EntryId, data: &Value) -> StoreResult<Entry>;

    /// Make a record visible to consumers
    fn publish(&mut self, kind: EntityKind, id: EntryId) -> StoreResult<()>;
}

impl<S: ContentStore + ?Sized> ContentStore for &mut S {
    fn find_many(
        &mut self,
        kind: EntityKind,
        filters: &[Filter],
        limit: usize,
    ) -> StoreResult<Vec<Entry>> {
        (**self).find_many(kind, filters, limit)
    }

    fn create(&mut self, kind: EntityKind, data: &Value) -> StoreResult<Entry> {
        (**self).create(kind, data)
    }

    fn update(&mut self, kind: EntityKind, id: EntryId, data: &Value) -> StoreResult<Entry> {
        (**self).update(kind, id, data)
    }

    fn publish(&mut self, kind: EntityKind, id: EntryId) -> StoreResult<()> {
        (**self).publish(kind, id)
    }
}
