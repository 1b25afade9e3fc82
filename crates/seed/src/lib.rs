//! Loads course seed files and imports them into the CMS.
//!
//! Seed files come in two historical schemas. [`normalize`] maps both onto one
//! canonical shape, and [`import`] upserts and publishes the result through any
//! [`ContentStore`], course → lesson → quiz.

pub mod import;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod store;

pub use import::{import_all, ImportError, ImportReport, Importer, Tally, Upserted};
pub use loader::{LoadError, SeedDocument, SeedLoader};
pub use normalize::{normalize_course, normalize_lesson, normalize_quiz, slugify, NormalizeError};
pub use store::{ContentStore, EntityKind, MemoryStore, OpCounts, StoreError, StoreResult};
