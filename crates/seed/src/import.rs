//! Upserts and publishes seed records, course by course.
//!
//! Each entity goes lookup → update or create → publish. A failure is
//! recorded against that entity and the run moves on to its next sibling;
//! a failed course or lesson skips its own subtree. Nothing is rolled back.
use std::fmt;

use log::{error, info};
use masjid_cms_client::{EntryId, Filter};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    loader::SeedDocument,
    model::{Lesson, RawCourse, RawLesson, RawQuiz},
    normalize::{normalize_course, normalize_lesson, normalize_quiz, NormalizeError},
    store::{ContentStore, EntityKind, StoreError},
};

/// Failure of a single entity. `entity` names it for the report.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{entity}: malformed record: {source}")]
    Malformed {
        entity: String,
        source: serde_json::Error,
    },

    #[error("{entity}: {source}")]
    Invalid {
        entity: String,
        source: NormalizeError,
    },

    #[error("{entity}: {source}")]
    Store { entity: String, source: StoreError },
}

/// Whether an upsert found an existing record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upserted {
    Created(EntryId),
    Updated(EntryId),
}

impl Upserted {
    pub fn id(self) -> EntryId {
        match self {
            Upserted::Created(id) | Upserted::Updated(id) => id,
        }
    }
}

/// Counts for one entity type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Records the importer reached
    pub total: usize,
    pub created: usize,
    pub updated: usize,
}

impl Tally {
    pub fn imported(&self) -> usize {
        self.created + self.updated
    }

    fn record(&mut self, outcome: Upserted) {
        match outcome {
            Upserted::Created(_) => self.created += 1,
            Upserted::Updated(_) => self.updated += 1,
        }
    }
}

/// Outcome of an import run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub courses: Tally,
    pub lessons: Tally,
    pub quizzes: Tally,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn tally(&self, kind: EntityKind) -> &Tally {
        match kind {
            EntityKind::Course => &self.courses,
            EntityKind::Lesson => &self.lessons,
            EntityKind::Quiz => &self.quizzes,
        }
    }

    fn tally_mut(&mut self, kind: EntityKind) -> &mut Tally {
        match kind {
            EntityKind::Course => &mut self.courses,
            EntityKind::Lesson => &mut self.lessons,
            EntityKind::Quiz => &mut self.quizzes,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, t) in [
            ("courses", &self.courses),
            ("lessons", &self.lessons),
            ("quizzes", &self.quizzes),
        ] {
            writeln!(
                f,
                "{}: {}/{} imported ({} created, {} updated)",
                label,
                t.imported(),
                t.total,
                t.created,
                t.updated
            )?;
        }

        if self.errors.is_empty() {
            write!(f, "no errors")
        } else {
            write!(f, "{} errors:", self.errors.len())?;
            for e in &self.errors {
                write!(f, "\n  - {}", e)?;
            }
            Ok(())
        }
    }
}

/// Imports seed documents into a content store
pub struct Importer<S> {
    store: S,
    report: ImportReport,
}

impl<S: ContentStore> Importer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            report: ImportReport::default(),
        }
    }

    /// Import every document in order, returning the report and the store
    pub fn run(mut self, docs: &[SeedDocument]) -> (ImportReport, S) {
        for doc in docs {
            self.import_document(doc);
        }

        (self.report, self.store)
    }

    pub fn import_document(&mut self, doc: &SeedDocument) {
        info!("importing {} ({} courses)", doc.source, doc.courses.len());
        for (idx, raw) in doc.courses.iter().enumerate() {
            self.report.courses.total += 1;
            if let Err(e) = self.import_course(doc, idx, raw) {
                self.fail(e);
            }
        }
    }

    fn fail(&mut self, e: ImportError) {
        error!("failed to import {}", e);
        self.report.errors.push(e.to_string());
    }

    fn import_course(
        &mut self,
        doc: &SeedDocument,
        idx: usize,
        raw: &Value,
    ) -> Result<(), ImportError> {
        let entity = course_label(doc, idx, raw);
        let mut raw: RawCourse = parse(&entity, raw)?;
        let embedded = std::mem::take(&mut raw.lessons);
        let course = normalize_course(raw).map_err(|source| ImportError::Invalid {
            entity: entity.clone(),
            source,
        })?;

        let course_id = self.upsert_and_publish(
            EntityKind::Course,
            &entity,
            &[Filter::eq("slug", &course.slug)],
            &course,
            None,
        )?;

        let lessons = if embedded.is_empty() {
            doc.lessons.get(&course.slug).cloned().unwrap_or_default()
        } else {
            embedded
        };
        for (position, raw) in lessons.iter().enumerate() {
            self.report.lessons.total += 1;
            if let Err(e) = self.import_lesson(doc, &course.slug, course_id, position, raw) {
                self.fail(e);
            }
        }

        Ok(())
    }

    fn import_lesson(
        &mut self,
        doc: &SeedDocument,
        course_slug: &str,
        course_id: EntryId,
        position: usize,
        raw: &Value,
    ) -> Result<(), ImportError> {
        let entity = format!(
            "lesson {} of course {:?}",
            record_name(raw, position),
            course_slug
        );
        let mut raw: RawLesson = parse(&entity, raw)?;
        let embedded_quiz = raw.quiz.take();
        let lesson = normalize_lesson(raw, position).map_err(|source| ImportError::Invalid {
            entity: entity.clone(),
            source,
        })?;

        let lesson_id = self.upsert_and_publish(
            EntityKind::Lesson,
            &entity,
            &[
                Filter::eq("slug", &lesson.slug),
                Filter::relation("course", course_id),
            ],
            &lesson,
            Some(("course", course_id)),
        )?;

        let quiz = embedded_quiz
            .filter(|q| !q.is_null())
            .or_else(|| doc.quizzes.get(&lesson.slug).cloned());
        if let Some(raw) = quiz {
            self.report.quizzes.total += 1;
            if let Err(e) = self.import_quiz(&lesson, lesson_id, &raw) {
                self.fail(e);
            }
        }

        Ok(())
    }

    fn import_quiz(
        &mut self,
        lesson: &Lesson,
        lesson_id: EntryId,
        raw: &Value,
    ) -> Result<(), ImportError> {
        let entity = format!("quiz for lesson {:?}", lesson.slug);
        let raw: RawQuiz = parse(&entity, raw)?;
        let quiz = normalize_quiz(raw, &lesson.title).map_err(|source| ImportError::Invalid {
            entity: entity.clone(),
            source,
        })?;

        self.upsert_and_publish(
            EntityKind::Quiz,
            &entity,
            &[Filter::relation("lesson", lesson_id)],
            &quiz,
            Some(("lesson", lesson_id)),
        )?;

        Ok(())
    }

    /// Look up by `filters`, update the first match or create, then publish
    fn upsert_and_publish<T: Serialize>(
        &mut self,
        kind: EntityKind,
        entity: &str,
        filters: &[Filter],
        record: &T,
        parent: Option<(&str, EntryId)>,
    ) -> Result<EntryId, ImportError> {
        let store_err = |source: StoreError| ImportError::Store {
            entity: entity.to_string(),
            source,
        };

        let mut data = serde_json::to_value(record).map_err(|source| ImportError::Malformed {
            entity: entity.to_string(),
            source,
        })?;
        if let (Some((relation, id)), Some(obj)) = (parent, data.as_object_mut()) {
            obj.insert(relation.to_string(), Value::from(id));
        }

        let existing = self
            .store
            .find_many(kind, filters, 1)
            .map_err(store_err)?
            .into_iter()
            .next();
        let outcome = match existing {
            Some(entry) => {
                self.store
                    .update(kind, entry.id, &data)
                    .map_err(store_err)?;
                Upserted::Updated(entry.id)
            }
            None => Upserted::Created(self.store.create(kind, &data).map_err(store_err)?.id),
        };
        self.store.publish(kind, outcome.id()).map_err(store_err)?;

        let tally = self.report.tally_mut(kind);
        tally.record(outcome);
        info!(
            "{} {} ({}/{} {} records imported)",
            match outcome {
                Upserted::Created(_) => "created",
                Upserted::Updated(_) => "updated",
            },
            entity,
            tally.imported(),
            tally.total,
            kind
        );

        Ok(outcome.id())
    }
}

/// Import `docs` into `store`
pub fn import_all<S: ContentStore>(store: &mut S, docs: &[SeedDocument]) -> ImportReport {
    Importer::new(store).run(docs).0
}

fn parse<T: DeserializeOwned>(entity: &str, raw: &Value) -> Result<T, ImportError> {
    T::deserialize(raw).map_err(|source| ImportError::Malformed {
        entity: entity.to_string(),
        source,
    })
}

/// The record's title if it has one, else its 1-based position
fn record_name(raw: &Value, idx: usize) -> String {
    match raw.get("title").and_then(Value::as_str) {
        Some(t) if !t.trim().is_empty() => format!("{:?}", t.trim()),
        _ => format!("#{}", idx + 1),
    }
}

fn course_label(doc: &SeedDocument, idx: usize, raw: &Value) -> String {
    format!("course {} in {}", record_name(raw, idx), doc.name())
}
