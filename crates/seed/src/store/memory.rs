use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use masjid_cms_client::{Entry, EntryId, Filter};
use serde_json::Value;

use super::{ContentStore, EntityKind, StoreError, StoreResult};

/// Number of calls made against a [`MemoryStore`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub finds: usize,
    pub creates: usize,
    pub updates: usize,
    pub publishes: usize,
}

/// An in-process content store, used for dry runs.
///
/// Behaves like the CMS for the calls the importer makes: updates merge
/// attributes, publishing stamps `publishedAt`, ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<EntityKind, Vec<Entry>>,
    last_id: EntryId,
    ops: OpCounts,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, kind: EntityKind) -> &[Entry] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, kind: EntityKind, id: EntryId) -> Option<&Entry> {
        self.entries(kind).iter().find(|e| e.id == id)
    }

    pub fn ops(&self) -> OpCounts {
        self.ops
    }

    fn entry_mut(&mut self, kind: EntityKind, id: EntryId) -> StoreResult<&mut Entry> {
        self.entries
            .get_mut(&kind)
            .and_then(|es| es.iter_mut().find(|e| e.id == id))
            .ok_or(StoreError::NotFound { kind, id })
    }
}

fn matches(entry: &Entry, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => entry.attr_str(field) == Some(value.as_str()),
        Filter::RelationEq { relation, id } => {
            relation_id(entry.attributes.get(relation)) == Some(*id)
        }
    }
}

/// Relations may be stored as a bare id or as `{ "id": n }`
fn relation_id(value: Option<&Value>) -> Option<EntryId> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::Object(o) => o.get("id").and_then(Value::as_u64),
        _ => None,
    }
}

fn as_object(kind: EntityKind, data: &Value) -> StoreResult<&serde_json::Map<String, Value>> {
    data.as_object().ok_or_else(|| StoreError::Rejected {
        kind,
        reason: "data must be an object".to_string(),
    })
}

impl ContentStore for MemoryStore {
    fn find_many(
        &mut self,
        kind: EntityKind,
        filters: &[Filter],
        limit: usize,
    ) -> StoreResult<Vec<Entry>> {
        self.ops.finds += 1;

        Ok(self
            .entries(kind)
            .iter()
            .filter(|e| filters.iter().all(|f| matches(e, f)))
            .take(limit)
            .cloned()
            .collect())
    }

    fn create(&mut self, kind: EntityKind, data: &Value) -> StoreResult<Entry> {
        let mut attributes = as_object(kind, data)?.clone();
        attributes.insert("publishedAt".to_string(), Value::Null);

        self.ops.creates += 1;
        self.last_id += 1;
        let entry = Entry {
            id: self.last_id,
            attributes,
        };
        self.entries.entry(kind).or_default().push(entry.clone());

        Ok(entry)
    }

    fn update(&mut self, kind: EntityKind, id: EntryId, data: &Value) -> StoreResult<Entry> {
        let data = as_object(kind, data)?.clone();
        let entry = self.entry_mut(kind, id)?;
        entry.attributes.extend(data);
        let entry = entry.clone();

        self.ops.updates += 1;
        Ok(entry)
    }

    fn publish(&mut self, kind: EntityKind, id: EntryId) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.entry_mut(kind, id)?
            .attributes
            .insert("publishedAt".to_string(), Value::String(now));

        self.ops.publishes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_update_merges_and_keeps_id() {
        let mut store = MemoryStore::new();
        let created = store
            .create(EntityKind::Course, &json!({"slug": "fiqh-1", "title": "Fiqh"}))
            .unwrap();
        let updated = store
            .update(EntityKind::Course, created.id, &json!({"title": "Fiqh I"}))
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.attr_str("slug"), Some("fiqh-1"));
        assert_eq!(updated.attr_str("title"), Some("Fiqh I"));
        assert_eq!(store.entries(EntityKind::Course).len(), 1);
    }

    #[test]
    fn test_relation_filter() {
        let mut store = MemoryStore::new();
        store
            .create(EntityKind::Lesson, &json!({"slug": "intro", "course": 1}))
            .unwrap();
        store
            .create(EntityKind::Lesson, &json!({"slug": "intro", "course": {"id": 2}}))
            .unwrap();

        let found = store
            .find_many(
                EntityKind::Lesson,
                &[Filter::eq("slug", "intro"), Filter::relation("course", 2)],
                10,
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn test_publish_missing_entry() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.publish(EntityKind::Quiz, 9),
            Err(StoreError::NotFound {
                kind: EntityKind::Quiz,
                id: 9
            })
        ));
    }

    #[test]
    fn test_publish_stamps_timestamp() {
        let mut store = MemoryStore::new();
        let entry = store
            .create(EntityKind::Quiz, &json!({"title": "Quiz"}))
            .unwrap();
        assert!(!entry.is_published());

        store.publish(EntityKind::Quiz, entry.id).unwrap();
        assert!(store.get(EntityKind::Quiz, entry.id).unwrap().is_published());
    }
}
