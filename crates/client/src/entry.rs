use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{Client, Error, Result};

pub type EntryId = u64;

/// A single record of a collection type, as returned by the content API.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Entry {
    pub id: EntryId,

    /// The record's fields. Relations are only present when populated.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Entry {
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Whether the record has been published (drafts have a null `publishedAt`)
    pub fn is_published(&self) -> bool {
        self.attributes
            .get("publishedAt")
            .is_some_and(|v| !v.is_null())
    }
}

/// A filter for [`Client::find_many`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// `field == value`
    Eq { field: String, value: String },
    /// The relation `relation` points at the record with id `id`
    RelationEq { relation: String, id: EntryId },
}

impl Filter {
    pub fn eq(field: &str, value: &str) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn relation(relation: &str, id: EntryId) -> Self {
        Filter::RelationEq {
            relation: relation.to_string(),
            id,
        }
    }

    /// The query-string pair for this filter
    pub fn query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq { field, value } => (format!("filters[{}][$eq]", field), value.clone()),
            Filter::RelationEq { relation, id } => {
                (format!("filters[{}][id][$eq]", relation), id.to_string())
            }
        }
    }
}

#[derive(Deserialize)]
struct OneResp {
    data: Option<Entry>,
}

#[derive(Deserialize)]
struct ManyResp {
    data: Vec<Entry>,
}

#[derive(Serialize)]
struct Body<'a> {
    data: &'a Value,
}

impl Client {
    /// List records of `collection` matching every filter. Drafts are included.
    pub fn find_many(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: usize,
    ) -> Result<Vec<Entry>> {
        let mut query = filters.iter().map(Filter::query_pair).collect::<Vec<_>>();
        query.push(("pagination[limit]".to_string(), limit.to_string()));
        query.push(("publicationState".to_string(), "preview".to_string()));

        self.send::<ManyResp>(
            self.http
                .get(self.url(&format!("api/{}", collection)))
                .query(&query),
        )
        .map(|r| r.data)
    }

    pub fn create(&self, collection: &str, data: &Value) -> Result<Entry> {
        self.send::<OneResp>(
            self.http
                .post(self.url(&format!("api/{}", collection)))
                .json(&Body { data }),
        )
        .and_then(expect_entry)
    }

    pub fn update(&self, collection: &str, id: EntryId, data: &Value) -> Result<Entry> {
        self.send::<OneResp>(
            self.http
                .put(self.url(&format!("api/{}/{}", collection, id)))
                .json(&Body { data }),
        )
        .and_then(expect_entry)
    }

    /// Publish a record by stamping `publishedAt` with the current time
    pub fn publish(&self, collection: &str, id: EntryId) -> Result<Entry> {
        self.update(collection, id, &publish_payload())
    }
}

pub(crate) fn publish_payload() -> Value {
    json!({ "publishedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true) })
}

fn expect_entry(resp: OneResp) -> Result<Entry> {
    resp.data
        .ok_or_else(|| Error::MalformedResponse("response had no data".to_string()))
}
