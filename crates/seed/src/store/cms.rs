use log::debug;
use masjid_cms_client::{Client, Entry, EntryId, Filter};
use serde_json::Value;

use super::{ContentStore, EntityKind, StoreResult};

impl ContentStore for Client {
    fn find_many(
        &mut self,
        kind: EntityKind,
        filters: &[Filter],
        limit: usize,
    ) -> StoreResult<Vec<Entry>> {
        debug!("find {} where {:?}", kind, filters);
        Ok(Client::find_many(self, kind.collection(), filters, limit)?)
    }

    fn create(&mut self, kind: EntityKind, data: &Value) -> StoreResult<Entry> {
        Ok(Client::create(self, kind.collection(), data)?)
    }

    fn update(&mut self, kind: EntityKind, id: EntryId, data: &Value) -> StoreResult<Entry> {
        Ok(Client::update(self, kind.collection(), id, data)?)
    }

    fn publish(&mut self, kind: EntityKind, id: EntryId) -> StoreResult<()> {
        Client::publish(self, kind.collection(), id)?;
        Ok(())
    }
}
