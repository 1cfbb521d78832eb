use crate::{
    crud::{
        CrudStore, Document, ListResponse, record_id, strip_system_fields, with_system_fields,
    },
    error::{DuplicateRecordSnafu, MissingRecordSnafu, PortalResult},
};
use async_trait::async_trait;
use jiff::Timestamp;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredRecord {
    data: Document,
    created_date: Timestamp,
    updated_date: Timestamp,
}

impl StoredRecord {
    fn to_document(&self) -> Document {
        with_system_fields(self.data.clone(), self.created_date, self.updated_date)
    }
}

///Keeps every collection in a map behind one lock. Used when no database is configured, and by the tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCrudStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, StoredRecord>>>>,
}

impl InMemoryCrudStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrudStore for InMemoryCrudStore {
    async fn create(&self, collection: &str, record: Document) -> PortalResult<Document> {
        let record = strip_system_fields(record);
        let id = record_id(collection, &record)?.to_string();

        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        snafu::ensure!(
            !records.contains_key(&id),
            DuplicateRecordSnafu { collection, id }
        );

        let now = Timestamp::now();
        let stored = StoredRecord {
            data: record,
            created_date: now,
            updated_date: now,
        };
        let document = stored.to_document();
        records.insert(id, stored);

        Ok(document)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> PortalResult<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|records| records.get(id))
            .map(StoredRecord::to_document)
            .ok_or_else(|| {
                MissingRecordSnafu {
                    collection,
                    id,
                }
                .build()
            })
    }

    async fn get_all(&self, collection: &str) -> PortalResult<ListResponse<Document>> {
        let items = self
            .collections
            .read()
            .await
            .get(collection)
            .map(|records| records.values().map(StoredRecord::to_document).collect())
            .unwrap_or_default();

        Ok(ListResponse { items })
    }

    async fn update(&self, collection: &str, record: Document) -> PortalResult<Document> {
        let record = strip_system_fields(record);
        let id = record_id(collection, &record)?.to_string();

        let mut collections = self.collections.write().await;
        let Some(stored) = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(&id))
        else {
            return MissingRecordSnafu { collection, id }.fail();
        };

        //an identical payload leaves the stored record exactly as it was
        if stored.data != record {
            stored.data = record;
            stored.updated_date = Timestamp::now();
        }

        Ok(stored.to_document())
    }
}
