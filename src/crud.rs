//! The generic record store every page persists through.
//!
//! Records are JSON objects keyed by `_id` inside a named collection. Callers always
//! supply the `_id`; the store owns the `_createdDate`/`_updatedDate` fields.

use crate::error::{
    MissingRecordIdSnafu, PortalError, PortalResult, RecordNotAnObjectSnafu, SerdeJsonSnafu,
};
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt};
use std::fmt::Debug;

pub mod memory;
pub mod postgres;

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_DATE_FIELD: &str = "_createdDate";
pub const UPDATED_DATE_FIELD: &str = "_updatedDate";

pub const STUDENT_PROFILES: &str = "studentprofiles";
pub const STUDENT_PLACEMENTS: &str = "studentplacements";
pub const JOB_POSTINGS: &str = "jobpostings";
pub const MEMBERS: &str = "members";
pub const SESSIONS: &str = "sessions";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

#[async_trait]
pub trait CrudStore: Debug + Send + Sync + 'static {
    ///fails if a record with that `_id` is already in the collection
    async fn create(&self, collection: &str, record: Document) -> PortalResult<Document>;
    ///fails with [`PortalError::MissingRecord`] if there's nothing with that id
    async fn get_by_id(&self, collection: &str, id: &str) -> PortalResult<Document>;
    async fn get_all(&self, collection: &str) -> PortalResult<ListResponse<Document>>;
    ///replaces the whole record, keeping only its creation date
    async fn update(&self, collection: &str, record: Document) -> PortalResult<Document>;
}

pub fn record_id<'a>(collection: &str, record: &'a Document) -> PortalResult<&'a str> {
    record
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .context(MissingRecordIdSnafu { collection })
}

///drops everything the store manages itself, leaving the caller-owned fields
pub fn strip_system_fields(mut record: Document) -> Document {
    record.remove(CREATED_DATE_FIELD);
    record.remove(UPDATED_DATE_FIELD);
    record
}

pub fn with_system_fields(
    mut data: Document,
    created_date: Timestamp,
    updated_date: Timestamp,
) -> Document {
    data.insert(
        CREATED_DATE_FIELD.to_string(),
        Value::String(created_date.to_string()),
    );
    data.insert(
        UPDATED_DATE_FIELD.to_string(),
        Value::String(updated_date.to_string()),
    );
    data
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub trait Record: Serialize + DeserializeOwned + Send {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

fn to_document<R: Record>(record: &R) -> PortalResult<Document> {
    match serde_json::to_value(record).context(SerdeJsonSnafu {
        collection: R::COLLECTION,
    })? {
        Value::Object(map) => Ok(map),
        _ => RecordNotAnObjectSnafu {
            collection: R::COLLECTION,
        }
        .fail(),
    }
}

fn from_document<R: Record>(document: Document) -> PortalResult<R> {
    serde_json::from_value(Value::Object(document)).context(SerdeJsonSnafu {
        collection: R::COLLECTION,
    })
}

pub async fn create_record<R: Record>(store: &dyn CrudStore, record: &R) -> PortalResult<R> {
    debug!(collection = R::COLLECTION, id = record.id(), "Creating record");
    let document = to_document(record)?;
    from_document(store.create(R::COLLECTION, document).await?)
}

pub async fn get_record<R: Record>(store: &dyn CrudStore, id: &str) -> PortalResult<R> {
    from_document(store.get_by_id(R::COLLECTION, id).await?)
}

pub async fn get_all_records<R: Record>(store: &dyn CrudStore) -> PortalResult<Vec<R>> {
    store
        .get_all(R::COLLECTION)
        .await?
        .items
        .into_iter()
        .map(from_document)
        .collect()
}

pub async fn update_record<R: Record>(store: &dyn CrudStore, record: &R) -> PortalResult<R> {
    debug!(collection = R::COLLECTION, id = record.id(), "Updating record");
    let document = to_document(record)?;
    from_document(store.update(R::COLLECTION, document).await?)
}

impl PortalError {
    pub const fn is_missing_record(&self) -> bool {
        matches!(self, Self::MissingRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test documents are always objects"),
        }
    }

    #[test]
    fn record_id_must_be_present_and_non_empty() {
        let with_id = doc(json!({"_id": "abc", "name": "x"}));
        assert_eq!(record_id("things", &with_id).unwrap(), "abc");

        let empty_id = doc(json!({"_id": ""}));
        assert!(matches!(
            record_id("things", &empty_id),
            Err(PortalError::MissingRecordId { .. })
        ));

        let numeric_id = doc(json!({"_id": 5}));
        assert!(record_id("things", &numeric_id).is_err());
    }

    #[test]
    fn strip_system_fields_keeps_caller_fields() {
        let stripped = strip_system_fields(doc(json!({
            "_id": "abc",
            "_createdDate": "2025-01-01T00:00:00Z",
            "_updatedDate": "2025-01-02T00:00:00Z",
            "companyName": "Acme",
        })));

        assert_eq!(stripped, doc(json!({"_id": "abc", "companyName": "Acme"})));
    }

    #[test]
    fn new_record_ids_are_unique() {
        assert_ne!(new_record_id(), new_record_id());
    }
}
