use crate::{
    crud::{CrudStore, Record, SESSIONS, create_record, get_record, update_record},
    error::{
        B64Snafu, InvalidExpirySnafu, PortalError, PortalResult, RmpSerdeDecodeSnafu,
        RmpSerdeEncodeSnafu,
    },
};
use async_trait::async_trait;
use axum_login::tower_sessions::{
    SessionStore,
    session::{Id, Record as SessionRecord},
    session_store::Error as SSError,
};
use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::sync::Arc;
use time::OffsetDateTime;

///one session, as it sits in the `sessions` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SessionDocument {
    #[serde(rename = "_id")]
    id: String,
    ///rmp-serde encoded session data, as base64
    data: String,
    ///unix seconds
    expires_at: i64,
}

impl Record for SessionDocument {
    const COLLECTION: &'static str = SESSIONS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl SessionDocument {
    fn encode(record: &SessionRecord) -> PortalResult<Self> {
        let serialised_data = rmp_serde::to_vec(&record.data).context(RmpSerdeEncodeSnafu)?;

        Ok(Self {
            id: record.id.to_string(),
            data: BASE64_STANDARD.encode(serialised_data),
            expires_at: record.expiry_date.unix_timestamp(),
        })
    }

    fn decode(self, id: Id) -> PortalResult<SessionRecord> {
        let bytes = BASE64_STANDARD.decode(&self.data).context(B64Snafu)?;
        let data = rmp_serde::from_slice(&bytes).context(RmpSerdeDecodeSnafu)?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(self.expires_at).context(
            InvalidExpirySnafu {
                seconds: self.expires_at,
            },
        )?;

        Ok(SessionRecord {
            id,
            data,
            expiry_date,
        })
    }
}

///Sessions kept in the same CRUD store as everything else.
///
///The store can't delete, so a deleted session is overwritten with an empty, already-expired one.
///Nothing prunes tombstones or expired sessions, so the collection only grows.
#[derive(Debug, Clone)]
pub struct CrudSessionStore {
    store: Arc<dyn CrudStore>,
}

impl CrudSessionStore {
    pub const fn new(store: Arc<dyn CrudStore>) -> Self {
        Self { store }
    }

    async fn find(&self, id: &Id) -> PortalResult<Option<SessionDocument>> {
        match get_record(&*self.store, &id.to_string()).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.is_missing_record() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upsert(&self, document: &SessionDocument) -> PortalResult<()> {
        match update_record(&*self.store, document).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_missing_record() => {
                create_record(&*self.store, document).await.map(|_| ())
            }
            Err(e) => Err(e),
        }
    }
}

fn backend_error(e: &PortalError) -> SSError {
    SSError::Backend(e.to_string())
}

#[async_trait]
impl SessionStore for CrudSessionStore {
    async fn create(&self, session_record: &mut SessionRecord) -> Result<(), SSError> {
        loop {
            let document = SessionDocument::encode(session_record)
                .map_err(|e| SSError::Encode(e.to_string()))?;

            match create_record(&*self.store, &document).await {
                Ok(_) => return Ok(()),
                Err(PortalError::DuplicateRecord { .. }) => {
                    session_record.id = Id::default();
                }
                Err(e) => return Err(backend_error(&e)),
            }
        }
    }

    async fn save(&self, session_record: &SessionRecord) -> Result<(), SSError> {
        let document =
            SessionDocument::encode(session_record).map_err(|e| SSError::Encode(e.to_string()))?;

        self.upsert(&document)
            .await
            .map_err(|e| backend_error(&e))
    }

    async fn load(&self, session_id: &Id) -> Result<Option<SessionRecord>, SSError> {
        let Some(document) = self.find(session_id).await.map_err(|e| backend_error(&e))? else {
            return Ok(None);
        };
        //deleted sessions are expired tombstones with no data, so check before decoding
        if document.expires_at <= OffsetDateTime::now_utc().unix_timestamp() {
            return Ok(None);
        }

        document
            .decode(*session_id)
            .map(Some)
            .map_err(|e| SSError::Decode(e.to_string()))
    }

    async fn delete(&self, session_id: &Id) -> Result<(), SSError> {
        if self
            .find(session_id)
            .await
            .map_err(|e| backend_error(&e))?
            .is_none()
        {
            return Ok(());
        }

        let tombstone = SessionDocument {
            id: session_id.to_string(),
            ..Default::default()
        };
        self.upsert(&tombstone)
            .await
            .map_err(|e| backend_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::memory::InMemoryCrudStore;
    use serde_json::json;
    use std::collections::HashMap;
    use time::Duration;

    fn store() -> CrudSessionStore {
        CrudSessionStore::new(Arc::new(InMemoryCrudStore::new()))
    }

    fn record(expires_in: Duration) -> SessionRecord {
        SessionRecord {
            id: Id::default(),
            data: HashMap::from([("member".to_string(), json!({"id": "m1", "n": 3}))]),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn created_sessions_load_back() {
        let store = store();
        let mut record = record(Duration::days(1));
        store.create(&mut record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, record.data);
        assert_eq!(
            loaded.expiry_date.unix_timestamp(),
            record.expiry_date.unix_timestamp()
        );
    }

    #[tokio::test]
    async fn save_overwrites_existing_sessions() {
        let store = store();
        let mut record = record(Duration::days(1));
        store.create(&mut record).await.unwrap();

        record.data.insert("extra".to_string(), json!(["a", "b"]));
        store.save(&record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data["extra"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn save_creates_unknown_sessions() {
        let store = store();
        let record = record(Duration::days(1));
        store.save(&record).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_and_deleted_sessions_do_not_load() {
        let store = store();

        let mut expired = record(Duration::seconds(-5));
        store.create(&mut expired).await.unwrap();
        assert!(store.load(&expired.id).await.unwrap().is_none());

        let mut live = record(Duration::days(1));
        store.create(&mut live).await.unwrap();
        store.delete(&live.id).await.unwrap();
        assert!(store.load(&live.id).await.unwrap().is_none());

        store.delete(&Id::default()).await.unwrap();
    }
}
