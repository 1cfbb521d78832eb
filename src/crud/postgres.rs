use crate::{
    crud::{CrudStore, Document, ListResponse, record_id, strip_system_fields, with_system_fields},
    error::{
        DuplicateRecordSnafu, InvalidTimestampSnafu, MakeQuerySnafu, MigrateSnafu,
        MissingRecordSnafu, OpenDatabaseSnafu, PortalResult,
    },
};
use async_trait::async_trait;
use jiff::Timestamp;
use snafu::{OptionExt, ResultExt};
use sqlx::{FromRow, Pool, Postgres, postgres::PgPoolOptions, types::Json};

const RETURNING: &str = "data, (EXTRACT(EPOCH FROM created_date) * 1000)::BIGINT AS created_ms, (EXTRACT(EPOCH FROM updated_date) * 1000)::BIGINT AS updated_ms";

#[derive(FromRow)]
struct RecordRow {
    data: Json<Document>,
    created_ms: i64,
    updated_ms: i64,
}

impl TryFrom<RecordRow> for Document {
    type Error = crate::error::PortalError;

    fn try_from(
        RecordRow {
            data,
            created_ms,
            updated_ms,
        }: RecordRow,
    ) -> Result<Self, Self::Error> {
        let created_date = Timestamp::from_millisecond(created_ms)
            .context(InvalidTimestampSnafu { millis: created_ms })?;
        let updated_date = Timestamp::from_millisecond(updated_ms)
            .context(InvalidTimestampSnafu { millis: updated_ms })?;

        Ok(with_system_fields(data.0, created_date, updated_date))
    }
}

///Every collection lives in the one `records` table as JSONB, keyed by `(collection, id)`.
#[derive(Debug, Clone)]
pub struct PostgresCrudStore {
    pool: Pool<Postgres>,
}

impl PostgresCrudStore {
    pub async fn connect(options: PgPoolOptions, db_path: &str) -> PortalResult<Self> {
        let pool = options.connect(db_path).await.context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CrudStore for PostgresCrudStore {
    async fn create(&self, collection: &str, record: Document) -> PortalResult<Document> {
        let record = strip_system_fields(record);
        let id = record_id(collection, &record)?.to_string();

        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "INSERT INTO records (collection, id, data) VALUES ($1, $2, $3) ON CONFLICT (collection, id) DO NOTHING RETURNING {RETURNING}"
        ))
        .bind(collection)
        .bind(&id)
        .bind(Json(&record))
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)?;

        row.context(DuplicateRecordSnafu { collection, id })?
            .try_into()
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> PortalResult<Document> {
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "SELECT {RETURNING} FROM records WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)?;

        row.context(MissingRecordSnafu { collection, id })?
            .try_into()
    }

    async fn get_all(&self, collection: &str) -> PortalResult<ListResponse<Document>> {
        let rows: Vec<RecordRow> = sqlx::query_as(&format!(
            "SELECT {RETURNING} FROM records WHERE collection = $1 ORDER BY created_date"
        ))
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .context(MakeQuerySnafu)?;

        let items = rows
            .into_iter()
            .map(Document::try_from)
            .collect::<PortalResult<_>>()?;
        Ok(ListResponse { items })
    }

    async fn update(&self, collection: &str, record: Document) -> PortalResult<Document> {
        let record = strip_system_fields(record);
        let id = record_id(collection, &record)?.to_string();

        //SET sees the old row, so an identical payload keeps its old `updated_date`
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "UPDATE records SET updated_date = CASE WHEN data = $3 THEN updated_date ELSE now() END, data = $3 WHERE collection = $1 AND id = $2 RETURNING {RETURNING}"
        ))
        .bind(collection)
        .bind(&id)
        .bind(Json(&record))
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)?;

        row.context(MissingRecordSnafu { collection, id })?
            .try_into()
    }
}
