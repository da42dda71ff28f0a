//! PostgreSQL document store: every collection lives in the `documents` table,
//! with the body kept as `jsonb`. Counters and field merges are single
//! `UPDATE ... RETURNING` statements, so they are atomic per row.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbConn, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};
use serde_json::{Map, Value};

use agora_core::StoreError;
use agora_core::ports::{Collection, DocKey, Document, DocumentStore, ScanPage};

use super::entity::document::{self, Column, Entity as DocumentEntity};

const INSERT_IF_ABSENT: &str = r#"
INSERT INTO documents (collection, partition_key, sort_key, body, updated_at)
VALUES ($1, $2, $3, $4, now())
ON CONFLICT (collection, partition_key, sort_key) DO NOTHING"#;

const INCREMENT_FIELD: &str = r#"
UPDATE documents
SET body = jsonb_set(body, ARRAY[$4::text], to_jsonb(COALESCE((body->>($4::text))::bigint, 0) + $5)),
    updated_at = now()
WHERE collection = $1 AND partition_key = $2 AND sort_key = $3
  AND COALESCE((body->>($4::text))::bigint, 0) + $5 >= 0
RETURNING (body->>($4::text))::bigint AS value"#;

const MERGE_FIELDS: &str = r#"
UPDATE documents
SET body = body || $4::jsonb,
    updated_at = now()
WHERE collection = $1 AND partition_key = $2 AND sort_key = $3
RETURNING body"#;

/// Document store on PostgreSQL via SeaORM.
pub struct PostgresDocumentStore {
    db: DbConn,
}

impl PostgresDocumentStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn key_filter(collection: Collection, key: &DocKey) -> Condition {
        Condition::all()
            .add(Column::Collection.eq(collection.as_str()))
            .add(Column::PartitionKey.eq(key.partition.as_str()))
            .add(Column::SortKey.eq(key.sort.as_str()))
    }

    fn partition_filter(collection: Collection, partition: &str) -> Condition {
        Condition::all()
            .add(Column::Collection.eq(collection.as_str()))
            .add(Column::PartitionKey.eq(partition))
    }

    fn keyed_statement(
        sql: &str,
        collection: Collection,
        key: &DocKey,
        extra: impl IntoIterator<Item = sea_orm::Value>,
    ) -> Statement {
        let mut values: Vec<sea_orm::Value> = vec![
            collection.as_str().into(),
            key.partition.clone().into(),
            key.sort.clone().into(),
        ];
        values.extend(extra);
        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    }
}

fn map_db_err(err: DbErr) -> StoreError {
    match err {
        DbErr::Conn(e) => StoreError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => StoreError::Connection(e.to_string()),
        other => {
            tracing::error!(error = %other, "Document query failed");
            StoreError::Query(other.to_string())
        }
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: Collection, key: &DocKey) -> Result<Option<Value>, StoreError> {
        let row = DocumentEntity::find()
            .filter(Self::key_filter(collection, key))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(|m| m.body))
    }

    async fn put(
        &self,
        collection: Collection,
        key: &DocKey,
        body: Value,
    ) -> Result<(), StoreError> {
        let model = document::ActiveModel {
            collection: Set(collection.as_str().to_string()),
            partition_key: Set(key.partition.clone()),
            sort_key: Set(key.sort.clone()),
            body: Set(body),
            updated_at: Set(chrono::Utc::now().into()),
        };

        DocumentEntity::insert(model)
            .on_conflict(
                OnConflict::columns([Column::Collection, Column::PartitionKey, Column::SortKey])
                    .update_columns([Column::Body, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn put_if_absent(
        &self,
        collection: Collection,
        key: &DocKey,
        body: Value,
    ) -> Result<bool, StoreError> {
        let stmt = Self::keyed_statement(INSERT_IF_ABSENT, collection, key, [body.into()]);
        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn increment(
        &self,
        collection: Collection,
        key: &DocKey,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError> {
        let stmt = Self::keyed_statement(
            INCREMENT_FIELD,
            collection,
            key,
            [field.into(), delta.into()],
        );
        let row = self.db.query_one(stmt).await.map_err(map_db_err)?;

        match row {
            Some(row) => {
                let value: i64 = row.try_get("", "value").map_err(map_db_err)?;
                Ok(Some(value))
            }
            // No row updated: either the document is missing or the guard rejected the write.
            None => match self.get(collection, key).await? {
                Some(_) => Err(StoreError::ConditionFailed(format!(
                    "{field} would become negative"
                ))),
                None => Ok(None),
            },
        }
    }

    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let stmt = Self::keyed_statement(
            MERGE_FIELDS,
            collection,
            key,
            [Value::Object(fields).into()],
        );
        let row = self.db.query_one(stmt).await.map_err(map_db_err)?;
        row.map(|r| r.try_get::<Value>("", "body").map_err(map_db_err))
            .transpose()
    }

    async fn delete(&self, collection: Collection, key: &DocKey) -> Result<bool, StoreError> {
        let result = DocumentEntity::delete_many()
            .filter(Self::key_filter(collection, key))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn query(
        &self,
        collection: Collection,
        partition: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let rows = DocumentEntity::find()
            .filter(Self::partition_filter(collection, partition))
            .order_by_asc(Column::SortKey)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(|m| m.body).collect())
    }

    async fn count(&self, collection: Collection, partition: &str) -> Result<u64, StoreError> {
        DocumentEntity::find()
            .filter(Self::partition_filter(collection, partition))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn scan(
        &self,
        collection: Collection,
        limit: usize,
        start_after: Option<&DocKey>,
    ) -> Result<ScanPage, StoreError> {
        let mut select = DocumentEntity::find().filter(Column::Collection.eq(collection.as_str()));
        if let Some(key) = start_after {
            select = select.filter(
                Condition::any()
                    .add(Column::PartitionKey.lt(key.partition.as_str()))
                    .add(
                        Condition::all()
                            .add(Column::PartitionKey.eq(key.partition.as_str()))
                            .add(Column::SortKey.lt(key.sort.as_str())),
                    ),
            );
        }

        let rows = select
            .order_by_desc(Column::PartitionKey)
            .order_by_desc(Column::SortKey)
            .limit((limit as u64).saturating_add(1))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut items: Vec<Document> = rows.into_iter().map(Into::into).collect();
        let last_key = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|d| d.key.clone())
        } else {
            None
        };

        Ok(ScanPage { items, last_key })
    }
}
