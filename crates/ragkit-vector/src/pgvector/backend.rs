//! pgvector backend implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bytea, Double, Jsonb, Nullable, Text};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use ::pgvector::Vector;
use ragkit_core::{Document, ScoredDocument, SearchKwargs};

use super::PgVectorConfig;
use super::metadata::{RawMetadata, normalize_metadata};
use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};
use crate::store::{ScoreOrder, VectorStoreBackend};

type PooledConnection =
    deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// pgvector backend reading the langchain-postgres schema.
pub struct PgVectorBackend {
    pool: Pool<AsyncPgConnection>,
    config: PgVectorConfig,
}

impl PgVectorBackend {
    /// Builds the connection pool and checks the collection.
    pub async fn connect(config: &PgVectorConfig) -> VectorResult<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.connection_url);

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .build()
            .map_err(|e| VectorError::invalid_config(e.to_string()))?;

        let backend = Self {
            pool,
            config: config.clone(),
        };

        let mut conn = backend.get_conn().await?;
        let collections: Vec<CollectionRow> =
            diesel::sql_query("SELECT uuid::text AS uuid FROM langchain_pg_collection WHERE name = $1")
                .bind::<Text, _>(&config.collection_name)
                .load(&mut conn)
                .await
                .map_err(|e| VectorError::connection(e.to_string()))?;

        match collections.into_iter().next() {
            Some(collection) => tracing::debug!(
                target: TRACING_TARGET,
                url = %config.connection_url_masked(),
                collection = %config.collection_name,
                uuid = %collection.uuid,
                "pgvector backend connected"
            ),
            None => tracing::warn!(
                target: TRACING_TARGET,
                collection = %config.collection_name,
                "Collection does not exist, searches will return no documents"
            ),
        }

        Ok(backend)
    }

    async fn get_conn(&self) -> VectorResult<PooledConnection> {
        self.pool
            .get()
            .await
            .map_err(|e| VectorError::connection(e.to_string()))
    }

    /// Builds the cosine distance query.
    ///
    /// `$1` is the query vector, `$2` the collection name, `$3` an optional
    /// JSONB containment filter and `$4` the limit.
    fn search_sql(&self) -> String {
        let metadata_column = if self.config.use_jsonb {
            "e.cmetadata::jsonb AS cmetadata"
        } else {
            "convert_to(e.cmetadata::text, 'UTF8') AS cmetadata"
        };

        format!(
            r#"
            SELECT e.id::text AS id, e.document, {},
                   (e.embedding <=> $1)::float8 AS distance
            FROM langchain_pg_embedding e
            JOIN langchain_pg_collection c ON e.collection_id = c.uuid
            WHERE c.name = $2
              AND ($3::jsonb IS NULL OR e.cmetadata::jsonb @> $3::jsonb)
            ORDER BY distance ASC
            LIMIT $4
            "#,
            metadata_column
        )
    }
}

#[async_trait]
impl VectorStoreBackend for PgVectorBackend {
    async fn similarity_search(
        &self,
        query: Vec<f32>,
        kwargs: &SearchKwargs,
    ) -> VectorResult<Vec<ScoredDocument>> {
        let filter = kwargs.filter().map(serde_json::to_string).transpose()?;
        let limit = kwargs.k() as i64;
        let sql = self.search_sql();
        let query = Vector::from(query);

        let mut conn = self.get_conn().await?;

        let rows: Vec<EmbeddingRow> = if self.config.use_jsonb {
            let rows: Vec<JsonbRow> = diesel::sql_query(&sql)
                .bind::<::pgvector::sql_types::Vector, _>(&query)
                .bind::<Text, _>(&self.config.collection_name)
                .bind::<Nullable<Text>, _>(filter.as_deref())
                .bind::<BigInt, _>(limit)
                .load(&mut conn)
                .await
                .map_err(|e| VectorError::backend(e.to_string()))?;
            rows.into_iter().map(EmbeddingRow::from).collect()
        } else {
            let rows: Vec<BytesRow> = diesel::sql_query(&sql)
                .bind::<::pgvector::sql_types::Vector, _>(&query)
                .bind::<Text, _>(&self.config.collection_name)
                .bind::<Nullable<Text>, _>(filter.as_deref())
                .bind::<BigInt, _>(limit)
                .load(&mut conn)
                .await
                .map_err(|e| VectorError::backend(e.to_string()))?;
            rows.into_iter().map(EmbeddingRow::from).collect()
        };

        results_to_docs_and_scores(rows, self.config.with_embeddings)
    }

    fn score_order(&self) -> ScoreOrder {
        ScoreOrder::LowerIsBetter
    }

    async fn close(&self) -> VectorResult<()> {
        self.pool.close();
        Ok(())
    }
}

impl std::fmt::Debug for PgVectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgVectorBackend")
            .field("collection", &self.config.collection_name)
            .field("use_jsonb", &self.config.use_jsonb)
            .finish()
    }
}

/// A row of the embedding table, with metadata not yet normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRow {
    /// Row identifier.
    pub id: Option<String>,
    /// Stored page content.
    pub document: Option<String>,
    /// Raw metadata.
    pub metadata: RawMetadata,
    /// Cosine distance to the query.
    pub distance: f64,
}

/// Converts result rows into scored documents.
///
/// The score is the distance when `has_embeddings` is true, and absent otherwise.
///
/// # Errors
///
/// Fails on the first row whose metadata cannot be decoded.
pub fn results_to_docs_and_scores(
    rows: Vec<EmbeddingRow>,
    has_embeddings: bool,
) -> VectorResult<Vec<ScoredDocument>> {
    rows.into_iter()
        .map(|row| {
            let metadata = normalize_metadata(row.metadata)?;
            let document = Document {
                id: row.id,
                page_content: row.document.unwrap_or_default(),
                metadata,
            };
            let score = has_embeddings.then_some(row.distance as f32);
            Ok(ScoredDocument::new(document, score))
        })
        .collect()
}

#[derive(QueryableByName)]
struct CollectionRow {
    #[diesel(sql_type = Text)]
    uuid: String,
}

#[derive(QueryableByName)]
struct JsonbRow {
    #[diesel(sql_type = Nullable<Text>)]
    id: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    document: Option<String>,
    #[diesel(sql_type = Nullable<Jsonb>)]
    cmetadata: Option<serde_json::Value>,
    #[diesel(sql_type = Double)]
    distance: f64,
}

#[derive(QueryableByName)]
struct BytesRow {
    #[diesel(sql_type = Nullable<Text>)]
    id: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    document: Option<String>,
    #[diesel(sql_type = Nullable<Bytea>)]
    cmetadata: Option<Vec<u8>>,
    #[diesel(sql_type = Double)]
    distance: f64,
}

impl From<JsonbRow> for EmbeddingRow {
    fn from(row: JsonbRow) -> Self {
        Self {
            id: row.id,
            document: row.document,
            metadata: RawMetadata::from(row.cmetadata),
            distance: row.distance,
        }
    }
}

impl From<BytesRow> for EmbeddingRow {
    fn from(row: BytesRow) -> Self {
        Self {
            id: row.id,
            document: row.document,
            metadata: RawMetadata::from(row.cmetadata),
            distance: row.distance,
        }
    }
}
