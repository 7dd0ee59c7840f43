//! MongoDB Atlas backend implementation.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document as BsonDocument, doc};
use mongodb::{Client, Collection};
use ragkit_core::{Document, ScoredDocument, SearchKwargs};
use serde_json::{Map, Value};

use super::MongoConfig;
use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};
use crate::store::VectorStoreBackend;

/// MongoDB Atlas backend using `$vectorSearch` aggregations.
pub struct MongoBackend {
    client: Client,
    collection: Collection<BsonDocument>,
    config: MongoConfig,
}

impl MongoBackend {
    /// Connects to the cluster and pings it.
    pub async fn connect(config: &MongoConfig) -> VectorResult<Self> {
        let client = Client::with_uri_str(&config.connection_uri)
            .await
            .map_err(|e| VectorError::invalid_config(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| VectorError::connection(format!("Failed to ping cluster: {}", e)))?;

        let collection = client
            .database(&config.database)
            .collection::<BsonDocument>(&config.collection);

        tracing::debug!(
            target: TRACING_TARGET,
            uri = %config.connection_uri_masked(),
            database = %config.database,
            collection = %config.collection,
            "MongoDB backend connected"
        );

        Ok(Self {
            client,
            collection,
            config: config.clone(),
        })
    }

    fn pipeline(&self, query: Vec<f32>, kwargs: &SearchKwargs) -> VectorResult<Vec<BsonDocument>> {
        let k = kwargs.k();
        let num_candidates = kwargs.fetch_k().unwrap_or(k * 10);

        let mut vector_search = doc! {
            "index": self.config.index_name.as_str(),
            "path": self.config.embedding_key.as_str(),
            "queryVector": query,
            "numCandidates": num_candidates as i64,
            "limit": k as i64,
        };
        if let Some(filter) = kwargs.filter() {
            let filter = mongodb::bson::to_document(filter)
                .map_err(|e| VectorError::serialization(e.to_string()))?;
            vector_search.insert("filter", filter);
        }

        let mut projection = BsonDocument::new();
        projection.insert(self.config.embedding_key.as_str(), 0);

        Ok(vec![
            doc! { "$vectorSearch": vector_search },
            doc! { "$set": { "score": { "$meta": "vectorSearchScore" } } },
            doc! { "$project": projection },
        ])
    }
}

#[async_trait]
impl VectorStoreBackend for MongoBackend {
    async fn similarity_search(
        &self,
        query: Vec<f32>,
        kwargs: &SearchKwargs,
    ) -> VectorResult<Vec<ScoredDocument>> {
        let pipeline = self.pipeline(query, kwargs)?;

        let cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| VectorError::backend(e.to_string()))?;

        let rows: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| VectorError::backend(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| bson_to_document(row, &self.config.text_key, &self.config.embedding_key))
            .collect())
    }

    async fn close(&self) -> VectorResult<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

impl std::fmt::Debug for MongoBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoBackend")
            .field("database", &self.config.database)
            .field("collection", &self.config.collection)
            .finish()
    }
}

/// Converts an aggregation row into a scored document.
///
/// Every field other than the id, text, score and embedding ends up in the metadata.
fn bson_to_document(mut row: BsonDocument, text_key: &str, embedding_key: &str) -> ScoredDocument {
    let id = row.remove("_id").map(|id| match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    });

    let page_content = match row.remove(text_key) {
        Some(Bson::String(text)) => text,
        _ => String::new(),
    };

    let score = match row.remove("score") {
        Some(Bson::Double(score)) => Some(score as f32),
        Some(Bson::Int32(score)) => Some(score as f32),
        Some(Bson::Int64(score)) => Some(score as f32),
        _ => None,
    };

    row.remove(embedding_key);

    let metadata = match Bson::Document(row).into_relaxed_extjson() {
        Value::Object(metadata) => metadata,
        _ => Map::new(),
    };

    let document = Document {
        id,
        page_content,
        metadata,
    };
    ScoredDocument::new(document, score)
}
