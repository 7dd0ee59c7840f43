//! Elasticsearch backend implementation.

use async_trait::async_trait;
use ragkit_core::{Document, ScoredDocument, SearchKwargs};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{ElasticAuth, ElasticConfig};
use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};
use crate::mask::mask_url;
use crate::store::VectorStoreBackend;

/// Candidate pool size used when `fetch_k` is not given.
const DEFAULT_NUM_CANDIDATES: usize = 50;

/// Elasticsearch backend talking to the REST API.
pub struct ElasticBackend {
    client: Client,
    base_url: String,
    config: ElasticConfig,
}

impl ElasticBackend {
    /// Connects to the cluster and verifies it responds.
    pub async fn connect(config: &ElasticConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| VectorError::connection(e.to_string()))?;

        let backend = Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            config: config.clone(),
        };

        let response = backend
            .authorize(backend.client.get(format!("{}/", backend.base_url)))
            .send()
            .await
            .map_err(|e| VectorError::connection(format!("Failed to reach cluster: {}", e)))?;

        if !response.status().is_success() {
            return Err(VectorError::connection(format!(
                "Cluster responded with {}",
                response.status()
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            url = %mask_url(&config.url),
            index = %config.index_name,
            "Elasticsearch backend connected"
        );

        Ok(backend)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            ElasticAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            ElasticAuth::ApiKey { api_key } => {
                request.header(AUTHORIZATION, format!("ApiKey {}", api_key))
            }
        }
    }

    /// Builds the approximate kNN search body.
    fn search_body(&self, query: Vec<f32>, kwargs: &SearchKwargs) -> Value {
        let k = kwargs.k();
        let num_candidates = kwargs.fetch_k().unwrap_or(DEFAULT_NUM_CANDIDATES).max(k);

        let mut knn = json!({
            "field": self.config.vector_field,
            "query_vector": query,
            "k": k,
            "num_candidates": num_candidates,
        });

        let filter = match kwargs.get("filter") {
            Some(Value::Array(clauses)) => Some(Value::Array(clauses.clone())),
            Some(Value::Object(clause)) => Some(Value::Array(vec![Value::Object(clause.clone())])),
            _ => None,
        };
        if let (Some(filter), Some(knn)) = (filter, knn.as_object_mut()) {
            knn.insert("filter".into(), filter);
        }

        json!({
            "knn": knn,
            "size": k,
            "_source": [self.config.text_field, "metadata"],
        })
    }

    fn hit_to_document(&self, hit: Hit) -> ScoredDocument {
        let mut source = hit.source;
        let page_content = match source.remove(&self.config.text_field) {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        let metadata = match source.remove("metadata") {
            Some(Value::Object(metadata)) => metadata,
            _ => Map::new(),
        };

        let document = Document {
            id: hit.id,
            page_content,
            metadata,
        };
        ScoredDocument::new(document, hit.score)
    }
}

#[async_trait]
impl VectorStoreBackend for ElasticBackend {
    async fn similarity_search(
        &self,
        query: Vec<f32>,
        kwargs: &SearchKwargs,
    ) -> VectorResult<Vec<ScoredDocument>> {
        let url = format!("{}/{}/_search", self.base_url, self.config.index_name);
        let body = self.search_body(query, kwargs);

        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorError::connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VectorError::collection_not_found(&self.config.index_name));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VectorError::backend(format!(
                "Search failed with {}: {}",
                status, text
            )));
        }

        let response: SearchResponse = response
            .json()
            .await
            .map_err(|e| VectorError::serialization(e.to_string()))?;

        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|hit| self.hit_to_document(hit))
            .collect())
    }

    async fn close(&self) -> VectorResult<()> {
        // The HTTP client holds no dedicated connection.
        Ok(())
    }
}

impl std::fmt::Debug for ElasticBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticBackend")
            .field("url", &mask_url(&self.config.url))
            .field("index", &self.config.index_name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{basic_auth, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn api_key_config(url: &str) -> ElasticConfig {
        ElasticConfig::new(
            url,
            ElasticAuth::ApiKey {
                api_key: "secret".into(),
            },
        )
    }

    async fn mount_cluster_info(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("authorization", "ApiKey secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cluster_name": "test",
                "version": {"number": "8.15.0"}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_connect_rejected_cluster_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = ElasticBackend::connect(&api_key_config(&server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Connection(_)));
    }

    #[tokio::test]
    async fn test_connect_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(basic_auth("elastic", "changeme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let config = ElasticConfig::new(
            server.uri(),
            ElasticAuth::Basic {
                username: "elastic".into(),
                password: "changeme".into(),
            },
        );
        assert!(ElasticBackend::connect(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_search_returns_scored_documents() {
        let server = MockServer::start().await;
        mount_cluster_info(&server).await;

        Mock::given(method("POST"))
            .and(path("/langchain_index/_search"))
            .and(body_partial_json(json!({
                "knn": {"field": "vector", "k": 2, "num_candidates": 50},
                "size": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {
                    "hits": [
                        {
                            "_id": "a",
                            "_score": 0.9,
                            "_source": {"text": "first", "metadata": {"user_id": "u-1"}}
                        },
                        {
                            "_id": "b",
                            "_score": 0.5,
                            "_source": {"text": "second"}
                        }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let backend = ElasticBackend::connect(&api_key_config(&server.uri()))
            .await
            .unwrap();
        let docs = backend
            .similarity_search(vec![0.1, 0.2], &SearchKwargs::new().with_k(2))
            .await
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].document.id.as_deref(), Some("a"));
        assert_eq!(docs[0].document.page_content, "first");
        assert_eq!(docs[0].document.metadata["user_id"], json!("u-1"));
        assert_eq!(docs[0].score, Some(0.9));
        assert!(docs[1].document.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let server = MockServer::start().await;
        mount_cluster_info(&server).await;
        Mock::given(method("POST"))
            .and(path("/langchain_index/_search"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = ElasticBackend::connect(&api_key_config(&server.uri()))
            .await
            .unwrap();
        let err = backend
            .similarity_search(vec![0.1], &SearchKwargs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::CollectionNotFound(_)));
    }

    #[test]
    fn test_object_filter_is_wrapped() {
        let backend = ElasticBackend {
            client: Client::new(),
            base_url: "http://localhost:9200".into(),
            config: api_key_config("http://localhost:9200"),
        };
        let mut filter = Map::new();
        filter.insert("term".into(), json!({"metadata.user_id": "u-1"}));

        let body = backend.search_body(vec![0.0], &SearchKwargs::new().with_filter(filter));
        assert_eq!(
            body["knn"]["filter"],
            json!([{"term": {"metadata.user_id": "u-1"}}])
        );
    }
}
