//! Retriever factory.

use std::future::Future;
use std::sync::Arc;

use ragkit_core::{Environment, Error, Result};
use ragkit_rig::embedding::make_text_encoder;
use ragkit_vector::{
    ElasticConfig, MongoConfig, PgVectorConfig, PineconeConfig, VectorStore, VectorStoreConfig,
    VectorStoreRetriever,
};

use crate::TRACING_TARGET;
use crate::configuration::{Configuration, RetrieverProvider};

type Resolver = fn(&Environment) -> Result<VectorStoreConfig>;

/// Settings resolvers keyed by provider.
const RESOLVERS: &[(RetrieverProvider, Resolver)] = &[
    (RetrieverProvider::Elastic, resolve_elastic),
    (RetrieverProvider::ElasticLocal, resolve_elastic_local),
    (RetrieverProvider::Pinecone, resolve_pinecone),
    (RetrieverProvider::MongoDb, resolve_mongodb),
    (RetrieverProvider::PgVector, resolve_pgvector),
];

fn resolve_elastic(env: &Environment) -> Result<VectorStoreConfig> {
    ElasticConfig::from_env_api_key(env).map(Into::into)
}

fn resolve_elastic_local(env: &Environment) -> Result<VectorStoreConfig> {
    ElasticConfig::from_env_basic(env).map(Into::into)
}

fn resolve_pinecone(env: &Environment) -> Result<VectorStoreConfig> {
    PineconeConfig::from_env(env).map(Into::into)
}

fn resolve_mongodb(env: &Environment) -> Result<VectorStoreConfig> {
    MongoConfig::from_env(env).map(Into::into)
}

fn resolve_pgvector(env: &Environment) -> Result<VectorStoreConfig> {
    PgVectorConfig::from_env(env).map(Into::into)
}

/// Resolves backend settings for `provider` from `env`.
///
/// Pure: no connection is attempted.
///
/// # Errors
///
/// Returns a configuration error naming the first missing variable.
pub fn resolve_backend(provider: RetrieverProvider, env: &Environment) -> Result<VectorStoreConfig> {
    let resolver = RESOLVERS
        .iter()
        .find_map(|(candidate, resolver)| (*candidate == provider).then_some(*resolver))
        .ok_or_else(|| {
            Error::configuration()
                .with_message(format!("no settings resolver for retriever_provider `{provider}`"))
        })?;
    resolver(env)
}

/// Creates a retriever for `config`.
///
/// The embedding client and backend settings are resolved before any
/// connection is made, so a missing variable never leaves a half-open
/// backend behind. The returned guard owns the connection until
/// [`RetrieverGuard::release`] is awaited.
///
/// # Errors
///
/// Returns a configuration error for missing settings or an unsupported
/// embedding provider, and a backend error when the store is unreachable.
pub async fn make_retriever(config: &Configuration, env: &Environment) -> Result<RetrieverGuard> {
    let embedder = make_text_encoder(&config.embedding_model, env)?;
    let backend = resolve_backend(config.retriever_provider, env)?;

    tracing::debug!(
        target: TRACING_TARGET,
        provider = %config.retriever_provider,
        embedding_model = %config.embedding_model,
        "Connecting retriever"
    );

    let store = VectorStore::connect(backend).await?;
    let retriever =
        VectorStoreRetriever::new(store, Arc::new(embedder), config.search_kwargs.clone());

    tracing::info!(
        target: TRACING_TARGET,
        provider = %config.retriever_provider,
        "Retriever ready"
    );

    Ok(RetrieverGuard::new(retriever))
}

/// Creates a retriever, runs `f` with it and releases the backend.
///
/// The backend is released whether `f` succeeds or fails. An error from
/// `f` takes precedence over a release error.
pub async fn with_retriever<F, Fut, T>(
    config: &Configuration,
    env: &Environment,
    f: F,
) -> Result<T>
where
    F: FnOnce(VectorStoreRetriever) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    make_retriever(config, env).await?.scope(f).await
}

/// Owns a connected retriever until it is released.
///
/// Dropping the guard without [`release`](Self::release) still drops the
/// connection, but skips the orderly shutdown and logs a warning.
pub struct RetrieverGuard {
    retriever: VectorStoreRetriever,
    released: bool,
}

impl RetrieverGuard {
    /// Wraps a connected retriever.
    pub fn new(retriever: VectorStoreRetriever) -> Self {
        Self {
            retriever,
            released: false,
        }
    }

    /// Returns the retriever.
    pub fn retriever(&self) -> &VectorStoreRetriever {
        &self.retriever
    }

    /// Closes the backend connection.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;

        tracing::debug!(
            target: TRACING_TARGET,
            backend = %self.retriever.backend_name(),
            "Releasing retriever"
        );
        self.retriever.close().await
    }

    /// Runs `f` with the retriever, then releases it.
    pub async fn scope<F, Fut, T>(self, f: F) -> Result<T>
    where
        F: FnOnce(VectorStoreRetriever) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let outcome = f(self.retriever.clone()).await;
        let released = self.release().await;

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %release_err,
                    "Failed to release retriever after error"
                );
                Err(err)
            }
        }
    }
}

impl Drop for RetrieverGuard {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                target: TRACING_TARGET,
                backend = %self.retriever.backend_name(),
                "Retriever dropped without release"
            );
        }
    }
}

impl std::fmt::Debug for RetrieverGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrieverGuard")
            .field("retriever", &self.retriever)
            .field("released", &self.released)
            .finish()
    }
}
