//! MongoDB Atlas vector search backend.

mod backend;
mod config;

pub use backend::MongoBackend;
pub use config::{DEFAULT_NAMESPACE, MONGODB_URI, MongoConfig};
