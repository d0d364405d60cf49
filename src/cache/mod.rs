//! Cache
//!
//! Este módulo contiene los sistemas de cache. Las operaciones se exponen
//! detrás de un trait object-safe para poder sustituir Redis por una
//! implementación en memoria en los tests.

pub mod cache_config;
pub mod memory;
pub mod redis_client;

pub use cache_config::CacheConfig;

use anyhow::Result;

/// Operaciones de cache (payloads serializados como String)
#[async_trait::async_trait]
pub trait CacheOperations: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
}
