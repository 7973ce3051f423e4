//! Response cache
//!
//! Cache hits skip generation, cost and quota but never the rate limiter.

use crate::config::CacheConfig;
use crate::core::router::GenerationRequest;
use crate::core::types::Recipe;
use async_trait::async_trait;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// Key-value cache for generated recipes
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Recipe>;

    async fn set(&self, key: &str, value: Recipe, ttl: Duration);

    /// Number of live entries
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stable key over feature, prompt and constraints
pub fn cache_key(request: &GenerationRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.feature.as_bytes());
    hasher.update([0u8]);
    hasher.update(request.prompt.trim().to_lowercase().as_bytes());
    for (key, value) in &request.constraints {
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.as_bytes());
    }
    format!("recipe:{}", hex::encode(hasher.finalize()))
}

#[derive(Debug, Clone)]
struct CachedRecipe {
    recipe: Recipe,
    expires_at: Instant,
}

/// In-process cache backed by moka
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, CachedRecipe>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl MemoryCache {
    /// Capacity and upper-bound TTL come from config; `set` may shorten the TTL
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl())
            .build();
        Self { inner }
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Recipe> {
        let cached = self.inner.get(key).await?;
        if cached.expires_at <= Instant::now() {
            self.inner.invalidate(key).await;
            return None;
        }
        Some(cached.recipe)
    }

    async fn set(&self, key: &str, value: Recipe, ttl: Duration) {
        let entry = CachedRecipe {
            recipe: value,
            expires_at: Instant::now() + ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
    }

    fn len(&self) -> u64 {
        self.inner.entry_count()
    }
}
