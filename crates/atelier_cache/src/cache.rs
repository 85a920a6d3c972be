//! Single-flight rendition cache.

use crate::lru::LruStore;
use crate::{Rendition, RenditionCacheConfig, RenditionKey, Transformer};
use atelier_core::{OutputFormat, TransformSpec, Version};
use atelier_error::{AtelierError, AtelierResult, TransformError, TransformErrorKind};
use atelier_storage::BlobStore;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};

type Derivation = BoxFuture<'static, AtelierResult<Rendition>>;

/// A running derivation, tagged so only its own cleanup can unregister it.
struct InFlight {
    generation: u64,
    derivation: WeakShared<Derivation>,
}

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Requests served from stored renditions
    pub hits: u64,
    /// Requests that joined a derivation already in progress
    pub joins: u64,
    /// Derivations started
    pub derivations: u64,
    /// Renditions evicted to stay within the byte budget
    pub evictions: u64,
    /// Renditions currently stored
    pub entries: usize,
    /// Bytes currently stored
    pub bytes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    joins: AtomicU64,
    derivations: AtomicU64,
    evictions: AtomicU64,
}

struct CacheInner {
    config: RenditionCacheConfig,
    blobs: Arc<dyn BlobStore>,
    transformer: Arc<dyn Transformer>,
    permits: Arc<Semaphore>,
    // Lock order: `in_flight` before `store`.
    in_flight: Mutex<HashMap<RenditionKey, InFlight>>,
    store: Mutex<LruStore>,
    counters: Counters,
}

/// Derives renditions on demand and caches them by [`RenditionKey`].
///
/// - Concurrent requests for one key share a single derivation; every caller
///   receives the same result.
/// - Derivations for different keys run in parallel, bounded by the
///   configured transform concurrency.
/// - Transient codec failures are retried with exponential backoff before the
///   error is reported.
/// - No lock is held while the codec runs.
/// - When every caller waiting on a derivation goes away, the derivation is
///   abandoned and nothing is cached for it.
///
/// # Example
///
/// ```rust,no_run
/// use atelier_cache::{ImageTransformer, RenditionCache, RenditionCacheConfig};
/// use atelier_core::{OutputFormat, TransformSpec, Version};
/// use atelier_storage::MemoryBlobStore;
/// use std::sync::Arc;
///
/// # async fn example(version: Version) -> Result<(), Box<dyn std::error::Error>> {
/// let cache = RenditionCache::new(
///     RenditionCacheConfig::default(),
///     Arc::new(MemoryBlobStore::new()),
///     Arc::new(ImageTransformer::new()),
/// );
/// let spec = TransformSpec::default().with_width(100).with_format(OutputFormat::Webp);
/// let rendition = cache.get_or_create(&version, &spec).await?;
/// println!("{} bytes of {}", rendition.len(), rendition.mimetype());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RenditionCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for RenditionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenditionCache")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pick the output format, rejecting sources the codec cannot read.
fn resolve_format(source: &Version, spec: &TransformSpec) -> Result<OutputFormat, TransformError> {
    let essence = source
        .mimetype
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !essence.starts_with("image/") {
        return Err(TransformError::new(TransformErrorKind::UnsupportedSource(
            format!("{} is not an image", source.mimetype),
        )));
    }
    match spec.format {
        Some(format) => Ok(format.canonical()),
        None => OutputFormat::from_mimetype(&essence).ok_or_else(|| {
            TransformError::new(TransformErrorKind::UnsupportedSource(format!(
                "{} has no matching output format; request one explicitly",
                source.mimetype
            )))
        }),
    }
}

impl RenditionCache {
    /// Create a cache reading sources from `blobs` and deriving with `transformer`.
    pub fn new(
        config: RenditionCacheConfig,
        blobs: Arc<dyn BlobStore>,
        transformer: Arc<dyn Transformer>,
    ) -> Self {
        tracing::debug!(
            byte_budget = config.byte_budget(),
            max_age_secs = config.max_age_secs(),
            max_concurrent_transforms = config.max_concurrent_transforms(),
            "Creating rendition cache"
        );
        let store = LruStore::new(*config.byte_budget(), config.max_age());
        let permits = Arc::new(Semaphore::new((*config.max_concurrent_transforms()).max(1)));
        Self {
            inner: Arc::new(CacheInner {
                config,
                blobs,
                transformer,
                permits,
                in_flight: Mutex::new(HashMap::new()),
                store: Mutex::new(store),
                counters: Counters::default(),
            }),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &RenditionCacheConfig {
        &self.inner.config
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let store = locked(&self.inner.store);
        let counters = &self.inner.counters;
        CacheStats {
            hits: counters.hits.load(Ordering::Relaxed),
            joins: counters.joins.load(Ordering::Relaxed),
            derivations: counters.derivations.load(Ordering::Relaxed),
            evictions: counters.evictions.load(Ordering::Relaxed),
            entries: store.len(),
            bytes: store.bytes(),
        }
    }

    /// Rendition of `source` under `spec`, deriving it if it is not cached.
    ///
    /// # Errors
    ///
    /// - Validation error for out-of-range parameters, before any work.
    /// - Transform error for a non-image source or when the codec rejects
    ///   the input (after retries for transient failures).
    /// - Not-found error if the source bytes are missing.
    #[tracing::instrument(skip(self, source, spec), fields(asset = %source.asset_id, version = source.number))]
    pub async fn get_or_create(
        &self,
        source: &Version,
        spec: &TransformSpec,
    ) -> AtelierResult<Rendition> {
        spec.validate()?;
        let format = resolve_format(source, spec)?;
        let key = RenditionKey::new(source.content_hash.clone(), spec, format);

        if let Some(hit) = locked(&self.inner.store).get(&key) {
            self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "Rendition cache hit");
            return Ok(hit);
        }

        self.derivation(key).await
    }

    /// Join the in-flight derivation for `key`, or start one.
    fn derivation(&self, key: RenditionKey) -> Shared<Derivation> {
        let mut in_flight = locked(&self.inner.in_flight);

        if let Some(running) = in_flight
            .get(&key)
            .and_then(|entry| entry.derivation.upgrade())
        {
            self.inner.counters.joins.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "Joined in-flight derivation");
            return running;
        }

        // A derivation may have finished since the caller's lookup.
        if let Some(hit) = locked(&self.inner.store).get(&key) {
            self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
            return futures::future::ready(Ok(hit)).boxed().shared();
        }

        let generation = self
            .inner
            .counters
            .derivations
            .fetch_add(1, Ordering::Relaxed);
        let derivation = derive(Arc::clone(&self.inner), key.clone(), generation)
            .boxed()
            .shared();
        if let Some(weak) = derivation.downgrade() {
            in_flight.insert(
                key,
                InFlight {
                    generation,
                    derivation: weak,
                },
            );
        }
        derivation
    }
}

impl CacheInner {
    /// Remove the in-flight entry for `key` if it still belongs to `generation`.
    fn unregister(
        in_flight: &mut HashMap<RenditionKey, InFlight>,
        key: &RenditionKey,
        generation: u64,
    ) {
        if in_flight
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
        {
            in_flight.remove(key);
        }
    }
}

/// Logs and unregisters a derivation dropped before completion.
struct AbandonGuard {
    inner: Arc<CacheInner>,
    key: RenditionKey,
    generation: u64,
    finished: bool,
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(key = %self.key, "Rendition derivation abandoned");
        let mut in_flight = locked(&self.inner.in_flight);
        CacheInner::unregister(&mut in_flight, &self.key, self.generation);
    }
}

async fn derive(
    inner: Arc<CacheInner>,
    key: RenditionKey,
    generation: u64,
) -> AtelierResult<Rendition> {
    let mut guard = AbandonGuard {
        inner: Arc::clone(&inner),
        key: key.clone(),
        generation,
        finished: false,
    };

    let result = run(&inner, &key).await;

    {
        let mut in_flight = locked(&inner.in_flight);
        if let Ok(rendition) = &result {
            let evicted = locked(&inner.store).insert(rendition.clone());
            inner
                .counters
                .evictions
                .fetch_add(evicted as u64, Ordering::Relaxed);
        }
        CacheInner::unregister(&mut in_flight, &key, generation);
    }
    guard.finished = true;

    match &result {
        Ok(rendition) => tracing::info!(
            key = %key,
            size = rendition.len(),
            hash = %rendition.content_hash(),
            "Derived rendition"
        ),
        Err(e) => tracing::warn!(key = %key, error = %e, "Rendition derivation failed"),
    }
    result
}

async fn run(inner: &Arc<CacheInner>, key: &RenditionKey) -> AtelierResult<Rendition> {
    let source: Arc<[u8]> = Arc::from(inner.blobs.get(key.source()).await?);

    let initial = *inner.config.retry_initial_backoff_ms();
    // Delays of 2^n * initial / 2 ms: initial, 2 * initial, 4 * initial, ...
    let strategy = ExponentialBackoff::from_millis(2)
        .factor((initial / 2).max(1))
        .max_delay(Duration::from_secs(30))
        .map(jitter)
        .take(*inner.config.transform_retries());

    let bytes = Retry::spawn(strategy, || {
        let inner = Arc::clone(inner);
        let source = Arc::clone(&source);
        let key = key.clone();
        async move {
            match transform_once(&inner, source, &key).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind.is_retryable() => {
                    tracing::warn!(key = %key, error = %e, "Transient transform failure, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        }
    })
    .await
    .map_err(AtelierError::from)?;

    Ok(Rendition::new(key.clone(), bytes))
}

/// One codec invocation on the blocking pool, holding a concurrency permit.
async fn transform_once(
    inner: &CacheInner,
    source: Arc<[u8]>,
    key: &RenditionKey,
) -> Result<Vec<u8>, TransformError> {
    let permit = Arc::clone(&inner.permits)
        .acquire_owned()
        .await
        .map_err(|e| TransformError::new(TransformErrorKind::Worker(e.to_string())))?;
    let transformer = Arc::clone(&inner.transformer);
    let spec = *key.spec();
    let format = key.format();

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        transformer.transform(&source, &spec, format)
    })
    .await
    .map_err(|e| TransformError::new(TransformErrorKind::Worker(e.to_string())))?
}
