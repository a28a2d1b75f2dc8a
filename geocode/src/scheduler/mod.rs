//! The geocoder: resolution entry point, request queue and admission control.
//!
//! Lookups go through the sources in priority order: overrides, the init
//! snapshot, then the geocode cache. A miss becomes a queue item; the
//! admission controller starts it once a slot is free, the rate gate spaces
//! it from the previous dispatch, and the network adapter resolves it. Every
//! queued item is completed exactly once, and every completion frees its slot
//! and drains the queue again, even when the dispatch panics.
//!
//! Dispatches run as Tokio tasks, so [`Geocoder::resolve`] must be called from
//! within a Tokio runtime.

mod admission;
mod queue;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::cache::GeocodeCache;
use crate::coordinate::Coordinate;
use crate::error::GeocodeError;
use crate::provider::{self, HttpClient, ReqwestHttpClient};
use crate::query::{normalize, Query};
use crate::settings::Settings;
use crate::sources::{InitCache, OverrideStore};

use admission::{lock, AdmissionController, RateGate, Slot};
use queue::QueueItem;

/// Point-in-time view of scheduler load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub queued: usize,
    pub in_flight: usize,
    pub cache_size: usize,
}

/// Result of [`Geocoder::resolve`]: ready at once for a source hit, otherwise
/// completed when the queued request finishes. `None` means the address could
/// not be resolved (empty result, transport error, or the scheduler was reset).
#[must_use = "a Resolution does nothing unless awaited"]
pub struct Resolution {
    state: ResolutionState,
}

enum ResolutionState {
    Ready(Option<Coordinate>),
    Pending(oneshot::Receiver<Option<Coordinate>>),
    Done,
}

impl Resolution {
    fn ready(coordinate: Coordinate) -> Self {
        Self {
            state: ResolutionState::Ready(Some(coordinate)),
        }
    }

    fn pending(rx: oneshot::Receiver<Option<Coordinate>>) -> Self {
        Self {
            state: ResolutionState::Pending(rx),
        }
    }

    /// True when the address was served without queueing.
    pub fn is_immediate(&self) -> bool {
        matches!(self.state, ResolutionState::Ready(_))
    }
}

impl Future for Resolution {
    type Output = Option<Coordinate>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let out = match &mut this.state {
            ResolutionState::Ready(c) => c.take(),
            ResolutionState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(r) => r.ok().flatten(),
                Poll::Pending => return Poll::Pending,
            },
            ResolutionState::Done => None,
        };
        this.state = ResolutionState::Done;
        Poll::Ready(out)
    }
}

struct Inner {
    settings: Settings,
    client: Arc<dyn HttpClient>,
    overrides: RwLock<OverrideStore>,
    init_cache: RwLock<InitCache>,
    cache: Mutex<GeocodeCache>,
    admission: AdmissionController,
    gate: RateGate,
}

/// Request scheduler with an integrated cache. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Geocoder {
    inner: Arc<Inner>,
}

impl Geocoder {
    /// Geocoder talking to the configured provider over reqwest.
    pub fn new(settings: Settings) -> Result<Self, GeocodeError> {
        let client = ReqwestHttpClient::new(settings.timeout())?;
        Ok(Self::with_client(settings, Arc::new(client)))
    }

    /// Geocoder with a custom HTTP client.
    pub fn with_client(settings: Settings, client: Arc<dyn HttpClient>) -> Self {
        let inner = Inner {
            cache: Mutex::new(GeocodeCache::new(
                settings.max_cache_size,
                settings.max_cache_overflow,
            )),
            admission: AdmissionController::new(settings.max_concurrent_requests),
            gate: RateGate::new(settings.min_request_interval()),
            overrides: RwLock::new(OverrideStore::new()),
            init_cache: RwLock::new(InitCache::new()),
            client,
            settings,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Looks `address` up in the overrides, the init snapshot and the geocode
    /// cache, in that order, without touching the network. A geocode cache hit
    /// is counted.
    pub fn resolve_sync(&self, address: &str) -> Option<Coordinate> {
        self.lookup(address)
    }

    /// Resolves `address`, queueing a network lookup on a miss.
    ///
    /// Hits are stamped with `address` and returned ready. A miss is enqueued
    /// before this returns; the returned future completes once that request has
    /// run. Dropping the future does not cancel the request.
    pub fn resolve(&self, address: &str) -> Resolution {
        if let Some(c) = self.lookup(address) {
            tracing::debug!(address, "resolved without network");
            return Resolution::ready(c.stamped(address));
        }
        let (item, rx) = QueueItem::new(Query::new(address));
        self.inner.admission.enqueue(item);
        tracing::debug!(address, queued = self.inner.admission.queued(), "geocode enqueued");
        self.drain();
        Resolution::pending(rx)
    }

    /// Callback form of [`Geocoder::resolve`]: `then` runs exactly once on a
    /// spawned task, with `None` on failure.
    pub fn resolve_then<F>(&self, address: &str, then: F)
    where
        F: FnOnce(Option<Coordinate>) + Send + 'static,
    {
        let resolution = self.resolve(address);
        tokio::spawn(async move {
            then(resolution.await);
        });
    }

    pub fn latitude(&self, address: &str) -> Option<f64> {
        self.resolve_sync(address).map(|c| c.latitude)
    }

    pub fn longitude(&self, address: &str) -> Option<f64> {
        self.resolve_sync(address).map(|c| c.longitude)
    }

    /// Merges (or, with `replace_all`, replaces) the override store. In merge
    /// mode a `None` value deletes that key.
    pub fn inject_overrides(
        &self,
        overrides: HashMap<String, Option<Coordinate>>,
        replace_all: bool,
    ) {
        write(&self.inner.overrides).inject(overrides, replace_all);
    }

    /// Removes overrides whose coordinate matches `predicate`; returns the count.
    pub fn remove_overrides<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&Coordinate) -> bool,
    {
        write(&self.inner.overrides).remove(predicate)
    }

    /// Replaces the init snapshot.
    pub fn seed_init_cache(&self, entries: HashMap<String, Coordinate>) {
        write(&self.inner.init_cache).seed(entries);
    }

    pub fn cache_size(&self) -> usize {
        lock(&self.inner.cache).len()
    }

    /// Hit count of the geocode cache entry for `address`, if cached.
    pub fn cache_hits(&self, address: &str) -> Option<u64> {
        lock(&self.inner.cache)
            .peek(&normalize(address))
            .map(|e| e.hits)
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            queued: self.inner.admission.queued(),
            in_flight: self.inner.admission.in_flight(),
            cache_size: self.cache_size(),
        }
    }

    /// Clears the geocode cache, the queue and the admission state.
    ///
    /// Queued requests resolve to `None`. Requests already in flight still
    /// deliver their result but no longer write to the cache or hold a slot.
    /// Overrides and the init snapshot are host-owned and left alone.
    pub fn reset(&self) {
        self.inner.admission.reset();
        self.inner.gate.reset();
        lock(&self.inner.cache).clear();
        tracing::debug!("geocoder reset");
    }

    /// One provider round trip for `address`, bypassing sources, cache, queue
    /// and rate gate. Useful for diagnosing why an address does not resolve.
    pub async fn fetch(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let query = Query::new(address);
        self.fetch_query(&query)
            .await
            .map(|c| c.stamped(query.text()))
    }

    fn lookup(&self, address: &str) -> Option<Coordinate> {
        if let Some(c) = read(&self.inner.overrides).get(address) {
            return Some(c.clone());
        }
        if let Some(c) = read(&self.inner.init_cache).get(address) {
            return Some(c.clone());
        }
        lock(&self.inner.cache).lookup(&normalize(address))
    }

    fn drain(&self) {
        for (item, slot) in self.inner.admission.admit() {
            let geocoder = self.clone();
            tokio::spawn(async move {
                // The worker runs in its own task so a panic in it still frees
                // the slot; the dropped reply resolves its caller to `None`.
                let worker = geocoder.clone();
                let handle = tokio::spawn(async move { worker.dispatch(item, slot).await });
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "geocode dispatch task failed");
                }
                // Let the woken caller run before the next dispatch is started.
                tokio::task::yield_now().await;
                geocoder.inner.admission.release(slot);
                geocoder.drain();
            });
        }
    }

    async fn dispatch(&self, item: QueueItem, slot: Slot) {
        // Another request may have resolved the same key while this one waited.
        let cached = lock(&self.inner.cache).lookup(item.query.key());
        if let Some(c) = cached {
            tracing::debug!(address = item.query.text(), "resolved from cache at dispatch");
            let stamped = c.stamped(item.query.text());
            item.complete(Some(stamped));
            return;
        }
        self.inner.gate.wait().await;
        tracing::debug!(address = item.query.text(), "geocode dispatched");
        match self.fetch_query(&item.query).await {
            Ok(c) => {
                let c = c.stamped(item.query.text());
                if self.inner.admission.is_current(slot) {
                    lock(&self.inner.cache).insert(&item.query, c.clone());
                }
                item.complete(Some(c));
            }
            Err(e) => {
                tracing::warn!(address = item.query.text(), error = %e, "geocode failed");
                item.complete(None);
            }
        }
    }

    async fn fetch_query(&self, query: &Query) -> Result<Coordinate, GeocodeError> {
        let settings = &self.inner.settings;
        let request = provider::build_request(settings, query);
        let body = self.inner.client.get(&request).await?;
        provider::parse_response(settings.provider, &body)
    }
}

fn read<T>(l: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}
