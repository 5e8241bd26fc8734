//! Recommendation engine: TTL cache in front of a [`RecommendationSource`]
//!
//! ## Cache lifecycle per request context
//!
//! ```text
//! Empty ──fetch──► Fetching ──ok──► Fresh ──ttl──► Stale ──fetch──► Fetching
//!                     │                                               │
//!                     └──error: serve stale or empty, cache nothing ◄─┘
//! ```
//!
//! Concurrent fetches for one context share a single request. `clear_cache`
//! bumps a generation counter so requests started before the clear cannot
//! repopulate the cache when they finish. Storing a result evicts expired
//! sets of other contexts.

use super::source::RecommendationSource;
use super::suggestions::{NumericSuggestion, TextSuggestion};
use super::types::{RecommendationSet, RequestContext};
use crate::config::RecommendationConfig;
use crate::record::EngineeringRecord;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type SharedFetch = Shared<BoxFuture<'static, Arc<RecommendationSet>>>;

/// Observable cache state for one request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Fetching,
    Fresh,
    Stale,
}

struct CacheEntry {
    set: Arc<RecommendationSet>,
    fetched_at: Instant,
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<RequestContext, CacheEntry>,
    in_flight: HashMap<RequestContext, InFlight>,
    generation: u64,
    next_fetch_id: u64,
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

enum FetchOutcome {
    Done(RecommendationSet),
    Failed(String),
    Cancelled,
}

/// Caching front end for suggestion lookups.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct RecommendationEngine {
    source: Arc<dyn RecommendationSource>,
    ttl: Duration,
    max_text_suggestions: usize,
    state: Arc<Mutex<CacheState>>,
    parent_token: CancellationToken,
    fetch_token: Mutex<CancellationToken>,
}

impl RecommendationEngine {
    pub fn new(source: Arc<dyn RecommendationSource>, config: &RecommendationConfig) -> Self {
        Self::with_cancellation(source, config, CancellationToken::new())
    }

    /// Engine whose fetches are also cancelled when `parent` is.
    pub fn with_cancellation(
        source: Arc<dyn RecommendationSource>,
        config: &RecommendationConfig,
        parent: CancellationToken,
    ) -> Self {
        let fetch_token = parent.child_token();
        Self {
            source,
            ttl: Duration::from_secs(config.ttl_secs),
            max_text_suggestions: config.max_text_suggestions,
            state: Arc::new(Mutex::new(CacheState::default())),
            parent_token: parent,
            fetch_token: Mutex::new(fetch_token),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Recommendations for `ctx`, from cache while fresh.
    ///
    /// Never fails: on a backend error the last cached set is served, or an
    /// empty set when nothing was ever fetched.
    pub async fn fetch(&self, ctx: &RequestContext) -> Arc<RecommendationSet> {
        self.fetch_inner(ctx, false).await
    }

    /// Bypass the TTL and fetch again. Joins a request already in flight.
    pub async fn force_refresh(&self, ctx: &RequestContext) -> Arc<RecommendationSet> {
        self.fetch_inner(ctx, true).await
    }

    async fn fetch_inner(&self, ctx: &RequestContext, force: bool) -> Arc<RecommendationSet> {
        let pending = {
            let mut state = lock(&self.state);

            if !force {
                if let Some(entry) = state.entries.get(ctx) {
                    if entry.fetched_at.elapsed() < self.ttl {
                        debug!(context = %ctx, "[Recommendations] Cache hit");
                        return Arc::clone(&entry.set);
                    }
                }
            }

            match state.in_flight.get(ctx) {
                Some(in_flight) => {
                    debug!(context = %ctx, "[Recommendations] Joining in-flight request");
                    in_flight.fetch.clone()
                }
                None => {
                    let id = state.next_fetch_id;
                    state.next_fetch_id += 1;
                    let fetch = self.spawn_fetch(ctx.clone(), id, state.generation);
                    state.in_flight.insert(
                        ctx.clone(),
                        InFlight {
                            id,
                            fetch: fetch.clone(),
                        },
                    );
                    fetch
                }
            }
        };

        pending.await
    }

    fn spawn_fetch(&self, ctx: RequestContext, id: u64, generation: u64) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let token = self.current_token();
        let ttl = self.ttl;

        async move {
            debug!(context = %ctx, source = source.source_name(), "[Recommendations] Fetching");
            let outcome = tokio::select! {
                _ = token.cancelled() => FetchOutcome::Cancelled,
                result = source.fetch_recommendations(&ctx) => match result {
                    Ok(set) => FetchOutcome::Done(set),
                    Err(e) => FetchOutcome::Failed(e.to_string()),
                },
            };
            complete(&state, &ctx, id, generation, ttl, outcome)
        }
        .boxed()
        .shared()
    }

    fn current_token(&self) -> CancellationToken {
        self.fetch_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last set fetched for `ctx`, fresh or stale.
    pub fn cached(&self, ctx: &RequestContext) -> Option<Arc<RecommendationSet>> {
        lock(&self.state)
            .entries
            .get(ctx)
            .map(|entry| Arc::clone(&entry.set))
    }

    pub fn status(&self, ctx: &RequestContext) -> CacheStatus {
        let state = lock(&self.state);
        if state.in_flight.contains_key(ctx) {
            return CacheStatus::Fetching;
        }
        match state.entries.get(ctx) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => CacheStatus::Fresh,
            Some(_) => CacheStatus::Stale,
            None => CacheStatus::Empty,
        }
    }

    /// Drop every cached set. Requests already in flight still resolve for
    /// their callers but are not written back.
    pub fn clear_cache(&self) {
        let mut state = lock(&self.state);
        let dropped = state.entries.len();
        state.entries.clear();
        state.in_flight.clear();
        state.generation += 1;
        info!(dropped, "[Recommendations] Cache cleared");
    }

    /// Abandon outstanding requests. Their callers receive the stale or
    /// empty fallback; later fetches proceed normally.
    pub fn cancel_in_flight(&self) {
        let old = {
            let mut token = self
                .fetch_token
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *token, self.parent_token.child_token())
        };
        old.cancel();
        let abandoned = {
            let mut state = lock(&self.state);
            let n = state.in_flight.len();
            state.in_flight.clear();
            n
        };
        if abandoned > 0 {
            info!(abandoned, "[Recommendations] Cancelled in-flight requests");
        }
    }

    // ========================================================================
    // Suggestion lookups against the cached set (stale is acceptable)
    // ========================================================================

    pub fn text_suggestions(&self, ctx: &RequestContext, field: &str) -> Vec<TextSuggestion> {
        self.cached(ctx)
            .map(|set| set.text_suggestions(field, self.max_text_suggestions))
            .unwrap_or_default()
    }

    pub fn numeric_suggestion(
        &self,
        ctx: &RequestContext,
        field: &str,
    ) -> Option<NumericSuggestion> {
        self.cached(ctx)?.numeric_suggestion(field)
    }

    pub fn motor_efficiency_suggestion(
        &self,
        ctx: &RequestContext,
        classification: &str,
    ) -> Option<f64> {
        self.cached(ctx)?.motor_efficiency_suggestion(classification)
    }

    pub fn auto_fill(
        &self,
        ctx: &RequestContext,
        fields: &[&str],
        record: &EngineeringRecord,
    ) -> EngineeringRecord {
        self.cached(ctx)
            .map(|set| set.auto_fill(fields, record))
            .unwrap_or_default()
    }
}

/// Resolve a finished request: store on success, fall back otherwise.
fn complete(
    state: &Mutex<CacheState>,
    ctx: &RequestContext,
    id: u64,
    generation: u64,
    ttl: Duration,
    outcome: FetchOutcome,
) -> Arc<RecommendationSet> {
    let mut state = lock(state);
    if state.in_flight.get(ctx).is_some_and(|f| f.id == id) {
        state.in_flight.remove(ctx);
    }

    match outcome {
        FetchOutcome::Done(set) => {
            let set = Arc::new(set);
            if state.generation == generation {
                info!(
                    context = %ctx,
                    records = set.context.total_records_analyzed,
                    "[Recommendations] Fetched"
                );
                let before = state.entries.len();
                state
                    .entries
                    .retain(|key, entry| key == ctx || entry.fetched_at.elapsed() < ttl);
                let evicted = before - state.entries.len();
                if evicted > 0 {
                    debug!(evicted, "[Recommendations] Evicted expired sets");
                }
                state.entries.insert(
                    ctx.clone(),
                    CacheEntry {
                        set: Arc::clone(&set),
                        fetched_at: Instant::now(),
                    },
                );
            } else {
                debug!(
                    context = %ctx,
                    "[Recommendations] Discarding result fetched before cache clear"
                );
            }
            set
        }
        FetchOutcome::Failed(error) => {
            warn!(
                context = %ctx,
                error = %error,
                "[Recommendations] Fetch failed, serving fallback"
            );
            fallback(&state, ctx)
        }
        FetchOutcome::Cancelled => {
            debug!(context = %ctx, "[Recommendations] Fetch cancelled");
            fallback(&state, ctx)
        }
    }
}

fn fallback(state: &CacheState, ctx: &RequestContext) -> Arc<RecommendationSet> {
    state
        .entries
        .get(ctx)
        .map(|entry| Arc::clone(&entry.set))
        .unwrap_or_else(|| Arc::new(RecommendationSet::empty()))
}
