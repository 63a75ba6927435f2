//! Coalesces campaign requests into batched upstream calls.
//!
//! Requests arriving within `batch_delay` of the first queued request share a
//! flush. A flush partitions its requests by [`GroupKey`] and issues one
//! upstream call per group, all groups concurrently. Each caller receives only
//! its own placement's payload; a failed group fails all of its members and
//! nobody else.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::{CampaignError, RecommendationError};
use crate::service::RecommendationService;
use crate::types::{CampaignRequest, GroupKey, RecommendationBatch};

pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(50);

type Completion = oneshot::Sender<Result<Option<Value>, CampaignError>>;

struct Pending {
    request: CampaignRequest,
    completion: Completion,
}

#[derive(Default)]
struct Queue {
    pending: Vec<Pending>,
    flush_scheduled: bool,
}

struct Inner<S> {
    service: S,
    batch_delay: Duration,
    queue: Mutex<Queue>,
}

/// Shared handle to one request queue. Clones feed the same queue.
pub struct CampaignOrchestrator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for CampaignOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> CampaignOrchestrator<S>
where
    S: RecommendationService + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(service: S) -> Self {
        Self::with_batch_delay(service, DEFAULT_BATCH_DELAY)
    }

    #[must_use]
    pub fn with_batch_delay(service: S, batch_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                batch_delay,
                queue: Mutex::new(Queue::default()),
            }),
        }
    }

    #[must_use]
    pub fn service(&self) -> &S {
        &self.inner.service
    }

    /// Queues `request` and returns a future for its placement's payload.
    ///
    /// The request is queued immediately, before the returned future is
    /// polled, and settles even if the future is dropped unpolled. Resolves to
    /// `None` when the upstream response has no entry for the placement.
    ///
    /// The flush timer runs on the runtime current at the call.
    ///
    /// # Errors
    ///
    /// The future yields [`CampaignError::Upstream`] when the group's upstream
    /// call fails, [`CampaignError::Abandoned`] if the flush was dropped before
    /// settling it (e.g. runtime shutdown), or [`CampaignError::NoRuntime`] when
    /// called outside a tokio runtime.
    pub fn add_request(
        &self,
        request: CampaignRequest,
    ) -> impl Future<Output = Result<Option<Value>, CampaignError>> + Send + 'static {
        let (completion, settled) = oneshot::channel();

        if let Ok(runtime) = Handle::try_current() {
            self.enqueue(request, completion, &runtime);
        } else {
            tracing::warn!(
                placement = %request.placement,
                "campaign request made outside a tokio runtime"
            );
            settle_now(completion, &request, Err(CampaignError::NoRuntime));
        }

        async move { settled.await.unwrap_or(Err(CampaignError::Abandoned)) }
    }

    fn enqueue(&self, request: CampaignRequest, completion: Completion, runtime: &Handle) {
        let schedule = {
            let mut queue = self.inner.queue.lock();
            queue.pending.push(Pending {
                request,
                completion,
            });
            !std::mem::replace(&mut queue.flush_scheduled, true)
        };

        if schedule {
            let mut guard = FlushGuard {
                inner: Arc::clone(&self.inner),
                armed: true,
            };
            runtime.spawn(async move {
                tokio::time::sleep(guard.inner.batch_delay).await;
                guard.armed = false;
                guard.inner.flush().await;
            });
        }
    }
}

/// Owned by the scheduled flush task. Dropping it while still armed means the
/// task died before flushing, so the queued requests are abandoned and the
/// next request schedules a fresh timer.
struct FlushGuard<S> {
    inner: Arc<Inner<S>>,
    armed: bool,
}

impl<S> Drop for FlushGuard<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let abandoned = {
            let mut queue = self.inner.queue.lock();
            queue.flush_scheduled = false;
            std::mem::take(&mut queue.pending)
        };
        if !abandoned.is_empty() {
            tracing::warn!(
                requests = abandoned.len(),
                "campaign flush dropped before running; abandoning queued requests"
            );
        }
    }
}

impl<S> Inner<S>
where
    S: RecommendationService + Send + Sync + 'static,
{
    async fn flush(&self) {
        let pending = {
            let mut queue = self.queue.lock();
            queue.flush_scheduled = false;
            std::mem::take(&mut queue.pending)
        };

        let groups = partition(pending, |p| p.request.group_key());
        tracing::debug!(groups = groups.len(), "flushing campaign requests");

        join_all(
            groups
                .into_iter()
                .map(|(key, members)| self.dispatch(key, members)),
        )
        .await;
    }

    async fn dispatch(&self, key: GroupKey, members: Vec<Pending>) {
        let mut batch = RecommendationBatch::new(key.response_mode)
            .with_elements(members.iter().map(|m| m.request.placement.clone()));
        if let Some(product_id) = &key.product_id {
            batch = batch.with_product(product_id.clone(), key.variant_id.clone());
        }

        match self.service.load(batch).await {
            Ok(response) => {
                for member in members {
                    let payload = response
                        .recommendations
                        .get(&member.request.placement)
                        .cloned();
                    settle(member, Ok(payload));
                }
            }
            Err(err) => {
                tracing::warn!(
                    response_mode = %key.response_mode,
                    product_id = ?key.product_id,
                    members = members.len(),
                    error = %err,
                    "campaign batch failed"
                );
                let shared: Arc<RecommendationError> = Arc::new(err);
                for member in members {
                    settle(member, Err(CampaignError::Upstream(Arc::clone(&shared))));
                }
            }
        }
    }
}

fn settle(member: Pending, outcome: Result<Option<Value>, CampaignError>) {
    settle_now(member.completion, &member.request, outcome);
}

fn settle_now(
    completion: Completion,
    request: &CampaignRequest,
    outcome: Result<Option<Value>, CampaignError>,
) {
    if completion.send(outcome).is_err() {
        tracing::trace!(
            placement = %request.placement,
            "campaign caller went away before its result arrived"
        );
    }
}

/// Splits `items` into groups of equal key, in order of each key's first appearance.
fn partition<T, F>(items: Vec<T>, key_of: F) -> Vec<(GroupKey, Vec<T>)>
where
    F: Fn(&T) -> GroupKey,
{
    let mut groups: Vec<(GroupKey, Vec<T>)> = Vec::new();
    for item in items {
        let key = key_of(&item);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
