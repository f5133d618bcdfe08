//! Batched mutation with fixed pacing and per-item failure capture.
//!
//! Items are split into consecutive groups of `batch_size`. Every item of a
//! group is dispatched at once and the group is awaited as a whole; between
//! groups the mutator sleeps for `delay`. The delay is unconditional and
//! exists only to stay under the platform's request-rate ceiling.
//!
//! An item's error never aborts the batch. It is recorded in that item's
//! [`BatchResult`], so a report always holds exactly one result per input,
//! in input order.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

/// Grouping and pacing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Items dispatched together. Zero is treated as one.
    pub batch_size: usize,
    /// Pause between consecutive groups.
    pub delay: Duration,
}

impl BatchOptions {
    /// Policy for product mutations.
    pub const PRODUCTS: Self = Self::new(10, Duration::from_millis(1000));

    /// Policy for inventory adjustments.
    pub const INVENTORY: Self = Self::new(5, Duration::from_millis(2000));

    #[must_use]
    pub const fn new(batch_size: usize, delay: Duration) -> Self {
        Self { batch_size, delay }
    }

    const fn group_size(&self) -> usize {
        if self.batch_size == 0 { 1 } else { self.batch_size }
    }
}

/// An input to the mutator, identified by the record it targets.
pub trait BatchItem {
    /// ID of the record the mutation applies to.
    fn target_id(&self) -> &str;
}

/// Outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult<R> {
    pub target_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated outcome of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport<R> {
    pub results: Vec<BatchResult<R>>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl<R> BatchReport<R> {
    /// Results of the items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchResult<R>> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Whether every item succeeded.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }

    /// Number of items processed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Run `operation` over `items` in paced groups.
///
/// Items of a group run concurrently on the current task; the next group
/// starts only after every member of the current one has settled and the
/// delay has elapsed. No delay follows the last group.
pub async fn run_batch<T, R, E, F, Fut>(
    items: Vec<T>,
    options: BatchOptions,
    operation: F,
) -> BatchReport<R>
where
    T: BatchItem,
    E: Display,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let total = items.len();
    let group_size = options.group_size();
    let group_count = total.div_ceil(group_size);

    let mut results = Vec::with_capacity(total);
    let mut items = items.into_iter().peekable();
    let mut group_index = 0usize;

    while items.peek().is_some() {
        if group_index > 0 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        let group: Vec<T> = items.by_ref().take(group_size).collect();
        tracing::debug!(
            group = group_index + 1,
            groups = group_count,
            size = group.len(),
            "Dispatching batch group"
        );

        let settled = join_all(group.into_iter().map(|item| {
            let target_id = item.target_id().to_owned();
            let pending = operation(item);
            async move { (target_id, pending.await) }
        }))
        .await;

        for (target_id, outcome) in settled {
            results.push(match outcome {
                Ok(value) => BatchResult {
                    target_id,
                    success: true,
                    result: Some(value),
                    error: None,
                },
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(target_id = %target_id, error = %message, "Batch item failed");
                    BatchResult {
                        target_id,
                        success: false,
                        result: None,
                        error: Some(message),
                    }
                }
            });
        }

        group_index += 1;
    }

    let success_count = results.iter().filter(|r| r.success).count();
    let failure_count = results.len() - success_count;
    tracing::info!(
        total,
        groups = group_index,
        success_count,
        failure_count,
        "Batch complete"
    );

    BatchReport {
        results,
        success_count,
        failure_count,
    }
}
