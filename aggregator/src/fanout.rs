//! Bounded concurrent fetch over independent keys.
//!
//! One fan-out issues `fetch_one(key)` for every key under a shared
//! semaphore, so at most [`FanOutOptions::concurrency`] requests are in
//! flight at once. A failing key is logged and contributes an empty
//! sub-list; it never aborts its siblings and never reaches the caller.
//! Results are slotted by key index and flattened in key order, so the
//! output is deterministic for identical inputs regardless of completion
//! order. Cancelling the token abandons the whole aggregate with
//! [`AggregateError::Cancelled`] instead of committing partial state.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;

use client::{ApiError, ApiResult};
use common::config;

use crate::error::{AggregateError, AggregateResult};

#[derive(Clone, Debug)]
pub struct FanOutOptions {
    /// Max concurrent backend requests per fan-out.
    pub concurrency: usize,
}

impl Default for FanOutOptions {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

impl FanOutOptions {
    /// Cap from the global configuration (`FAN_OUT_CONCURRENCY`).
    pub fn from_config() -> Self {
        Self {
            concurrency: config::fan_out_concurrency(),
        }
    }
}

/// Outcome of one spawned branch.
enum Branch<T> {
    Done { slot: usize, items: Vec<T> },
    Failed { slot: usize, err: ApiError },
    Cancelled,
}

/// Fetches every key's sub-list concurrently and flattens the results in
/// key order.
///
/// `fetch_one` is called once per key up front; the returned futures only
/// run once a semaphore permit is held. A cap of 1 degrades to sequential
/// execution with identical results.
pub async fn fan_out<K, T, F, Fut>(
    keys: Vec<K>,
    opts: &FanOutOptions,
    cancel: &CancellationToken,
    fetch_one: F,
) -> AggregateResult<Vec<T>>
where
    T: Send + 'static,
    F: Fn(K) -> Fut,
    Fut: std::future::Future<Output = ApiResult<Vec<T>>> + Send + 'static,
{
    let total = keys.len();
    let cap = opts.concurrency.max(1);
    let sem = Arc::new(tokio::sync::Semaphore::new(cap));
    let mut futs = FuturesUnordered::new();

    for (slot, key) in keys.into_iter().enumerate() {
        let sem = Arc::clone(&sem);
        let token = cancel.clone();
        let fut = fetch_one(key);

        futs.push(tokio::spawn(async move {
            let _permit = tokio::select! {
                permit = sem.acquire() => permit.unwrap(),
                () = token.cancelled() => return Branch::Cancelled,
            };
            tokio::select! {
                res = fut => match res {
                    Ok(items) => Branch::Done { slot, items },
                    Err(err) => Branch::Failed { slot, err },
                },
                () = token.cancelled() => Branch::Cancelled,
            }
        }));
    }

    let mut slots: Vec<Vec<T>> = Vec::new();
    slots.resize_with(total, Vec::new);
    let mut cancelled = false;

    while let Some(joined) = futs.next().await {
        match joined {
            Ok(Branch::Done { slot, items }) => slots[slot] = items,
            Ok(Branch::Failed { slot, err }) => {
                tracing::warn!(slot, error = %err, "fan-out branch failed; contributing no rows");
            }
            Ok(Branch::Cancelled) => cancelled = true,
            Err(err) => {
                tracing::warn!(error = %err, "fan-out branch aborted");
            }
        }
    }

    if cancelled || cancel.is_cancelled() {
        return Err(AggregateError::Cancelled);
    }

    Ok(slots.into_iter().flatten().collect())
}
