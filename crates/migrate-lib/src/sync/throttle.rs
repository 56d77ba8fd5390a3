//! Request throttle
//!
//! Admits calls no faster than a fixed ceiling per rolling window. Admission
//! goes through a `tokio::sync::Mutex`, which grants the lock in FIFO order,
//! so waiting callers are released in the order they arrived. Completion order
//! is up to the network.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Rate-limited admission shared by every request of a client
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: usize,
    window: Duration,
    /// Dispatch instants still inside the window, oldest first
    dispatched: Arc<Mutex<VecDeque<Instant>>>,
}

impl Throttle {
    /// Allow `requests_per_second` dispatches in any one-second window
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second as usize, Duration::from_secs(1))
    }

    /// Allow `limit` dispatches in any `window`
    pub fn new(limit: usize, window: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            window,
            dispatched: Arc::new(Mutex::new(VecDeque::with_capacity(limit))),
        }
    }

    /// Dispatches allowed per window
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Length of the rolling window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait for a dispatch slot; returns how long the caller was queued
    pub async fn acquire(&self) -> Duration {
        let queued_at = Instant::now();
        let mut dispatched = self.dispatched.lock().await;

        loop {
            let now = Instant::now();
            while dispatched
                .front()
                .is_some_and(|&at| now.duration_since(at) >= self.window)
            {
                dispatched.pop_front();
            }

            if dispatched.len() < self.limit {
                dispatched.push_back(now);
                return now.duration_since(queued_at);
            }

            // Holding the lock while sleeping keeps later arrivals behind us.
            if let Some(&oldest) = dispatched.front() {
                tokio::time::sleep_until(oldest + self.window).await;
            }
        }
    }

    /// Run `call` once a slot is free; its output is returned untouched
    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire().await;
        call().await
    }
}
