//! Load tracking for an embedded page.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_timer::Delay;
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};

/// Where an embedded page is in its one-shot load.
///
/// Only `Loading` transitions; the other states are final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed(String),
    TimedOut,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }

    /// Applies `outcome`. Returns `false` if the state was already final.
    pub fn settle<T>(&mut self, outcome: &LoadOutcome<T>) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = match outcome {
            LoadOutcome::Loaded(_) => LoadState::Loaded,
            LoadOutcome::Failed(reason) => LoadState::Failed(reason.clone()),
            LoadOutcome::TimedOut(_) => LoadState::TimedOut,
        };
        true
    }
}

/// How a [`LoadFuture`] resolved.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Loaded(T),
    Failed(String),
    TimedOut(Duration),
}

pin_project! {
    /// Races a page load against a timeout.
    pub struct LoadFuture<F> {
        #[pin]
        load: F,
        #[pin]
        delay: Delay,
        timeout: Duration,
    }
}

impl<F> LoadFuture<F> {
    pub fn new(load: F, timeout: Duration) -> Self {
        Self {
            load,
            delay: Delay::new(timeout),
            timeout,
        }
    }
}

impl<F, T, E> Future for LoadFuture<F>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    type Output = LoadOutcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if let Poll::Ready(res) = this.load.poll(cx) {
            return Poll::Ready(match res {
                Ok(value) => LoadOutcome::Loaded(value),
                Err(err) => LoadOutcome::Failed(err.to_string()),
            });
        }
        if this.delay.poll(cx).is_ready() {
            return Poll::Ready(LoadOutcome::TimedOut(*this.timeout));
        }
        Poll::Pending
    }
}
