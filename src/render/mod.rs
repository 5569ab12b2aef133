//! Rendering viewframes into embedded contexts.
//!
//! An [`Embedder`] knows how to bring a page up at a simulated viewport; the
//! [`Renderer`] composes the embedding for each frame, races its load against
//! the configured timeout and keeps the frame's scale factor. A context whose
//! load fails or times out is closed again.

use std::time::Instant;

use futures::future::join_all;

use crate::config::RendererConfig;
use crate::embed::Embedding;
use crate::error::{Result, ViewframeError};
use crate::frame::{FrameId, Viewframe, Viewframes};
use crate::js::ReportedViewport;
use crate::load::{LoadFuture, LoadOutcome, LoadState};
use crate::scale::ScaleToFit;
use crate::script::OverrideScript;
use crate::size::Size;

pub mod chrome;
pub mod simulated;

pub use chrome::{ChromeContext, ChromeEmbedder};
pub use simulated::{SimulatedContext, SimulatedEmbedder};

/// Creates embedded contexts.
#[allow(async_fn_in_trait)]
pub trait Embedder {
    type Context: EmbeddedContext;

    /// Opens a context for `embedding` with `script` installed to run at
    /// document start. The target page is not loaded yet, see
    /// [`EmbeddedContext::load`].
    async fn embed(&self, embedding: &Embedding, script: &OverrideScript) -> Result<Self::Context>;
}

/// An embedded page.
#[allow(async_fn_in_trait)]
pub trait EmbeddedContext: Sized {
    /// Navigates to the embedding URL and resolves once the page's load
    /// notification arrived.
    async fn load(&mut self) -> Result<()>;

    /// The sizes the page currently reports about itself.
    async fn reported_viewport(&self) -> Result<ReportedViewport>;

    /// Reverts the viewport override. Returns `false` if none was installed.
    async fn restore(&mut self) -> Result<bool>;

    async fn close(self) -> Result<()>;
}

pub struct Renderer<E> {
    embedder: E,
    config: RendererConfig,
}

impl<E: Embedder> Renderer<E> {
    pub fn new(embedder: E, config: RendererConfig) -> Self {
        Self { embedder, config }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn into_embedder(self) -> E {
        self.embedder
    }

    /// Embeds a single frame.
    ///
    /// Loading failures and timeouts are not errors here, they are recorded in
    /// the frame's [`LoadState`].
    pub async fn render(&self, frame: &Viewframe) -> RenderedFrame<E::Context> {
        let embedding = Embedding::new(&frame.link, frame.viewport, *self.config.sandbox());
        let script = OverrideScript::new(frame.viewport);
        let scale = ScaleToFit::new(frame.viewport, self.config.container());
        tracing::debug!(
            id = %frame.id,
            url = embedding.url(),
            scale = scale.scale(),
            "embedding viewframe"
        );

        let timeout = self.config.load_timeout();
        let started = Instant::now();
        let outcome = match LoadFuture::new(self.embedder.embed(&embedding, &script), timeout).await {
            LoadOutcome::Loaded(mut context) => {
                let remaining = timeout.saturating_sub(started.elapsed());
                let loaded = LoadFuture::new(context.load(), remaining).await;
                match loaded {
                    LoadOutcome::Loaded(()) => LoadOutcome::Loaded(context),
                    LoadOutcome::Failed(reason) => {
                        release(frame.id, context).await;
                        LoadOutcome::Failed(reason)
                    }
                    LoadOutcome::TimedOut(_) => {
                        release(frame.id, context).await;
                        LoadOutcome::TimedOut(timeout)
                    }
                }
            }
            LoadOutcome::Failed(reason) => LoadOutcome::Failed(reason),
            LoadOutcome::TimedOut(elapsed) => LoadOutcome::TimedOut(elapsed),
        };

        let mut state = LoadState::Loading;
        state.settle(&outcome);

        let context = match outcome {
            LoadOutcome::Loaded(context) => {
                tracing::info!(id = %frame.id, name = %frame.name, viewport = %frame.viewport, "viewframe loaded");
                Some(context)
            }
            LoadOutcome::Failed(reason) => {
                tracing::warn!(id = %frame.id, %reason, "viewframe failed to load");
                None
            }
            LoadOutcome::TimedOut(timeout) => {
                tracing::warn!(id = %frame.id, ?timeout, "viewframe load timed out");
                None
            }
        };

        RenderedFrame {
            frame: frame.clone(),
            embedding,
            scale,
            state,
            context,
            load_timeout: self.config.load_timeout(),
        }
    }

    /// Embeds every frame concurrently, keeping the order of `frames`.
    pub async fn render_all(&self, frames: &Viewframes) -> Vec<RenderedFrame<E::Context>> {
        join_all(frames.iter().map(|frame| self.render(frame))).await
    }
}

/// Closes a context that did not finish loading.
async fn release<C: EmbeddedContext>(id: FrameId, context: C) {
    if let Err(err) = context.close().await {
        tracing::debug!(%id, %err, "failed to close abandoned context");
    }
}

/// A viewframe together with its embedded page.
#[derive(Debug)]
pub struct RenderedFrame<C> {
    frame: Viewframe,
    embedding: Embedding,
    scale: ScaleToFit,
    state: LoadState,
    context: Option<C>,
    load_timeout: std::time::Duration,
}

impl<C: EmbeddedContext> RenderedFrame<C> {
    pub fn id(&self) -> FrameId {
        self.frame.id
    }

    pub fn frame(&self) -> &Viewframe {
        &self.frame
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn scale(&self) -> &ScaleToFit {
        &self.scale
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The loaded page, or why there is none.
    pub fn context(&self) -> Result<&C> {
        match (&self.state, &self.context) {
            (LoadState::Loaded, Some(context)) => Ok(context),
            (LoadState::TimedOut, _) => Err(ViewframeError::Timeout(self.load_timeout)),
            (LoadState::Failed(reason), _) => Err(ViewframeError::LoadFailed(reason.clone())),
            _ => Err(ViewframeError::NotLoaded),
        }
    }

    pub fn context_mut(&mut self) -> Result<&mut C> {
        self.context()?;
        self.context.as_mut().ok_or(ViewframeError::NotLoaded)
    }

    /// The container of this frame was resized by the surrounding layout.
    /// Returns the new scale factor if it changed.
    pub fn resize_container(&mut self, width: u32, height: u32) -> Option<f64> {
        let changed = self.scale.resize_container(Size::new(width, height));
        if let Some(scale) = changed {
            tracing::debug!(id = %self.frame.id, scale, "viewframe rescaled");
        }
        changed
    }

    /// e.g. `393 × 852 (scale: 70.4%)`
    pub fn label(&self) -> String {
        format!(
            "{} × {} (scale: {})",
            self.frame.viewport.width(),
            self.frame.viewport.height(),
            self.scale.percent_label()
        )
    }

    /// The `<iframe>` markup of this frame at its current scale.
    pub fn iframe_html(&self) -> String {
        self.embedding.iframe_html(self.scale.scale())
    }

    pub async fn close(self) -> Result<()> {
        match self.context {
            Some(context) => context.close().await,
            None => Ok(()),
        }
    }
}
