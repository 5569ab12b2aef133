//! Embedding into the in-memory [`Window`] facade.
//!
//! Instead of running the generated script, the page model gets the override
//! installed through [`handler::install`], exactly as the script would do it
//! inside a browser.

use url::Url;

use crate::embed::Embedding;
use crate::env::Window;
use crate::error::Result;
use crate::handler::{self, InstalledOverride, OutOfOrderUninstall};
use crate::js::ReportedViewport;
use crate::render::{EmbeddedContext, Embedder};
use crate::script::OverrideScript;
use crate::size::Size;
use crate::viewport::SimulatedViewport;

/// Embeds pages as [`Window`] models laid out at a fixed real size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedEmbedder {
    layout: Size,
    screen: Size,
}

impl SimulatedEmbedder {
    /// Pages are really rendered at `layout` on a screen of size `screen`.
    pub fn new(layout: Size, screen: Size) -> Self {
        Self { layout, screen }
    }
}

impl Default for SimulatedEmbedder {
    fn default() -> Self {
        Self::new(Size::new(1280, 800), Size::new(1920, 1080))
    }
}

impl Embedder for SimulatedEmbedder {
    type Context = SimulatedContext;

    async fn embed(&self, embedding: &Embedding, script: &OverrideScript) -> Result<SimulatedContext> {
        let location = Url::parse(embedding.url())?;
        Ok(SimulatedContext {
            window: Window::new(location, self.layout, self.screen),
            requested: *script.viewport(),
            installed: None,
        })
    }
}

#[derive(Debug)]
pub struct SimulatedContext {
    window: Window,
    requested: SimulatedViewport,
    installed: Option<InstalledOverride>,
}

impl SimulatedContext {
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    pub fn is_simulating(&self) -> bool {
        self.installed.is_some()
    }
}

impl EmbeddedContext for SimulatedContext {
    /// Runs the override at document start, the way the script would.
    async fn load(&mut self) -> Result<()> {
        self.installed = handler::install(&mut self.window);
        if self.installed.is_none() {
            tracing::debug!(viewport = %self.requested, "page did not request a simulated viewport");
        }
        Ok(())
    }

    async fn reported_viewport(&self) -> Result<ReportedViewport> {
        Ok(ReportedViewport::from(&self.window))
    }

    async fn restore(&mut self) -> Result<bool> {
        match self.installed.take() {
            Some(installed) => match installed.uninstall(&mut self.window) {
                Ok(()) => Ok(true),
                Err(OutOfOrderUninstall(installed)) => {
                    tracing::debug!("a later override is still installed, keeping ours");
                    self.installed = Some(installed);
                    Ok(false)
                }
            },
            None => Ok(false),
        }
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
