//! Embedding into pages of a real Chromium, driven over the DevTools protocol.

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::{
    ClearDeviceMetricsOverrideParams, ScreenOrientation, ScreenOrientationType,
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, RemoveScriptToEvaluateOnNewDocumentParams,
    ScriptIdentifier,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::ChromeConfig;
use crate::embed::Embedding;
use crate::error::{Result, ViewframeError};
use crate::js::{ReportedViewport, REPORTED_VIEWPORT_PROBE};
use crate::render::{EmbeddedContext, Embedder};
use crate::script::OverrideScript;
use crate::viewport::{SimulatedViewport, ViewportBand};

/// Opens one browser page per embedded frame.
pub struct ChromeEmbedder {
    browser: Browser,
    handler: JoinHandle<()>,
    emulate_device_metrics: bool,
}

impl ChromeEmbedder {
    /// Launches a new Chromium as configured and drives its connection in the
    /// background.
    pub async fn launch(config: &ChromeConfig) -> Result<Self> {
        let (browser, handler) = Browser::launch(config.browser_config()?).await?;
        tracing::info!(headless = config.is_headless(), "launched chromium");
        Ok(Self::from_parts(browser, handler, config.emulate_device_metrics()))
    }

    /// Attaches to an already running Chromium via its debug websocket.
    pub async fn connect(debug_ws_url: impl Into<String>, config: &ChromeConfig) -> Result<Self> {
        let (browser, handler) = Browser::connect(debug_ws_url).await?;
        Ok(Self::from_parts(browser, handler, config.emulate_device_metrics()))
    }

    fn from_parts(
        browser: Browser,
        mut handler: chromiumoxide::handler::Handler,
        emulate_device_metrics: bool,
    ) -> Self {
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::warn!(%err, "chromium connection closed");
                    break;
                }
            }
        });
        Self {
            browser,
            handler,
            emulate_device_metrics,
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Closes the browser and waits for the process and connection to end.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        if let Err(err) = self.handler.await {
            tracing::debug!(%err, "chromium handler task ended abnormally");
        }
        Ok(())
    }
}

impl Embedder for ChromeEmbedder {
    type Context = ChromeContext;

    async fn embed(&self, embedding: &Embedding, script: &OverrideScript) -> Result<ChromeContext> {
        let page = self.browser.new_page("about:blank").await?;
        let prepared = prepare(&page, embedding.viewport(), script, self.emulate_device_metrics).await;
        match prepared {
            Ok(script) => Ok(ChromeContext {
                page,
                script,
                url: embedding.url().to_string(),
                emulated: self.emulate_device_metrics,
            }),
            Err(err) => {
                if let Err(close_err) = page.close().await {
                    tracing::debug!(%close_err, "failed to close page after setup error");
                }
                Err(err)
            }
        }
    }
}

/// Emulates the device metrics and registers the override for every new
/// document of `page`.
async fn prepare(
    page: &Page,
    viewport: &SimulatedViewport,
    script: &OverrideScript,
    emulate_device_metrics: bool,
) -> Result<ScriptIdentifier> {
    if emulate_device_metrics {
        page.execute(device_metrics(viewport)?).await?;
        if viewport.band() == ViewportBand::Mobile {
            page.execute(SetTouchEmulationEnabledParams::new(true)).await?;
        }
    }
    let added = page
        .execute(AddScriptToEvaluateOnNewDocumentParams::new(script.source()))
        .await?;
    Ok(added.result.identifier)
}

/// `Emulation.setDeviceMetricsOverride` for a simulated viewport.
pub fn device_metrics(viewport: &SimulatedViewport) -> Result<SetDeviceMetricsOverrideParams> {
    let orientation = if viewport.width() > viewport.height() {
        ScreenOrientation::new(ScreenOrientationType::LandscapePrimary, 90)
    } else {
        ScreenOrientation::new(ScreenOrientationType::PortraitPrimary, 0)
    };
    SetDeviceMetricsOverrideParams::builder()
        .width(viewport.width())
        .height(viewport.height())
        .screen_width(viewport.width())
        .screen_height(viewport.height())
        .device_scale_factor(1.)
        .mobile(viewport.band() == ViewportBand::Mobile)
        .screen_orientation(orientation)
        .build()
        .map_err(ViewframeError::Config)
}

/// A page of the browser showing one frame.
#[derive(Debug)]
pub struct ChromeContext {
    page: Page,
    script: ScriptIdentifier,
    url: String,
    emulated: bool,
}

impl ChromeContext {
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl EmbeddedContext for ChromeContext {
    async fn load(&mut self) -> Result<()> {
        self.page.goto(self.url.as_str()).await?;
        tracing::debug!(url = %self.url, "navigated embedded page");
        Ok(())
    }

    async fn reported_viewport(&self) -> Result<ReportedViewport> {
        let value = self.page.evaluate(REPORTED_VIEWPORT_PROBE).await?;
        Ok(value.into_value()?)
    }

    /// Reverts the override in the current document and stops it from being
    /// installed into future ones.
    async fn restore(&mut self) -> Result<bool> {
        self.page
            .execute(RemoveScriptToEvaluateOnNewDocumentParams::new(
                self.script.clone(),
            ))
            .await?;
        if self.emulated {
            self.page
                .execute(ClearDeviceMetricsOverrideParams::default())
                .await?;
            self.emulated = false;
        }
        let restored = self
            .page
            .evaluate(OverrideScript::restore_expression())
            .await?;
        Ok(restored.into_value()?)
    }

    async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_metrics_for_phone() {
        let params = device_metrics(&SimulatedViewport::new(393, 852).unwrap()).unwrap();
        assert_eq!((params.width, params.height), (393, 852));
        assert!(params.mobile);
        assert_eq!(
            params.screen_orientation.unwrap().r#type,
            ScreenOrientationType::PortraitPrimary
        );
    }

    #[test]
    fn device_metrics_for_desktop() {
        let params = device_metrics(&SimulatedViewport::new(1920, 1080).unwrap()).unwrap();
        assert!(!params.mobile);
        assert_eq!(params.device_scale_factor, 1.);
        assert_eq!(params.screen_orientation.unwrap().angle, 90);
    }
}
