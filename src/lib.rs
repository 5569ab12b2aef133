//! Preview a webpage at several simulated device viewports side by side.
//!
//! Each [`Viewframe`](frame::Viewframe) embeds its target page with the
//! simulated size appended as `viewport=<w>x<h>`. Inside the embedded page the
//! override handler reads that parameter and makes the page report the
//! simulated size through its window and screen dimensions and `matchMedia`.
//!
//! ```no_run
//! # use viewframe::config::{ChromeConfig, RendererConfig};
//! # use viewframe::device::DeviceModel;
//! # use viewframe::frame::{NewFrame, Viewframes};
//! # use viewframe::render::{ChromeEmbedder, EmbeddedContext, Renderer};
//! # async fn demo() -> viewframe::error::Result<()> {
//! let mut frames = Viewframes::new();
//! frames.add(NewFrame::new("Mobile", DeviceModel::Iphone14Pro, "https://example.com"))?;
//!
//! let embedder = ChromeEmbedder::launch(&ChromeConfig::default()).await?;
//! let renderer = Renderer::new(embedder, RendererConfig::default());
//! for frame in renderer.render_all(&frames).await {
//!     let reported = frame.context()?.reported_viewport().await?;
//!     assert_eq!(reported.inner_width, 393);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod embed;
pub mod env;
pub mod error;
pub mod frame;
pub mod handler;
pub mod js;
pub mod load;
pub mod media;
pub mod render;
pub mod scale;
pub mod script;
pub mod size;
pub mod style;
pub mod viewport;

pub use crate::error::{Result, ViewframeError};
pub use crate::viewport::SimulatedViewport;
