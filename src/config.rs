use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::BrowserConfig;

use crate::embed::Sandbox;
use crate::error::{Result, ViewframeError};
use crate::size::Size;

/// Default time a frame may take to load before it is reported as timed out.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default space each frame may occupy in the preview.
pub const DEFAULT_CONTAINER: Size = Size {
    width: 800,
    height: 600,
};

/// How frames are laid out and loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Space available to each frame; the scale factor fits the frame into it.
    container: Size,
    /// How long to wait for a frame's load notification.
    load_timeout: Duration,
    /// Capabilities of the embedded browsing context.
    sandbox: Sandbox,
}

impl RendererConfig {
    pub fn builder() -> RendererConfigBuilder {
        RendererConfigBuilder::default()
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            sandbox: Sandbox::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RendererConfigBuilder {
    container: Option<Size>,
    load_timeout: Option<Duration>,
    sandbox: Option<Sandbox>,
}

impl RendererConfigBuilder {
    pub fn container(mut self, width: u32, height: u32) -> Self {
        self.container = Some(Size::new(width, height));
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn sandbox(mut self, sandbox: Sandbox) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    pub fn build(self) -> std::result::Result<RendererConfig, String> {
        let load_timeout = self.load_timeout.unwrap_or(DEFAULT_LOAD_TIMEOUT);
        if load_timeout.is_zero() {
            return Err("load timeout must be greater than zero".to_string());
        }
        Ok(RendererConfig {
            container: self.container.unwrap_or(DEFAULT_CONTAINER),
            load_timeout,
            sandbox: self.sandbox.unwrap_or_default(),
        })
    }
}

/// How the Chromium instance rendering the frames is launched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeConfig {
    /// Determines whether to run headless version of the browser. Defaults to
    /// true.
    headless: bool,
    /// Determines whether to run the browser with a sandbox.
    sandbox: bool,
    /// Launch the browser with a specific window width and height.
    window_size: Option<(u32, u32)>,
    /// Path for Chrome or Chromium.
    ///
    /// If unspecified, the `CHROME` environment variable is consulted and then
    /// chromiumoxide's own detection.
    executable: Option<PathBuf>,
    /// Additionally emulate the device metrics of each frame through the
    /// DevTools protocol, so layout happens at the simulated size for real.
    emulate_device_metrics: bool,
}

impl ChromeConfig {
    pub fn builder() -> ChromeConfigBuilder {
        ChromeConfigBuilder::default()
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    pub fn emulate_device_metrics(&self) -> bool {
        self.emulate_device_metrics
    }

    /// The chromiumoxide launch configuration.
    pub fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some((width, height)) = self.window_size {
            builder = builder.window_size(width, height);
        }
        if let Some(ref executable) = self.executable {
            builder = builder.chrome_executable(executable);
        }
        builder.build().map_err(ViewframeError::Config)
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        ChromeConfigBuilder::default().build()
    }
}

#[derive(Debug, Clone)]
pub struct ChromeConfigBuilder {
    headless: bool,
    sandbox: bool,
    window_size: Option<(u32, u32)>,
    executable: Option<PathBuf>,
    emulate_device_metrics: bool,
}

impl Default for ChromeConfigBuilder {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            window_size: None,
            executable: None,
            emulate_device_metrics: true,
        }
    }
}

impl ChromeConfigBuilder {
    pub fn with_head(mut self) -> Self {
        self.headless = false;
        self
    }

    pub fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    pub fn chrome_executable(mut self, path: impl AsRef<Path>) -> Self {
        self.executable = Some(path.as_ref().to_path_buf());
        self
    }

    /// Only inject the override script and leave the real layout viewport
    /// alone.
    pub fn script_only(mut self) -> Self {
        self.emulate_device_metrics = false;
        self
    }

    pub fn build(self) -> ChromeConfig {
        let executable = self.executable.or_else(executable_from_env);
        ChromeConfig {
            headless: self.headless,
            sandbox: self.sandbox,
            window_size: self.window_size,
            executable,
            emulate_device_metrics: self.emulate_device_metrics,
        }
    }
}

/// The `CHROME` environment variable, if it names an existing file.
fn executable_from_env() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os("CHROME")?);
    path.exists().then_some(path)
}
