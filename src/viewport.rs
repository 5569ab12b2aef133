//! The simulated viewport and its `WxH` wire form.
//!
//! A viewport travels from the outer page to the embedded page as the single
//! query parameter `viewport=<width>x<height>`. Both tokens must be plain ASCII
//! digits that parse to a positive `u32`; anything else means "no simulation".

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ViewframeError;

/// Name of the query parameter carrying the simulated viewport.
pub const VIEWPORT_PARAM: &str = "viewport";

/// Widths up to and including this value are treated as mobile-class.
pub const MOBILE_MAX_WIDTH: u32 = 768;

/// Widths from this value upwards are treated as desktop-class.
pub const DESKTOP_MIN_WIDTH: u32 = 1920;

/// The size an embedded page is made to believe it renders at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulatedViewport {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl SimulatedViewport {
    /// Returns `None` if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    pub fn band(&self) -> ViewportBand {
        ViewportBand::of_width(self.width())
    }

    /// Parses the `WxH` form, returning `None` for anything malformed.
    pub fn parse(value: &str) -> Option<Self> {
        let (width, height) = value.split_once('x')?;
        Self::new(parse_dimension(width)?, parse_dimension(height)?)
    }

    /// Reads the `viewport` parameter from a query string (with or without the
    /// leading `?`).
    ///
    /// The first `viewport` pair decides; a malformed first value is not
    /// rescued by a later one.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let (_, value) = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == VIEWPORT_PARAM)?;
        Self::parse(&value)
    }

    /// Reads the `viewport` parameter from a document location.
    pub fn from_url(url: &Url) -> Option<Self> {
        url.query().and_then(Self::from_query)
    }

    /// The `viewport=WxH` query pair.
    pub fn query_pair(&self) -> String {
        format!("{}={}", VIEWPORT_PARAM, self)
    }
}

fn parse_dimension(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl fmt::Display for SimulatedViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for SimulatedViewport {
    type Err = ViewframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ViewframeError::InvalidViewport(s.to_string()))
    }
}

impl TryFrom<(u32, u32)> for SimulatedViewport {
    type Error = ViewframeError;

    fn try_from((width, height): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(width, height)
            .ok_or_else(|| ViewframeError::InvalidViewport(format!("{}x{}", width, height)))
    }
}

/// Device class of a simulated width.
///
/// The bands are mutually exclusive: `Mobile` is `width <= 768`, `Desktop` is
/// `width >= 1920` and everything in between is `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewportBand {
    Mobile,
    Standard,
    Desktop,
}

impl ViewportBand {
    pub fn of_width(width: u32) -> Self {
        if width <= MOBILE_MAX_WIDTH {
            ViewportBand::Mobile
        } else if width >= DESKTOP_MIN_WIDTH {
            ViewportBand::Desktop
        } else {
            ViewportBand::Standard
        }
    }

    pub fn initial_scale(&self) -> &'static str {
        match self {
            ViewportBand::Desktop => "0.8",
            ViewportBand::Mobile | ViewportBand::Standard => "1.0",
        }
    }

    pub fn user_scalable(&self) -> bool {
        !matches!(self, ViewportBand::Standard)
    }
}

/// Content of the `<meta name="viewport">` directive for a simulated viewport.
pub fn meta_content(viewport: &SimulatedViewport) -> String {
    let band = viewport.band();
    let mut content = format!(
        "width={}, initial-scale={}",
        viewport.width(),
        band.initial_scale()
    );
    if band.user_scalable() {
        content.push_str(", user-scalable=yes");
    }
    content
}
