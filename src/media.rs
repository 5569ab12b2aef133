//! Media query evaluation for real and simulated viewports.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::viewport::SimulatedViewport;

/// Callback registered on a [`MediaQueryList`].
pub type MediaListener = Box<dyn Fn(&MediaQueryList)>;

/// The handle returned by [`MediaMatcher::match_media`].
///
/// Lists produced for a simulated viewport are static: they never change and
/// registering listeners on them is accepted and ignored, through both the
/// legacy (`add_listener`) and the event target (`add_event_listener`) API.
pub struct MediaQueryList {
    matches: bool,
    media: String,
    onchange: Option<MediaListener>,
}

impl MediaQueryList {
    pub fn new(media: impl Into<String>, matches: bool) -> Self {
        Self {
            matches,
            media: media.into(),
            onchange: None,
        }
    }

    pub fn matches(&self) -> bool {
        self.matches
    }

    pub fn media(&self) -> &str {
        &self.media
    }

    pub fn onchange(&self) -> Option<&MediaListener> {
        self.onchange.as_ref()
    }

    pub fn add_listener(&self, _listener: MediaListener) {}

    pub fn remove_listener(&self, _listener: &MediaListener) {}

    pub fn add_event_listener(&self, _kind: &str, _listener: MediaListener) {}

    pub fn remove_event_listener(&self, _kind: &str, _listener: &MediaListener) {}

    /// Always reports the event as delivered.
    pub fn dispatch_event(&self, _kind: &str) -> bool {
        true
    }
}

impl fmt::Debug for MediaQueryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaQueryList")
            .field("matches", &self.matches)
            .field("media", &self.media)
            .field("onchange", &self.onchange.as_ref().map(|_| "<listener>"))
            .finish()
    }
}

/// Anything that can answer `matchMedia` queries.
pub trait MediaMatcher {
    fn match_media(&self, query: &str) -> MediaQueryList;
}

/// A `max-width`/`min-width` clause measured in `px`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClause {
    MaxWidth(u64),
    MinWidth(u64),
}

impl WidthClause {
    /// Finds the clause a width override answers.
    ///
    /// A `max-width: Npx` clause anywhere in the query takes precedence over a
    /// `min-width: Npx` clause. Whitespace is allowed after the colon but not
    /// before it, and the value must be a plain integer directly followed by
    /// `px`.
    pub fn find(query: &str) -> Option<Self> {
        px_value(query, "max-width")
            .map(WidthClause::MaxWidth)
            .or_else(|| px_value(query, "min-width").map(WidthClause::MinWidth))
    }

    pub fn matches(&self, width: u32) -> bool {
        match *self {
            WidthClause::MaxWidth(n) => u64::from(width) <= n,
            WidthClause::MinWidth(n) => u64::from(width) >= n,
        }
    }
}

/// Returns the first `<feature>: <digits>px` value in `query`.
fn px_value(query: &str, feature: &str) -> Option<u64> {
    query.match_indices(feature).find_map(|(idx, _)| {
        let rest = query[idx + feature.len()..].strip_prefix(':')?;
        let rest = rest.trim_start();
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || !rest[digits..].starts_with("px") {
            return None;
        }
        rest[..digits].parse().ok()
    })
}

/// Evaluates queries against the size a page is really laid out at.
///
/// Understands `min-`/`max-` `width`/`height` in `px`, `orientation`, and the
/// `all` and `screen` media types. Everything else does not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMedia {
    width: Cell<u32>,
    height: Cell<u32>,
}

impl LayoutMedia {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Cell::new(width),
            height: Cell::new(height),
        }
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.width.set(width);
        self.height.set(height);
    }

    fn evaluate(&self, query: &str) -> bool {
        let (width, height) = (self.width.get(), self.height.get());
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        if let Some(clause) = WidthClause::find(query) {
            return clause.matches(width);
        }
        if let Some(n) = px_value(query, "max-height") {
            return u64::from(height) <= n;
        }
        if let Some(n) = px_value(query, "min-height") {
            return u64::from(height) >= n;
        }
        if query.contains("orientation") {
            let portrait = height >= width;
            return if query.contains("portrait") {
                portrait
            } else {
                query.contains("landscape") && !portrait
            };
        }
        matches!(query, "all" | "screen")
    }
}

impl MediaMatcher for LayoutMedia {
    fn match_media(&self, query: &str) -> MediaQueryList {
        MediaQueryList::new(query, self.evaluate(query))
    }
}

/// Answers width queries for a simulated viewport and delegates the rest.
pub struct SimulatedMedia {
    viewport: SimulatedViewport,
    fallback: Rc<dyn MediaMatcher>,
}

impl SimulatedMedia {
    pub fn new(viewport: SimulatedViewport, fallback: Rc<dyn MediaMatcher>) -> Self {
        Self { viewport, fallback }
    }

    pub fn viewport(&self) -> &SimulatedViewport {
        &self.viewport
    }
}

impl MediaMatcher for SimulatedMedia {
    fn match_media(&self, query: &str) -> MediaQueryList {
        match WidthClause::find(query) {
            Some(clause) => MediaQueryList::new(query, clause.matches(self.viewport.width())),
            None => self.fallback.match_media(query),
        }
    }
}

impl fmt::Debug for SimulatedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedMedia")
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
