//! An in-memory model of the size-reporting surface of an embedded page.
//!
//! [`Window`] is the facade the override handler works against: the window and
//! screen size properties, `matchMedia`, the document head and resize
//! listeners. A page model is created for the true rendered size and can then
//! be made to report a simulated one.

use std::fmt;
use std::rc::Rc;

use url::Url;

use crate::media::{LayoutMedia, MediaMatcher, MediaQueryList};
use crate::size::Size;

pub mod document;
pub mod property;

pub use document::{Document, ElementId, HeadElement};
pub use property::{Property, PropertyError, SizeProperty};

/// Called with the window after every resize event.
pub type ResizeListener = Box<dyn FnMut(&Window)>;

pub struct Window {
    location: Url,
    layout: Size,
    inner_width: Property,
    inner_height: Property,
    screen_width: Property,
    screen_height: Property,
    document: Document,
    layout_media: Rc<LayoutMedia>,
    media: Rc<dyn MediaMatcher>,
    resize_listeners: Vec<ResizeListener>,
    override_depth: u32,
}

impl Window {
    /// A window laid out at `layout` on a screen of size `screen`.
    pub fn new(location: Url, layout: Size, screen: Size) -> Self {
        let layout_media = Rc::new(LayoutMedia::new(layout.width, layout.height));
        Self {
            location,
            layout,
            inner_width: Property::native(layout.width),
            inner_height: Property::native(layout.height),
            screen_width: Property::native(screen.width),
            screen_height: Property::native(screen.height),
            document: Document::new(),
            media: layout_media.clone(),
            layout_media,
            resize_listeners: Vec::new(),
            override_depth: 0,
        }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// The size the page is really rendered at.
    pub fn layout(&self) -> Size {
        self.layout
    }

    pub fn inner_width(&self) -> u32 {
        self.inner_width.get()
    }

    pub fn inner_height(&self) -> u32 {
        self.inner_height.get()
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width.get()
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height.get()
    }

    pub fn property(&self, prop: SizeProperty) -> &Property {
        match prop {
            SizeProperty::InnerWidth => &self.inner_width,
            SizeProperty::InnerHeight => &self.inner_height,
            SizeProperty::ScreenWidth => &self.screen_width,
            SizeProperty::ScreenHeight => &self.screen_height,
        }
    }

    fn property_mut(&mut self, prop: SizeProperty) -> &mut Property {
        match prop {
            SizeProperty::InnerWidth => &mut self.inner_width,
            SizeProperty::InnerHeight => &mut self.inner_height,
            SizeProperty::ScreenWidth => &mut self.screen_width,
            SizeProperty::ScreenHeight => &mut self.screen_height,
        }
    }

    /// Plain assignment, e.g. `window.innerWidth = 10`. Read-only properties
    /// silently keep their value and `false` is returned.
    pub fn assign(&mut self, prop: SizeProperty, value: u32) -> bool {
        self.property_mut(prop).set(value)
    }

    /// Replaces the property descriptor and returns the previous one.
    ///
    /// Fails only if the current descriptor is not configurable.
    pub fn define_property(
        &mut self,
        prop: SizeProperty,
        descriptor: Property,
    ) -> Result<Property, PropertyError> {
        let slot = self.property_mut(prop);
        if !slot.is_configurable() {
            return Err(PropertyError(prop));
        }
        Ok(std::mem::replace(slot, descriptor))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn match_media(&self, query: &str) -> MediaQueryList {
        self.media.match_media(query)
    }

    pub fn media_matcher(&self) -> Rc<dyn MediaMatcher> {
        Rc::clone(&self.media)
    }

    /// Swaps the `matchMedia` implementation and returns the previous one.
    pub fn replace_media_matcher(&mut self, media: Rc<dyn MediaMatcher>) -> Rc<dyn MediaMatcher> {
        std::mem::replace(&mut self.media, media)
    }

    /// Number of viewport overrides currently stacked on this window.
    pub fn override_depth(&self) -> u32 {
        self.override_depth
    }

    pub(crate) fn push_override(&mut self) -> u32 {
        self.override_depth += 1;
        self.override_depth
    }

    /// Pops the override at `depth`, which must be the topmost one.
    pub(crate) fn pop_override(&mut self, depth: u32) -> bool {
        if depth != self.override_depth {
            return false;
        }
        self.override_depth -= 1;
        true
    }

    pub fn add_resize_listener(&mut self, listener: ResizeListener) {
        self.resize_listeners.push(listener);
    }

    /// Synchronously invokes every resize listener with the current state.
    pub fn dispatch_resize(&mut self) {
        let mut listeners = std::mem::take(&mut self.resize_listeners);
        for listener in listeners.iter_mut() {
            listener(self);
        }
        // listeners registered while dispatching go after the existing ones
        listeners.append(&mut self.resize_listeners);
        self.resize_listeners = listeners;
    }

    /// The embedding changed the real rendered size.
    ///
    /// Browser computed properties follow, overridden ones keep reporting
    /// their value. The native media evaluation follows as well, which a
    /// simulated matcher still delegates non-width queries to.
    pub fn resize_layout(&mut self, layout: Size) {
        self.layout = layout;
        self.inner_width.follow_layout(layout.width);
        self.inner_height.follow_layout(layout.height);
        self.layout_media.resize(layout.width, layout.height);
        self.dispatch_resize();
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("location", &self.location.as_str())
            .field("layout", &self.layout)
            .field("inner_width", &self.inner_width)
            .field("inner_height", &self.inner_height)
            .field("screen_width", &self.screen_width)
            .field("screen_height", &self.screen_height)
            .field("document", &self.document)
            .field("resize_listeners", &self.resize_listeners.len())
            .field("override_depth", &self.override_depth)
            .finish()
    }
}
