//! Makes a page report a simulated viewport instead of its rendered size.
//!
//! The override is driven by the page's own `viewport` query parameter. When
//! the parameter is missing or malformed nothing happens at all.

use std::rc::Rc;

use thiserror::Error;

use crate::env::{ElementId, HeadElement, Property, SizeProperty, Window};
use crate::media::{MediaMatcher, SimulatedMedia};
use crate::style::simulation_stylesheet;
use crate::viewport::{meta_content, SimulatedViewport};

/// Name of the meta directive controlling the layout viewport.
pub const VIEWPORT_META: &str = "viewport";

/// Installs the override requested by the window's location, if any.
pub fn install(window: &mut Window) -> Option<InstalledOverride> {
    let viewport = SimulatedViewport::from_url(window.location())?;
    Some(ViewportOverride::new(viewport).install(window))
}

/// A viewport override ready to be installed into a [`Window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportOverride {
    viewport: SimulatedViewport,
}

impl ViewportOverride {
    pub fn new(viewport: SimulatedViewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> &SimulatedViewport {
        &self.viewport
    }

    /// Installs the override.
    ///
    /// Window size properties are redefined first and a single resize event is
    /// dispatched right after, so listeners read the simulated size. Screen
    /// size, the viewport meta directive, the simulation stylesheet and
    /// `matchMedia` follow.
    pub fn install(&self, window: &mut Window) -> InstalledOverride {
        let width = self.viewport.width();
        let height = self.viewport.height();
        let mut saved = Vec::with_capacity(SizeProperty::ALL.len());

        redefine(window, SizeProperty::InnerWidth, width, &mut saved);
        redefine(window, SizeProperty::InnerHeight, height, &mut saved);
        window.dispatch_resize();

        redefine(window, SizeProperty::ScreenWidth, width, &mut saved);
        redefine(window, SizeProperty::ScreenHeight, height, &mut saved);

        let content = meta_content(&self.viewport);
        let document = window.document_mut();
        let meta = match document.query_meta(VIEWPORT_META) {
            Some(id) => {
                let previous = document.set_meta_content(id, Some(content)).flatten();
                MetaChange::Updated { id, previous }
            }
            None => MetaChange::Created(document.append(HeadElement::Meta {
                name: VIEWPORT_META.to_string(),
                content: Some(content),
            })),
        };

        let style = document.append(HeadElement::Style {
            text: simulation_stylesheet(&self.viewport),
        });

        let fallback = window.media_matcher();
        let previous_media =
            window.replace_media_matcher(Rc::new(SimulatedMedia::new(self.viewport, fallback)));

        let depth = window.push_override();
        tracing::info!(width, height, "viewport simulation active");

        InstalledOverride {
            viewport: self.viewport,
            depth,
            saved,
            meta,
            style,
            previous_media,
        }
    }
}

fn redefine(
    window: &mut Window,
    prop: SizeProperty,
    value: u32,
    saved: &mut Vec<(SizeProperty, Property)>,
) {
    match window.define_property(prop, Property::data(value)) {
        Ok(previous) => saved.push((prop, previous)),
        Err(err) => tracing::debug!(%err, "skipping viewport property override"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MetaChange {
    Created(ElementId),
    Updated {
        id: ElementId,
        previous: Option<String>,
    },
}

/// An installed override. Dropping it leaves the override in place for the
/// lifetime of the page; [`InstalledOverride::uninstall`] reverts it.
///
/// Overrides stack: each one saved what the previous one had installed, so
/// they can only be uninstalled last-in-first-out. A dropped guard pins every
/// override installed before it.
#[must_use = "dropping the guard keeps the override installed permanently"]
pub struct InstalledOverride {
    viewport: SimulatedViewport,
    depth: u32,
    saved: Vec<(SizeProperty, Property)>,
    meta: MetaChange,
    style: ElementId,
    previous_media: Rc<dyn MediaMatcher>,
}

impl InstalledOverride {
    pub fn viewport(&self) -> &SimulatedViewport {
        &self.viewport
    }

    /// Restores what [`ViewportOverride::install`] replaced and dispatches one
    /// resize event so dependents pick up the real size again.
    ///
    /// Fails without touching the window if an override installed later is
    /// still in place; the guard is handed back.
    pub fn uninstall(self, window: &mut Window) -> Result<(), OutOfOrderUninstall> {
        if !window.pop_override(self.depth) {
            return Err(OutOfOrderUninstall(self));
        }
        for (prop, previous) in self.saved.into_iter().rev() {
            if let Err(err) = window.define_property(prop, previous) {
                tracing::debug!(%err, "could not restore viewport property");
            }
        }
        window.replace_media_matcher(self.previous_media);

        let document = window.document_mut();
        document.remove(self.style);
        match self.meta {
            MetaChange::Created(id) => {
                document.remove(id);
            }
            MetaChange::Updated { id, previous } => {
                document.set_meta_content(id, previous);
            }
        }

        tracing::debug!(viewport = %self.viewport, "viewport simulation removed");
        window.dispatch_resize();
        Ok(())
    }
}

/// Returned by [`InstalledOverride::uninstall`] while a later override is
/// still installed.
#[derive(Debug, Error)]
#[error("override for {} is not the most recently installed one", .0.viewport)]
pub struct OutOfOrderUninstall(pub InstalledOverride);

impl std::fmt::Debug for InstalledOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledOverride")
            .field("viewport", &self.viewport)
            .field("depth", &self.depth)
            .field("saved", &self.saved)
            .field("meta", &self.meta)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use url::Url;

    use super::*;
    use crate::size::Size;

    fn open(url: &str) -> Window {
        Window::new(
            Url::parse(url).unwrap(),
            Size::new(1280, 800),
            Size::new(2560, 1440),
        )
    }

    /// Records the inner size seen by each resize event.
    fn observe(window: &mut Window) -> Rc<RefCell<Vec<(u32, u32)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        window.add_resize_listener(Box::new(move |w: &Window| {
            sink.borrow_mut().push((w.inner_width(), w.inner_height()))
        }));
        seen
    }

    #[test]
    fn overrides_window_and_screen() {
        let mut window = open("https://example.com/?viewport=393x852");
        let seen = observe(&mut window);

        let installed = install(&mut window).unwrap();
        assert_eq!(installed.viewport(), &SimulatedViewport::new(393, 852).unwrap());
        assert_eq!(window.inner_width(), 393);
        assert_eq!(window.inner_height(), 852);
        assert_eq!(window.screen_width(), 393);
        assert_eq!(window.screen_height(), 852);
        // listeners ran exactly once and saw the simulated values
        assert_eq!(*seen.borrow(), vec![(393, 852)]);
    }

    #[test]
    fn overridden_properties_stay_writable_and_configurable() {
        let mut window = open("https://example.com/?viewport=393x852");
        let _installed = install(&mut window).unwrap();
        for prop in SizeProperty::ALL {
            let descriptor = window.property(prop);
            assert!(descriptor.is_writable() && descriptor.is_configurable());
        }
        assert!(window.assign(SizeProperty::InnerWidth, 400));
        assert_eq!(window.inner_width(), 400);
    }

    #[test]
    fn malformed_parameter_is_a_no_op() {
        for url in [
            "https://example.com/",
            "https://example.com/?other=1",
            "https://example.com/?viewport=",
            "https://example.com/?viewport=abcx852",
            "https://example.com/?viewport=393",
            "https://example.com/?viewport=0x852",
            "https://example.com/?viewport=-1x852",
            "https://example.com/?viewport=393x852x2",
        ] {
            let mut window = open(url);
            let fired = Rc::new(Cell::new(0));
            let counter = Rc::clone(&fired);
            window.add_resize_listener(Box::new(move |_: &Window| counter.set(counter.get() + 1)));

            assert!(install(&mut window).is_none(), "{url}");
            assert_eq!(fired.get(), 0);
            assert_eq!(window.inner_width(), 1280);
            assert_eq!(window.screen_width(), 2560);
            assert!(window.document().is_empty());
            assert!(window.property(SizeProperty::InnerWidth).is_native());
            assert!(window.match_media("(min-width: 1024px)").matches());
        }
    }

    #[test]
    fn creates_single_viewport_meta() {
        let mut window = open("https://example.com/?viewport=393x852");
        let _installed = install(&mut window).unwrap();
        let doc = window.document();
        assert_eq!(doc.metas(VIEWPORT_META).count(), 1);
        assert_eq!(
            doc.meta_content(VIEWPORT_META),
            Some("width=393, initial-scale=1.0, user-scalable=yes")
        );
        assert_eq!(doc.styles().count(), 1);
    }

    #[test]
    fn reuses_existing_viewport_meta() {
        let mut window = open("https://example.com/?viewport=1920x1080");
        let title = window.document_mut().append(HeadElement::Other {
            tag: "title".into(),
        });
        window.document_mut().append(HeadElement::Meta {
            name: VIEWPORT_META.into(),
            content: Some("width=device-width, initial-scale=1".into()),
        });

        let installed = install(&mut window).unwrap();
        let doc = window.document();
        assert_eq!(doc.metas(VIEWPORT_META).count(), 1);
        assert_eq!(
            doc.meta_content(VIEWPORT_META),
            Some("width=1920, initial-scale=0.8, user-scalable=yes")
        );
        assert_eq!(doc.len(), 3);
        assert!(doc.get(title).is_some());

        installed.uninstall(&mut window).unwrap();
        assert_eq!(
            window.document().meta_content(VIEWPORT_META),
            Some("width=device-width, initial-scale=1")
        );
    }

    #[test]
    fn middle_band_meta_has_no_user_scaling() {
        let mut window = open("https://example.com/?viewport=1440x900");
        let _installed = install(&mut window).unwrap();
        assert_eq!(
            window.document().meta_content(VIEWPORT_META),
            Some("width=1440, initial-scale=1.0")
        );
    }

    #[test]
    fn injects_stylesheet() {
        let mut window = open("https://example.com/?viewport=375x667");
        let _installed = install(&mut window).unwrap();
        let css = window.document().styles().next().unwrap().to_string();
        assert!(css.contains("max-width: 375px !important"));
        assert!(css.contains("overflow-x: hidden"));
        assert!(css.contains(".max-w-screen-xl"));
    }

    #[test]
    fn media_queries_follow_simulated_width() {
        let mut window = open("https://example.com/?viewport=400x800");
        let _installed = install(&mut window).unwrap();
        assert!(window.match_media("(max-width: 768px)").matches());
        assert!(!window.match_media("(min-width: 768px)").matches());
        // delegated to the real layout, which is landscape
        assert!(window.match_media("(orientation: landscape)").matches());

        let mut wide = open("https://example.com/?viewport=2000x1000");
        let _installed = install(&mut wide).unwrap();
        assert!(wide.match_media("(min-width: 1920px)").matches());
    }

    #[test]
    fn uninstall_restores_everything() {
        let mut window = open("https://example.com/?viewport=393x852");
        let seen = observe(&mut window);

        let installed = install(&mut window).unwrap();
        installed.uninstall(&mut window).unwrap();

        assert_eq!(window.inner_width(), 1280);
        assert_eq!(window.inner_height(), 800);
        assert_eq!(window.screen_width(), 2560);
        assert_eq!(window.screen_height(), 1440);
        assert!(window.property(SizeProperty::InnerWidth).is_native());
        assert!(window.document().is_empty());
        assert!(window.match_media("(min-width: 1024px)").matches());
        assert_eq!(*seen.borrow(), vec![(393, 852), (1280, 800)]);

        // the restored native properties follow layout changes again
        window.resize_layout(Size::new(900, 600));
        assert_eq!(window.inner_width(), 900);
    }

    #[test]
    fn reinstall_replaces_previous_override() {
        let mut window = open("https://example.com/?viewport=393x852");
        let first = install(&mut window).unwrap();
        let second = ViewportOverride::new(SimulatedViewport::new(1024, 1366).unwrap())
            .install(&mut window);
        assert_eq!(window.inner_width(), 1024);
        assert_eq!(window.document().metas(VIEWPORT_META).count(), 1);
        assert!(!window.match_media("(max-width: 768px)").matches());

        second.uninstall(&mut window).unwrap();
        assert_eq!(window.inner_width(), 393);
        first.uninstall(&mut window).unwrap();
        assert_eq!(window.inner_width(), 1280);
        assert!(window.document().is_empty());
    }

    #[test]
    fn out_of_order_uninstall_is_refused() {
        let mut window = open("https://example.com/?viewport=393x852");
        let first = install(&mut window).unwrap();
        let second = ViewportOverride::new(SimulatedViewport::new(1024, 1366).unwrap())
            .install(&mut window);
        assert_eq!(window.override_depth(), 2);

        let OutOfOrderUninstall(first) = first.uninstall(&mut window).unwrap_err();
        assert_eq!(first.viewport(), &SimulatedViewport::new(393, 852).unwrap());
        assert_eq!(window.inner_width(), 1024);
        assert_eq!(window.override_depth(), 2);
        assert_eq!(window.document().styles().count(), 2);

        second.uninstall(&mut window).unwrap();
        first.uninstall(&mut window).unwrap();
        assert_eq!(window.override_depth(), 0);
        assert_eq!(window.inner_width(), 1280);
        assert!(window.property(SizeProperty::InnerWidth).is_native());
        assert!(window.match_media("(min-width: 1024px)").matches());
        assert!(window.document().is_empty());
    }

    #[test]
    fn simulated_size_survives_layout_resize() {
        let mut window = open("https://example.com/?viewport=393x852");
        let _installed = install(&mut window).unwrap();
        window.resize_layout(Size::new(600, 400));
        assert_eq!(window.inner_width(), 393);
        assert!(window.match_media("(max-width: 400px)").matches());
        assert!(window.match_media("(orientation: landscape)").matches());
    }
}
