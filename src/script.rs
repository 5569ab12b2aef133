//! The override as a script for real browsers.
//!
//! A browser cannot be handed a [`Window`](crate::env::Window) facade, so the
//! same override is expressed as JavaScript that runs at document start. The
//! meta content and stylesheet are computed here and embedded as literals; the
//! script only acts when the document's own `viewport` parameter names the
//! viewport it was generated for.
//!
//! Window and screen sizes and `matchMedia` are overridden right away. The
//! viewport meta and the stylesheet are applied once the document has been
//! parsed, so an existing viewport meta of the page is found and reused.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::style::simulation_stylesheet;
use crate::viewport::{meta_content, SimulatedViewport, VIEWPORT_PARAM};

/// Global under which the generated script exposes its restore function.
pub const RESTORE_FN: &str = "__viewframeRestore";

const TEMPLATE: &str = r#"(() => {
  const expected = __EXPECTED__;
  const raw = new URLSearchParams(window.location.search).get(__PARAM__);
  if (raw !== expected || typeof window[__RESTORE__] === "function") {
    return;
  }
  const width = __WIDTH__;
  const height = __HEIGHT__;
  const saved = [];
  const redefine = (target, name, value) => {
    try {
      saved.push([target, name, Object.getOwnPropertyDescriptor(target, name)]);
      Object.defineProperty(target, name, { value, writable: true, configurable: true });
    } catch (_) {}
  };

  redefine(window, "innerWidth", width);
  redefine(window, "innerHeight", height);
  window.dispatchEvent(new Event("resize"));
  redefine(window.screen, "width", width);
  redefine(window.screen, "height", height);

  const originalMatchMedia = window.matchMedia;
  const widthClause = (query) => {
    const max = /max-width:\s*(\d+)px/.exec(query);
    if (max) return width <= parseInt(max[1], 10);
    const min = /min-width:\s*(\d+)px/.exec(query);
    if (min) return width >= parseInt(min[1], 10);
    return null;
  };
  window.matchMedia = function (query) {
    const matches = widthClause(String(query));
    if (matches === null) {
      return originalMatchMedia.call(window, query);
    }
    return {
      matches,
      media: String(query),
      onchange: null,
      addListener: () => {},
      removeListener: () => {},
      addEventListener: () => {},
      removeEventListener: () => {},
      dispatchEvent: () => true,
    };
  };

  // the head only exists once the document has been parsed
  let applied = null;
  const applyHead = () => {
    const root = document.head || document.documentElement;
    if (!root) return null;
    let meta = document.querySelector('meta[name="viewport"]');
    const created = !meta;
    const previous = meta ? meta.getAttribute("content") : null;
    if (!meta) {
      meta = document.createElement("meta");
      meta.setAttribute("name", "viewport");
      root.appendChild(meta);
    }
    meta.setAttribute("content", __META__);
    const style = document.createElement("style");
    style.textContent = __CSS__;
    root.appendChild(style);
    return { meta, created, previous, style };
  };
  const onReady = () => {
    document.removeEventListener("DOMContentLoaded", onReady);
    try {
      applied = applyHead();
    } catch (_) {}
  };

  window[__RESTORE__] = () => {
    document.removeEventListener("DOMContentLoaded", onReady);
    window.matchMedia = originalMatchMedia;
    if (applied) {
      const { meta, created, previous, style } = applied;
      style.remove();
      if (created) {
        meta.remove();
      } else if (previous === null) {
        meta.removeAttribute("content");
      } else {
        meta.setAttribute("content", previous);
      }
      applied = null;
    }
    for (const [target, name, descriptor] of saved.reverse()) {
      try {
        if (descriptor) {
          Object.defineProperty(target, name, descriptor);
        } else {
          delete target[name];
        }
      } catch (_) {}
    }
    delete window[__RESTORE__];
    window.dispatchEvent(new Event("resize"));
  };

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", onReady);
  } else {
    onReady();
  }

  console.log(`Viewport simulation active: ${width}x${height}`);
})();"#;

/// JavaScript source installing the override for one viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideScript {
    viewport: SimulatedViewport,
    source: String,
}

impl OverrideScript {
    pub fn new(viewport: SimulatedViewport) -> Self {
        let source = TEMPLATE
            .replace("__EXPECTED__", &js_string(&viewport.to_string()))
            .replace("__PARAM__", &js_string(VIEWPORT_PARAM))
            .replace("__RESTORE__", &js_string(RESTORE_FN))
            .replace("__WIDTH__", &viewport.width().to_string())
            .replace("__HEIGHT__", &viewport.height().to_string())
            .replace("__META__", &js_string(&meta_content(&viewport)))
            .replace("__CSS__", &js_string(&simulation_stylesheet(&viewport)));
        Self { viewport, source }
    }

    pub fn viewport(&self) -> &SimulatedViewport {
        &self.viewport
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expression reverting an installed override; evaluates to `false` if
    /// none is installed in the page.
    pub fn restore_expression() -> String {
        format!(
            "(() => {{ const f = window[{0}]; if (typeof f !== 'function') return false; f(); return true; }})()",
            js_string(RESTORE_FN)
        )
    }
}

impl fmt::Display for OverrideScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A JavaScript string literal for `value`.
fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use boa_engine::{Context, JsValue, Source};

    use super::*;

    #[test]
    fn embeds_viewport_values() {
        let script = OverrideScript::new(SimulatedViewport::new(393, 852).unwrap());
        let src = script.source();
        assert!(src.contains(r#"const expected = "393x852";"#));
        assert!(src.contains(r#"get("viewport")"#));
        assert!(src.contains("const width = 393;"));
        assert!(src.contains("const height = 852;"));
        assert!(src.contains(r#""width=393, initial-scale=1.0, user-scalable=yes""#));
        assert!(src.contains(r#"max-width: 393px !important;\n"#));
        for placeholder in ["__EXPECTED__", "__PARAM__", "__WIDTH__", "__META__", "__CSS__"] {
            assert!(!src.contains(placeholder));
        }
    }

    #[test]
    fn desktop_band_meta() {
        let script = OverrideScript::new(SimulatedViewport::new(1920, 1080).unwrap());
        assert!(script
            .source()
            .contains(r#""width=1920, initial-scale=0.8, user-scalable=yes""#));
        assert!(!script.source().contains(".max-w-7xl"));
    }

    #[test]
    fn restore_expression_targets_restore_fn() {
        let expr = OverrideScript::restore_expression();
        assert!(expr.contains(r#"window["__viewframeRestore"]"#));
        assert!(expr.ends_with(")()"));
    }

    /// A page whose document has not been parsed yet: no head, no root
    /// element, `readyState` is `loading`.
    const PAGE: &str = r#"
var resizes = [];
var layout = { width: 1280, height: 800 };
function Event(type) { this.type = type; }
function URLSearchParams(search) {
  this.values = {};
  var query = search.charAt(0) === "?" ? search.slice(1) : search;
  var values = this.values;
  query.split("&").forEach(function (pair) {
    if (!pair) return;
    var idx = pair.indexOf("=");
    var key = idx < 0 ? pair : pair.slice(0, idx);
    if (!(key in values)) values[key] = idx < 0 ? "" : pair.slice(idx + 1);
  });
}
URLSearchParams.prototype.get = function (key) {
  return key in this.values ? this.values[key] : null;
};
var console = { log: function () {} };

function Element(tag) {
  this.tagName = tag;
  this.attrs = {};
  this.children = [];
  this.parent = null;
  this.textContent = "";
}
Element.prototype.setAttribute = function (k, v) { this.attrs[k] = String(v); };
Element.prototype.getAttribute = function (k) { return k in this.attrs ? this.attrs[k] : null; };
Element.prototype.removeAttribute = function (k) { delete this.attrs[k]; };
Element.prototype.appendChild = function (child) {
  child.parent = this;
  this.children.push(child);
  return child;
};
Element.prototype.remove = function () {
  if (!this.parent) return;
  var siblings = this.parent.children;
  siblings.splice(siblings.indexOf(this), 1);
  this.parent = null;
};

var document = {
  readyState: "loading",
  head: null,
  documentElement: null,
  listeners: {},
  createElement: function (tag) { return new Element(tag); },
  querySelector: function (selector) {
    if (selector !== 'meta[name="viewport"]' || !this.head) return null;
    return viewportMetas()[0] || null;
  },
  addEventListener: function (type, fn) {
    (this.listeners[type] = this.listeners[type] || []).push(fn);
  },
  removeEventListener: function (type, fn) {
    var list = this.listeners[type] || [];
    var idx = list.indexOf(fn);
    if (idx >= 0) list.splice(idx, 1);
  },
};

function viewportMetas() {
  if (!document.head) return [];
  return document.head.children.filter(function (el) {
    return el.tagName === "meta" && el.getAttribute("name") === "viewport";
  });
}
function styles() {
  if (!document.head) return [];
  return document.head.children.filter(function (el) { return el.tagName === "style"; });
}
// parses a head, optionally with the page's own viewport meta
function parse(viewportContent) {
  document.documentElement = new Element("html");
  document.head = document.documentElement.appendChild(new Element("head"));
  if (viewportContent !== undefined) {
    var meta = document.head.appendChild(new Element("meta"));
    meta.setAttribute("name", "viewport");
    meta.setAttribute("content", viewportContent);
  }
  document.readyState = "interactive";
  (document.listeners["DOMContentLoaded"] || []).slice().forEach(function (fn) { fn(); });
}

var window = {
  location: { search: SEARCH },
  screen: {},
  matchMedia: function (query) { return { matches: false, media: query, native: true }; },
  dispatchEvent: function (event) {
    if (event.type === "resize") resizes.push(window.innerWidth + "x" + window.innerHeight);
    return true;
  },
};
Object.defineProperty(window, "innerWidth", { get: function () { return layout.width; }, configurable: true });
Object.defineProperty(window, "innerHeight", { get: function () { return layout.height; }, configurable: true });
Object.defineProperty(window.screen, "width", { get: function () { return 1920; }, configurable: true });
Object.defineProperty(window.screen, "height", { get: function () { return 1080; }, configurable: true });
"#;

    fn page(search: &str) -> Context {
        let mut context = Context::default();
        let page = PAGE.replace("SEARCH", &js_string(search));
        context.eval(Source::from_bytes(page.as_bytes())).unwrap();
        context
    }

    fn run(context: &mut Context, src: &str) -> JsValue {
        context.eval(Source::from_bytes(src.as_bytes())).unwrap()
    }

    fn number(context: &mut Context, expr: &str) -> f64 {
        run(context, expr).as_number().unwrap()
    }

    fn boolean(context: &mut Context, expr: &str) -> bool {
        run(context, expr).as_boolean().unwrap()
    }

    fn text(context: &mut Context, expr: &str) -> String {
        run(context, expr)
            .as_string()
            .unwrap()
            .to_std_string_escaped()
    }

    fn phone() -> OverrideScript {
        OverrideScript::new(SimulatedViewport::new(393, 852).unwrap())
    }

    #[test]
    fn runs_before_the_document_exists() {
        let mut page = page("?viewport=393x852");
        run(&mut page, phone().source());

        assert_eq!(number(&mut page, "window.innerWidth"), 393.);
        assert_eq!(number(&mut page, "window.innerHeight"), 852.);
        assert_eq!(number(&mut page, "window.screen.width"), 393.);
        assert_eq!(number(&mut page, "window.screen.height"), 852.);
        assert_eq!(text(&mut page, "resizes.join()"), "393x852");
        assert!(boolean(&mut page, r#"window.matchMedia("(max-width: 768px)").matches"#));
        assert!(!boolean(&mut page, r#"window.matchMedia("(min-width: 768px)").matches"#));
        assert!(boolean(&mut page, r#"window.matchMedia("(orientation: portrait)").native"#));
        assert!(boolean(&mut page, r#"typeof window["__viewframeRestore"] === "function""#));
    }

    #[test]
    fn reuses_the_pages_viewport_meta_once_parsed() {
        let mut page = page("?viewport=393x852");
        run(&mut page, phone().source());
        run(&mut page, r#"parse("width=device-width, initial-scale=1")"#);

        assert_eq!(number(&mut page, "viewportMetas().length"), 1.);
        assert_eq!(
            text(&mut page, r#"viewportMetas()[0].getAttribute("content")"#),
            "width=393, initial-scale=1.0, user-scalable=yes"
        );
        assert_eq!(number(&mut page, "styles().length"), 1.);
        assert!(text(&mut page, "styles()[0].textContent").contains("max-width: 393px !important"));

        run(&mut page, &OverrideScript::restore_expression());
        assert_eq!(
            text(&mut page, r#"viewportMetas()[0].getAttribute("content")"#),
            "width=device-width, initial-scale=1"
        );
        assert_eq!(number(&mut page, "styles().length"), 0.);
        assert_eq!(number(&mut page, "window.innerWidth"), 1280.);
        assert_eq!(text(&mut page, "resizes.join()"), "393x852,1280x800");
    }

    #[test]
    fn applies_immediately_to_a_parsed_document() {
        let mut page = page("?viewport=1920x1080");
        run(&mut page, "parse()");
        run(
            &mut page,
            OverrideScript::new(SimulatedViewport::new(1920, 1080).unwrap()).source(),
        );

        assert_eq!(number(&mut page, "viewportMetas().length"), 1.);
        assert_eq!(
            text(&mut page, r#"viewportMetas()[0].getAttribute("content")"#),
            "width=1920, initial-scale=0.8, user-scalable=yes"
        );

        assert!(boolean(&mut page, &OverrideScript::restore_expression()));
        assert_eq!(number(&mut page, "viewportMetas().length"), 0.);
        assert_eq!(number(&mut page, "styles().length"), 0.);
    }

    #[test]
    fn restore_before_parsing_leaves_the_head_alone() {
        let mut page = page("?viewport=393x852");
        run(&mut page, phone().source());
        assert!(boolean(&mut page, &OverrideScript::restore_expression()));
        run(&mut page, r#"parse("width=device-width")"#);

        assert_eq!(
            text(&mut page, r#"viewportMetas()[0].getAttribute("content")"#),
            "width=device-width"
        );
        assert_eq!(number(&mut page, "styles().length"), 0.);
        assert_eq!(number(&mut page, "window.innerWidth"), 1280.);
        assert_eq!(number(&mut page, "window.screen.width"), 1920.);
        assert!(boolean(&mut page, r#"window.matchMedia("(max-width: 768px)").native"#));
        assert!(!boolean(&mut page, &OverrideScript::restore_expression()));
    }

    #[test]
    fn other_viewport_is_left_untouched() {
        let mut page = page("?viewport=400x800");
        run(&mut page, phone().source());
        run(&mut page, "parse()");

        assert_eq!(number(&mut page, "window.innerWidth"), 1280.);
        assert_eq!(number(&mut page, "resizes.length"), 0.);
        assert_eq!(number(&mut page, "viewportMetas().length"), 0.);
        assert!(!boolean(&mut page, &OverrideScript::restore_expression()));
    }

    #[test]
    fn runs_once_per_document() {
        let mut page = page("?viewport=393x852");
        run(&mut page, phone().source());
        run(&mut page, phone().source());
        run(&mut page, "parse()");

        assert_eq!(number(&mut page, "resizes.length"), 1.);
        assert_eq!(number(&mut page, "styles().length"), 1.);
    }

    #[test]
    fn js_string_escapes() {
        assert_eq!(js_string("a\"b\n"), r#""a\"b\n""#);
    }
}
