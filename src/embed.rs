//! Composing the URL and embedding element for a simulated frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::viewport::{SimulatedViewport, VIEWPORT_PARAM};

/// Appends `viewport=<w>x<h>` to `target`.
///
/// This is plain string composition and never rejects its input: the separator
/// is `?` when `target` has no query yet and `&` otherwise, a `#fragment` is
/// kept at the end and an existing `viewport` pair is replaced.
pub fn embedding_url(target: &str, viewport: &SimulatedViewport) -> String {
    let (base, fragment) = match target.find('#') {
        Some(idx) => target.split_at(idx),
        None => (target, ""),
    };
    let (path, query) = match base.find('?') {
        Some(idx) => (&base[..idx], Some(&base[idx + 1..])),
        None => (base, None),
    };

    let mut url = String::with_capacity(target.len() + 24);
    url.push_str(path);
    url.push('?');
    if let Some(query) = query {
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let key = pair.split('=').next().unwrap_or(pair);
            if key == VIEWPORT_PARAM {
                continue;
            }
            url.push_str(pair);
            url.push('&');
        }
    }
    url.push_str(&viewport.query_pair());
    url.push_str(fragment);
    url
}

/// Capabilities granted to the embedded browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sandbox {
    pub allow_same_origin: bool,
    pub allow_scripts: bool,
    pub allow_forms: bool,
}

impl Default for Sandbox {
    /// Same-origin access, scripts and forms. No top navigation, no popups.
    fn default() -> Self {
        Self {
            allow_same_origin: true,
            allow_scripts: true,
            allow_forms: true,
        }
    }
}

impl fmt::Display for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.allow_same_origin, "allow-same-origin"),
            (self.allow_scripts, "allow-scripts"),
            (self.allow_forms, "allow-forms"),
        ];
        let tokens = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, token)| *token)
            .collect::<Vec<_>>();
        f.write_str(&tokens.join(" "))
    }
}

/// Everything needed to embed one target page at a simulated viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    url: String,
    viewport: SimulatedViewport,
    sandbox: Sandbox,
}

impl Embedding {
    pub fn new(target: &str, viewport: SimulatedViewport, sandbox: Sandbox) -> Self {
        Self {
            url: embedding_url(target, &viewport),
            viewport,
            sandbox,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn viewport(&self) -> &SimulatedViewport {
        &self.viewport
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Renders the `<iframe>` for hosts that place frames in an HTML page.
    ///
    /// The frame keeps its nominal size and is shrunk with a CSS transform
    /// anchored at the top left corner.
    pub fn iframe_html(&self, scale: f64) -> String {
        format!(
            r#"<iframe src="{src}" sandbox="{sandbox}" width="{w}" height="{h}" style="border:0;width:{w}px;height:{h}px;transform:scale({scale});transform-origin:0 0"></iframe>"#,
            src = escape_attr(&self.url),
            sandbox = self.sandbox,
            w = self.viewport.width(),
            h = self.viewport.height(),
            scale = scale,
        )
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
