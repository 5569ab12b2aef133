use serde::{Deserialize, Serialize};

use crate::env::Window;

/// Expression evaluated inside a page to read back the size it reports.
pub const REPORTED_VIEWPORT_PROBE: &str = "({ innerWidth: window.innerWidth, innerHeight: window.innerHeight, screenWidth: window.screen.width, screenHeight: window.screen.height })";

/// The sizes a page observes about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedViewport {
    pub inner_width: u32,
    pub inner_height: u32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl From<&Window> for ReportedViewport {
    fn from(window: &Window) -> Self {
        Self {
            inner_width: window.inner_width(),
            inner_height: window.inner_height(),
            screen_width: window.screen_width(),
            screen_height: window.screen_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_reported_sizes() {
        let value = serde_json::json!({
            "innerWidth": 393,
            "innerHeight": 852,
            "screenWidth": 393,
            "screenHeight": 852
        });
        let reported: ReportedViewport = serde_json::from_value(value).unwrap();
        assert_eq!(reported.inner_width, 393);
        assert_eq!(reported.screen_height, 852);
    }
}
