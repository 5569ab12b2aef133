//! The stylesheet injected into a page while a viewport is simulated.

use crate::viewport::{SimulatedViewport, MOBILE_MAX_WIDTH};

/// Utility classes commonly used as centered page containers.
pub const CONTAINER_CLASSES: [&str; 3] = [".container", ".max-w-screen-xl", ".max-w-7xl"];

/// Builds the simulation stylesheet for `viewport`.
///
/// The body is capped at the simulated width. Horizontal overflow is clipped
/// below 768px. At mobile widths the container classes above are forced to the
/// simulated width with a small horizontal padding, which only helps pages that
/// use those exact class names.
pub fn simulation_stylesheet(viewport: &SimulatedViewport) -> String {
    let width = viewport.width();
    let overflow = if width < MOBILE_MAX_WIDTH {
        "hidden"
    } else {
        "auto"
    };

    let mut css = format!(
        "body {{\n  max-width: {width}px !important;\n  overflow-x: {overflow};\n}}\n"
    );
    if width <= MOBILE_MAX_WIDTH {
        css.push_str("* {\n  box-sizing: border-box;\n}\n");
        css.push_str(&format!(
            "{} {{\n  max-width: {width}px !important;\n  padding-left: 1rem !important;\n  padding-right: 1rem !important;\n}}\n",
            CONTAINER_CLASSES.join(", ")
        ));
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    fn css(width: u32) -> String {
        simulation_stylesheet(&SimulatedViewport::new(width, 600).unwrap())
    }

    #[test]
    fn mobile_width_clips_and_forces_containers() {
        let css = css(393);
        assert!(css.contains("max-width: 393px !important"));
        assert!(css.contains("overflow-x: hidden"));
        assert!(css.contains(".container, .max-w-screen-xl, .max-w-7xl {"));
        assert!(css.contains("padding-left: 1rem !important"));
        assert!(css.contains("box-sizing: border-box"));
    }

    #[test]
    fn exactly_768_keeps_overflow_but_forces_containers() {
        let css = css(768);
        assert!(css.contains("overflow-x: auto"));
        assert!(css.contains(".max-w-7xl"));
    }

    #[test]
    fn wide_viewport_only_caps_body() {
        let css = css(1440);
        assert!(css.contains("max-width: 1440px !important"));
        assert!(css.contains("overflow-x: auto"));
        assert!(!css.contains(".container"));
        assert!(!css.contains("padding-left"));
    }
}
