//! On-screen display scale for the preview. Export never uses this.

use serde::Serialize;

/// Width the scaled page wrapper is fitted to: the 794px page plus a small buffer.
pub const TARGET_WIDTH_PX: f32 = 830.0;
/// Viewports narrower than this get the wider mobile padding.
pub const MOBILE_BREAKPOINT_PX: f32 = 768.0;
const MOBILE_PADDING_PX: f32 = 48.0;
const DESKTOP_PADDING_PX: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayScale {
    pub scale: f32,
    pub padding: f32,
    pub available_width: f32,
}

/// `min(1, max(0, container - padding) / 830)`. Never enlarges the page.
pub fn display_scale(container_width: f32, viewport_width: f32) -> DisplayScale {
    let padding = if viewport_width < MOBILE_BREAKPOINT_PX {
        MOBILE_PADDING_PX
    } else {
        DESKTOP_PADDING_PX
    };
    let available_width = (container_width - padding).max(0.0);
    DisplayScale {
        scale: (available_width / TARGET_WIDTH_PX).min(1.0),
        padding,
        available_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_container_caps_at_one() {
        assert_eq!(display_scale(1600.0, 1920.0).scale, 1.0);
    }

    #[test]
    fn test_desktop_padding() {
        let s = display_scale(447.0, 1024.0);
        assert_eq!(s.padding, 32.0);
        assert!((s.scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_mobile_padding() {
        let s = display_scale(463.0, 500.0);
        assert_eq!(s.padding, 48.0);
        assert!((s.scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_container_clamps_to_zero() {
        let s = display_scale(10.0, 320.0);
        assert_eq!(s.available_width, 0.0);
        assert_eq!(s.scale, 0.0);
    }
}
