//! Panel layout: two collapsible chrome regions (top and bottom) whose state
//! determines the rectangle available to floating windows.
//!
//! Toggling a panel starts a CSS transition on the web side. Rather than
//! guessing the transition duration, a toggle only marks a reflow pending;
//! the host calls `transition_ended` when the transition actually finishes,
//! and that performs the reflow exactly once.

use cardboard_common::{BottomTab, Rect};

/// Height of the always-visible top bar.
pub const TOP_BAR_HEIGHT: f64 = 48.0;
/// Additional height of the top panel content when expanded.
pub const TOP_CONTENT_HEIGHT: f64 = 120.0;
/// Height of the always-visible bottom tab strip.
pub const BOTTOM_BAR_HEIGHT: f64 = 36.0;
/// Additional height of the bottom panel content when expanded.
pub const BOTTOM_CONTENT_HEIGHT: f64 = 180.0;
/// Padding between panel chrome and the window area.
pub const VIEWPORT_PADDING: f64 = 8.0;
/// The window area never shrinks below this height.
pub const MIN_VIEWPORT_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    top_collapsed: bool,
    bottom_collapsed: bool,
    active_tab: BottomTab,
    reflow_pending: bool,
}

impl PanelLayout {
    /// Both panels start expanded with the console tab active.
    pub fn new() -> Self {
        Self {
            top_collapsed: false,
            bottom_collapsed: false,
            active_tab: BottomTab::Console,
            reflow_pending: false,
        }
    }

    pub fn top_collapsed(&self) -> bool {
        self.top_collapsed
    }

    pub fn bottom_collapsed(&self) -> bool {
        self.bottom_collapsed
    }

    pub fn active_tab(&self) -> BottomTab {
        self.active_tab
    }

    pub fn toggle_top(&mut self) {
        self.top_collapsed = !self.top_collapsed;
        self.reflow_pending = true;
    }

    pub fn toggle_bottom(&mut self) {
        self.bottom_collapsed = !self.bottom_collapsed;
        self.reflow_pending = true;
    }

    pub fn set_active_tab(&mut self, tab: BottomTab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.reflow_pending = true;
        }
    }

    /// Consume the pending-reflow flag. Returns `true` exactly once per
    /// toggle/tab-switch burst; callers reflow windows when it does.
    pub fn transition_ended(&mut self) -> bool {
        std::mem::take(&mut self.reflow_pending)
    }

    pub fn reflow_pending(&self) -> bool {
        self.reflow_pending
    }

    /// The rectangle available to floating windows for a page of the given
    /// size.
    pub fn viewport(&self, page_width: f64, page_height: f64) -> Rect {
        let top = TOP_BAR_HEIGHT
            + if self.top_collapsed {
                0.0
            } else {
                TOP_CONTENT_HEIGHT
            };
        let bottom = BOTTOM_BAR_HEIGHT
            + if self.bottom_collapsed {
                0.0
            } else {
                BOTTOM_CONTENT_HEIGHT
            };

        let width = (page_width - 2.0 * VIEWPORT_PADDING).max(0.0);
        let height =
            (page_height - top - bottom - 2.0 * VIEWPORT_PADDING).max(MIN_VIEWPORT_HEIGHT);

        Rect {
            x: VIEWPORT_PADDING,
            y: top + VIEWPORT_PADDING,
            width,
            height,
        }
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_W: f64 = 1280.0;
    const PAGE_H: f64 = 800.0;

    #[test]
    fn expanded_panels_shrink_viewport() {
        let layout = PanelLayout::new();
        let rect = layout.viewport(PAGE_W, PAGE_H);

        assert_eq!(rect.x, VIEWPORT_PADDING);
        assert_eq!(rect.y, TOP_BAR_HEIGHT + TOP_CONTENT_HEIGHT + VIEWPORT_PADDING);
        assert_eq!(rect.width, PAGE_W - 2.0 * VIEWPORT_PADDING);
        let expected_height = PAGE_H
            - (TOP_BAR_HEIGHT + TOP_CONTENT_HEIGHT)
            - (BOTTOM_BAR_HEIGHT + BOTTOM_CONTENT_HEIGHT)
            - 2.0 * VIEWPORT_PADDING;
        assert_eq!(rect.height, expected_height);
    }

    #[test]
    fn collapsing_both_panels_grows_viewport() {
        let mut layout = PanelLayout::new();
        let before = layout.viewport(PAGE_W, PAGE_H);
        layout.toggle_top();
        layout.toggle_bottom();
        let after = layout.viewport(PAGE_W, PAGE_H);

        assert!(after.height > before.height);
        assert_eq!(after.y, TOP_BAR_HEIGHT + VIEWPORT_PADDING);
        assert_eq!(
            after.height - before.height,
            TOP_CONTENT_HEIGHT + BOTTOM_CONTENT_HEIGHT
        );
    }

    #[test]
    fn viewport_height_clamps_at_minimum() {
        let layout = PanelLayout::new();
        let rect = layout.viewport(640.0, 300.0);
        assert_eq!(rect.height, MIN_VIEWPORT_HEIGHT);
    }

    #[test]
    fn toggle_marks_reflow_pending_once() {
        let mut layout = PanelLayout::new();
        assert!(!layout.reflow_pending());

        layout.toggle_top();
        assert!(layout.reflow_pending());

        assert!(layout.transition_ended());
        // Second signal without a new toggle is a no-op.
        assert!(!layout.transition_ended());
    }

    #[test]
    fn tab_switch_marks_reflow_pending() {
        let mut layout = PanelLayout::new();
        layout.set_active_tab(BottomTab::Errors);
        assert_eq!(layout.active_tab(), BottomTab::Errors);
        assert!(layout.transition_ended());
    }

    #[test]
    fn setting_same_tab_is_a_no_op() {
        let mut layout = PanelLayout::new();
        layout.set_active_tab(BottomTab::Console);
        assert!(!layout.reflow_pending());
    }

    #[test]
    fn burst_of_toggles_coalesces_into_one_reflow() {
        let mut layout = PanelLayout::new();
        layout.toggle_top();
        layout.toggle_bottom();
        layout.set_active_tab(BottomTab::Events);
        assert!(layout.transition_ended());
        assert!(!layout.transition_ended());
    }
}
