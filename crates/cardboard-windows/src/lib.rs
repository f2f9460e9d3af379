//! Floating-window coordination: the window registry, the panel layout that
//! determines the available viewport, and the trait seam for the third-party
//! floating-window widget.

pub mod coordinator;
pub mod panels;
pub mod widget;

pub use coordinator::{NullSink, StateSink, WindowCoordinator, WindowEntry, WindowStateReport};
pub use panels::PanelLayout;
pub use widget::{
    HeadlessFactory, HeadlessState, HeadlessWidget, WidgetFactory, WidgetOptions, WindowWidget,
};
