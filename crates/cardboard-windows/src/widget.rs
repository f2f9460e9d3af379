//! Trait seam for the third-party floating-window widget.
//!
//! The real widget library lives on the web side; this crate only consumes
//! it through `WindowWidget` / `WidgetFactory`. `HeadlessWidget` is the
//! in-process implementation used by tests and the demo binary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cardboard_common::{Color, Rect, WidgetError, WindowId};

/// Options passed to the widget constructor.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub id: WindowId,
    pub title: String,
    pub background: Color,
    pub rect: Rect,
}

/// Imperative handle to one floating window. Every call can fail inside the
/// widget library; the coordinator decides what to do with the error.
pub trait WindowWidget: Send {
    fn focus(&mut self) -> Result<(), WidgetError>;
    fn restore(&mut self) -> Result<(), WidgetError>;
    fn minimize(&mut self) -> Result<(), WidgetError>;
    fn resize(&mut self, width: f64, height: f64) -> Result<(), WidgetError>;
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WidgetError>;
    fn close(&mut self) -> Result<(), WidgetError>;
}

/// Constructs widgets. Injected into the coordinator so the widget library
/// stays replaceable.
pub trait WidgetFactory: Send {
    fn create(&mut self, options: WidgetOptions) -> Result<Box<dyn WindowWidget>, WidgetError>;
}

/// Observable state of a headless widget, shared with its factory for
/// inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessState {
    pub title: String,
    pub rect: Rect,
    pub minimized: bool,
    pub focused: bool,
    pub closed: bool,
}

pub struct HeadlessWidget {
    state: Arc<Mutex<HeadlessState>>,
    /// When set, geometry calls fail. Lets tests exercise the
    /// cosmetic-failure policy.
    fail_geometry: bool,
}

impl HeadlessWidget {
    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HeadlessState>, WidgetError> {
        let state = self.state.lock().unwrap();
        if state.closed {
            return Err(WidgetError::Closed(state.title.clone()));
        }
        Ok(state)
    }
}

impl WindowWidget for HeadlessWidget {
    fn focus(&mut self) -> Result<(), WidgetError> {
        let mut state = self.guard()?;
        state.focused = true;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), WidgetError> {
        let mut state = self.guard()?;
        state.minimized = false;
        Ok(())
    }

    fn minimize(&mut self) -> Result<(), WidgetError> {
        let mut state = self.guard()?;
        state.minimized = true;
        state.focused = false;
        Ok(())
    }

    fn resize(&mut self, width: f64, height: f64) -> Result<(), WidgetError> {
        if self.fail_geometry {
            return Err(WidgetError::Geometry("resize rejected".into()));
        }
        let mut state = self.guard()?;
        state.rect.width = width;
        state.rect.height = height;
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64) -> Result<(), WidgetError> {
        if self.fail_geometry {
            return Err(WidgetError::Geometry("move rejected".into()));
        }
        let mut state = self.guard()?;
        state.rect.x = x;
        state.rect.y = y;
        Ok(())
    }

    fn close(&mut self) -> Result<(), WidgetError> {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        state.focused = false;
        Ok(())
    }
}

/// Factory for headless widgets. Keeps a handle to every created widget's
/// state so callers can observe what the "widget library" did. Clones share
/// the same state map, so a clone kept outside the coordinator still sees
/// every widget.
#[derive(Default, Clone)]
pub struct HeadlessFactory {
    states: Arc<Mutex<HashMap<WindowId, Arc<Mutex<HeadlessState>>>>>,
    fail_geometry: bool,
    fail_create: bool,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every geometry call on created widgets fail.
    pub fn with_fail_geometry(mut self) -> Self {
        self.fail_geometry = true;
        self
    }

    /// Make `create` itself fail.
    pub fn with_fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn state(&self, id: &WindowId) -> Option<HeadlessState> {
        self.states
            .lock()
            .unwrap()
            .get(id)
            .map(|s| s.lock().unwrap().clone())
    }
}

impl WidgetFactory for HeadlessFactory {
    fn create(&mut self, options: WidgetOptions) -> Result<Box<dyn WindowWidget>, WidgetError> {
        if self.fail_create {
            return Err(WidgetError::Create(format!(
                "widget library refused '{}'",
                options.title
            )));
        }
        let state = Arc::new(Mutex::new(HeadlessState {
            title: options.title,
            rect: options.rect,
            minimized: false,
            focused: false,
            closed: false,
        }));
        self.states
            .lock()
            .unwrap()
            .insert(options.id, state.clone());
        Ok(Box::new(HeadlessWidget {
            state,
            fail_geometry: self.fail_geometry,
        }))
    }
}
