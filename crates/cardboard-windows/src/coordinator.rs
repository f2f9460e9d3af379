//! The WindowCoordinator tracks one entry per open floating window and
//! drives the widget library through its trait seam.
//!
//! Geometry calls into the widget are best-effort: a failed resize or move
//! is cosmetic, so it is logged at `warn` and never propagated. Lifecycle
//! state changes publish a bus event and a state report for the backend.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use cardboard_cards::Card;
use cardboard_common::{EventBus, Rect, WidgetError, WindowId, WindowState};

use crate::widget::{WidgetFactory, WidgetOptions, WindowWidget};

/// Bookkeeping for one open window. Invariant: at most one entry has
/// `focused == true` at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub id: WindowId,
    pub title: String,
    pub minimized: bool,
    pub focused: bool,
}

/// State-change report mirrored to the backend logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStateReport {
    pub window_id: String,
    pub state: WindowState,
    pub title: String,
    pub timestamp: String,
}

impl WindowStateReport {
    fn new(id: &WindowId, title: &str, state: WindowState) -> Self {
        Self {
            window_id: id.to_string(),
            state,
            title: title.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Receives window state reports; the app wires this to the bridge.
pub trait StateSink: Send {
    fn window_state(&self, report: &WindowStateReport);
}

/// Discards all reports. Useful for tests that only care about entries.
pub struct NullSink;

impl StateSink for NullSink {
    fn window_state(&self, _report: &WindowStateReport) {}
}

pub struct WindowCoordinator {
    entries: Vec<WindowEntry>,
    widgets: HashMap<WindowId, Box<dyn WindowWidget>>,
    factory: Box<dyn WidgetFactory>,
    bus: Arc<EventBus>,
    sink: Box<dyn StateSink>,
}

impl WindowCoordinator {
    pub fn new(
        factory: Box<dyn WidgetFactory>,
        bus: Arc<EventBus>,
        sink: Box<dyn StateSink>,
    ) -> Self {
        Self {
            entries: Vec::new(),
            widgets: HashMap::new(),
            factory,
            bus,
            sink,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn window_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[WindowEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &WindowId) -> Option<&WindowEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn focused(&self) -> Option<&WindowEntry> {
        self.entries.iter().find(|e| e.focused)
    }

    // -----------------------------------------------------------------------
    // Opening
    // -----------------------------------------------------------------------

    /// Open the window for a card, or restore/focus it if already open.
    /// The window is positioned to fill `viewport`.
    pub fn open_card(&mut self, card: &Card, viewport: Rect) -> Result<(), WidgetError> {
        let id = WindowId::for_card(&card.id);

        if self.entry(&id).is_some() {
            debug!(window = %id, "card already open, restoring");
            if let Some(widget) = self.widgets.get_mut(&id) {
                log_cosmetic(widget.restore(), &id, "restore");
                log_cosmetic(widget.focus(), &id, "focus");
                apply_geometry(widget.as_mut(), &id, viewport);
            }
            self.set_entry_state(&id, |e| {
                e.minimized = false;
            });
            self.set_focus(&id);
            self.bus
                .publish("window:activated", json!({ "id": id.to_string() }));
            self.report(&id, WindowState::Restored);
            return Ok(());
        }

        let mut widget = self.factory.create(WidgetOptions {
            id: id.clone(),
            title: card.title.clone(),
            background: card.color,
            rect: viewport,
        })?;
        log_cosmetic(widget.focus(), &id, "focus");
        self.widgets.insert(id.clone(), widget);

        self.entries.push(WindowEntry {
            id: id.clone(),
            title: card.title.clone(),
            minimized: false,
            focused: false,
        });
        self.set_focus(&id);

        self.bus.publish(
            "window:opened",
            json!({ "id": id.to_string(), "title": card.title }),
        );
        self.report(&id, WindowState::Focused);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    /// Focus and restore a tracked window. If the entry and the widget have
    /// desynchronized, prune the stale side instead. Returns `true` when a
    /// window was actually activated.
    pub fn activate(&mut self, id: &WindowId) -> bool {
        let has_entry = self.entry(id).is_some();
        let has_widget = self.widgets.contains_key(id);

        match (has_entry, has_widget) {
            (true, true) => {
                if let Some(widget) = self.widgets.get_mut(id) {
                    log_cosmetic(widget.restore(), id, "restore");
                    log_cosmetic(widget.focus(), id, "focus");
                }
                self.set_entry_state(id, |e| {
                    e.minimized = false;
                });
                self.set_focus(id);
                self.report(id, WindowState::Focused);
                true
            }
            (true, false) => {
                warn!(window = %id, "entry without widget, pruning");
                self.entries.retain(|e| &e.id != id);
                false
            }
            (false, true) => {
                warn!(window = %id, "widget without entry, pruning");
                if let Some(mut widget) = self.widgets.remove(id) {
                    log_cosmetic(widget.close(), id, "close");
                }
                false
            }
            (false, false) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------------

    /// Minimize every open window and clear focus — the "return to home"
    /// action.
    pub fn show_main_menu(&mut self) {
        let ids: Vec<WindowId> = self.entries.iter().map(|e| e.id.clone()).collect();
        for id in &ids {
            if let Some(widget) = self.widgets.get_mut(id) {
                log_cosmetic(widget.minimize(), id, "minimize");
            }
        }
        for entry in &mut self.entries {
            entry.minimized = true;
            entry.focused = false;
        }
        for id in &ids {
            self.report(id, WindowState::Minimized);
        }
        self.bus.publish("menu:shown", json!({ "windows": ids.len() }));
    }

    /// Close every tracked window and clear all entries.
    pub fn close_all(&mut self) {
        for (id, widget) in self.widgets.iter_mut() {
            log_cosmetic(widget.close(), id, "close");
        }
        let closed: Vec<(WindowId, String)> = self
            .entries
            .iter()
            .map(|e| (e.id.clone(), e.title.clone()))
            .collect();
        self.widgets.clear();
        self.entries.clear();
        for (id, title) in &closed {
            self.sink
                .window_state(&WindowStateReport::new(id, title, WindowState::Closed));
        }
        self.bus
            .publish("windows:cleared", json!({ "closed": closed.len() }));
    }

    // -----------------------------------------------------------------------
    // Widget lifecycle callbacks
    // -----------------------------------------------------------------------

    /// Apply a lifecycle callback from the widget library. The library
    /// controls callback order; this only keeps the entry table consistent.
    /// Returns `false` for windows this coordinator does not track.
    pub fn handle_widget_state(&mut self, id: &WindowId, state: WindowState) -> bool {
        // Captured up front: the Closed arm removes the entry, and the state
        // report must still carry the title.
        let title = match self.entry(id) {
            Some(entry) => entry.title.clone(),
            None => {
                warn!(window = %id, ?state, "state callback for untracked window");
                return false;
            }
        };

        match state {
            WindowState::Focused => self.set_focus(id),
            WindowState::Blurred => self.set_entry_state(id, |e| {
                e.focused = false;
            }),
            WindowState::Minimized => self.set_entry_state(id, |e| {
                e.minimized = true;
                e.focused = false;
            }),
            WindowState::Restored | WindowState::Maximized => self.set_entry_state(id, |e| {
                e.minimized = false;
            }),
            WindowState::Closed => {
                self.entries.retain(|e| &e.id != id);
                self.widgets.remove(id);
            }
        }

        self.bus.publish(
            "window:state",
            json!({ "id": id.to_string(), "state": state }),
        );
        self.sink
            .window_state(&WindowStateReport::new(id, &title, state));
        true
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// Re-apply the viewport rectangle to every open, non-minimized window.
    pub fn reflow(&mut self, viewport: Rect) {
        let open: Vec<WindowId> = self
            .entries
            .iter()
            .filter(|e| !e.minimized)
            .map(|e| e.id.clone())
            .collect();
        for id in open {
            if let Some(widget) = self.widgets.get_mut(&id) {
                apply_geometry(widget.as_mut(), &id, viewport);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn set_focus(&mut self, id: &WindowId) {
        for entry in &mut self.entries {
            entry.focused = &entry.id == id;
        }
    }

    fn set_entry_state(&mut self, id: &WindowId, apply: impl FnOnce(&mut WindowEntry)) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.id == id) {
            apply(entry);
        }
    }

    fn report(&self, id: &WindowId, state: WindowState) {
        let title = self
            .entry(id)
            .map(|e| e.title.clone())
            .unwrap_or_default();
        self.sink
            .window_state(&WindowStateReport::new(id, &title, state));
    }
}

fn apply_geometry(widget: &mut dyn WindowWidget, id: &WindowId, rect: Rect) {
    log_cosmetic(widget.resize(rect.width, rect.height), id, "resize");
    log_cosmetic(widget.move_to(rect.x, rect.y), id, "move");
}

fn log_cosmetic(result: Result<(), WidgetError>, id: &WindowId, op: &str) {
    if let Err(e) = result {
        warn!(window = %id, op, "widget call failed: {e}");
    }
}
