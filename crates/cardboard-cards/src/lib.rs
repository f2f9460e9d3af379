//! The built-in demo card registry.
//!
//! Cards are immutable reference data: each one describes a titled, colored
//! content block that the window coordinator can open in a floating window.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use cardboard_common::Color;

/// Immutable content descriptor for one demo card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: Color,
    pub content: String,
}

impl Card {
    fn new(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        color: &str,
        content: &str,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            // Registry colors are literals; a bad one is a programming error.
            color: Color::from_hex(color).unwrap_or(Color::from_rgba(128, 128, 128, 255)),
            content: content.into(),
        }
    }
}

static REGISTRY: OnceLock<Vec<Card>> = OnceLock::new();

/// All built-in demo cards, in display order.
pub fn registry() -> &'static [Card] {
    REGISTRY.get_or_init(|| {
        vec![
            Card::new(
                "native-core",
                "Native Core",
                "Compiled backend driving the embedded web view",
                "gear",
                "#dea584",
                "The native core owns the process: it hosts the web view, \
                 answers bridge calls, and keeps the structured log.",
            ),
            Card::new(
                "web-frontend",
                "Web Frontend",
                "Component-based UI rendered inside the embedded view",
                "layout",
                "#dd0031",
                "The frontend is plain web technology: components, a router, \
                 and the floating-window widget for card content.",
            ),
            Card::new(
                "typed-bridge",
                "Typed Bridge",
                "Command/response channel between UI and native side",
                "plug",
                "#3178c6",
                "Every backend call is a tagged command with a typed payload; \
                 responses come back on the same channel or as host events.",
            ),
            Card::new(
                "event-bus",
                "Event Bus",
                "In-page publish/subscribe with bounded history",
                "broadcast",
                "#f7df1e",
                "UI actions publish named events; logging and telemetry \
                 subscribe without coupling to the components that fired them.",
            ),
            Card::new(
                "local-store",
                "Local Store",
                "Embedded SQLite database behind the bridge",
                "database",
                "#044a64",
                "Queries travel over the bridge as db commands; responses \
                 arrive as host events tagged db_response.",
            ),
            Card::new(
                "window-manager",
                "Window Manager",
                "Floating window lifecycle over the widget library",
                "windows",
                "#6c9ef8",
                "One entry per open window: open, focus, minimize, restore, \
                 close, with the viewport following the panel layout.",
            ),
        ]
    })
}

/// Look up a card by id.
pub fn find(id: &str) -> Option<&'static Card> {
    registry().iter().find(|c| c.id == id)
}
