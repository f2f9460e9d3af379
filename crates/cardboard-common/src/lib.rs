pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{
    BridgeError, CardboardError, ConfigError, ErrorCode, ErrorReport, WidgetError,
};
pub use events::{BusEvent, BusStats, EventBus, SubscribeOptions, SubscriptionId};
pub use id::{new_correlation_id, new_event_id};
pub use types::{BottomTab, Color, Rect, WindowId, WindowState};

pub type Result<T> = std::result::Result<T, CardboardError>;
