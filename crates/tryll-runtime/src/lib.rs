// Runtime layer - everything that touches the network or the filesystem.
// The engine stays pure; this crate drives it from transport events,
// timers and user commands, and reports back through WidgetEvents.

pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod reconnect;
pub mod transport;
pub mod widget;

pub use api::{ChatApi, HttpChatApi};
pub use config::{ClientSettings, ReconnectSettings, resolve_config_path};
pub use error::{Error, Result};
pub use events::WidgetEvent;
pub use reconnect::{ReconnectPolicy, ReconnectState};
pub use transport::{Connection, Connector, TransportEvent, WebSocketConnector};
pub use widget::{ChatWidget, WidgetHandle};
