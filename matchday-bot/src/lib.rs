//! Chat front-end for the Matchday career engine.
//!
//! The transport, the player store and the subscription check are traits so
//! the conversation logic in [`service`] runs the same against the console,
//! in tests or behind a real messenger.

pub mod config;
pub mod i18n;
pub mod keyboard;
pub mod oracle;
pub mod render;
pub mod service;
pub mod store;
pub mod transport;

pub use config::{BotConfig, BotConfigError};
pub use i18n::I18nBundle;
pub use keyboard::{Button, Callback, CallbackError, Keyboard};
pub use oracle::{AllowAll, AllowList, SubscriptionOracle};
pub use service::{CareerService, Incoming, ServiceError, ServiceSettings};
pub use store::{MemoryPlayerStore, PlayerStore, StoreError};
pub use transport::{
    ConsoleSink, MessageId, MessagingSink, Recorded, RecordingSink, TransportError,
};
