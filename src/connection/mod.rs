//! Connection to the media-browsing service.
//!
//! - [`ConnectionManager`] - lifecycle owner and listener fan-out
//! - [`ConnectionState`] / [`ConnectCycle`] - observable state and cycle ids
//! - [`ConnectionHandle`] - capability handed to listeners while connected

mod handle;
mod listener;
mod manager;
mod state;

pub use handle::ConnectionHandle;
pub use listener::{ConnectionListener, ListenerError, ListenerId};
pub use manager::ConnectionManager;
pub use state::{ConnectCycle, ConnectionState};
