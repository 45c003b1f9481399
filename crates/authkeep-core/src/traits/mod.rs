//! Seams for the storage backend and the network transport.

mod store;
mod transport;

pub use store::KeyValueStore;
pub use transport::Transport;
