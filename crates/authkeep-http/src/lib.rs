//! authkeep-http - HTTP transport for authkeep.

mod transport;

pub use transport::ReqwestTransport;
