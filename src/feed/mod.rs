//! Tick feed module
//!
//! Tick types, endpoint derivation and the reconnecting feed connection

mod connection;
mod endpoint;
mod types;

pub use connection::{Connection, ConnectionEvent, ConnectionManager};
pub use endpoint::{Endpoint, EndpointError};
pub use types::{ReadyState, Tick};
