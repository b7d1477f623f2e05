//! Backend RPC surface
//!
//! Token issuance, the room directory and the engine catalog are three
//! expressions evaluated by the same backend endpoint. The traits are the
//! seams the session controller depends on; [`BackendClient`] is the HTTP
//! implementation.

pub mod client;
pub mod messages;
pub mod traits;

pub use client::BackendClient;
pub use traits::{EngineCatalog, RoomDirectory, TokenIssuer};
