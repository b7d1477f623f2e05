//! Room session management
//!
//! This module provides the `SessionController` that manages:
//! - The connect/disconnect lifecycle of a single room session
//! - Token issuance before each connect attempt
//! - Transcript assembly from data-channel messages
//! - Room directory and engine catalog refreshes
//! - Publishing state snapshots to observers

mod config;
mod controller;
mod messages;
mod state;
mod transcript;

pub use config::SessionConfig;
pub use controller::{SessionController, SessionServices};
pub use state::{SessionPhase, SessionSnapshot};
pub use transcript::{resolve_room_name, Transcript};
