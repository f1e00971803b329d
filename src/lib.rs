/// multinotify - send notifications to many chat backends at once
///
/// This library keeps a registry of named notification backends and
/// dispatches messages to one of them, or to all of them with per-backend
/// results.
pub mod notification;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod global;
pub mod services;

// Re-export core types for convenience
pub use crate::core::*;
pub use error::{ErrorKind, NotificationError};
pub use notification::Manager;
pub use tokio_util::sync::CancellationToken;
