//! Dispatches notifications to registered backends.
//!
//! The [`Manager`] keeps a registry of named [`Notifier`](crate::core::Notifier)
//! implementations and offers single-target sends, broadcasts that collect
//! per-backend failures, and streaming broadcasts. The remaining modules are
//! the bundled backends.
mod http;
pub mod logging;
pub mod manager;
pub mod slack;
pub mod telegram;

pub use logging::LogNotifier;
pub use manager::Manager;
pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;
