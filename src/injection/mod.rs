//! Keeps the host's injection slot in sync with what is playing

pub mod controller;

pub use controller::{InjectionController, InjectionError, InjectionState};

/// Key of the extension's injection slot in the host
pub const INJECT_ID: &str = "roon_inject";

/// Shortest poll interval the timer accepts, in milliseconds
pub const MIN_POLL_INTERVAL_MS: u64 = 100;
