//! Core types - pure abstractions shared across the codebase.

mod mode;
mod state;

pub use mode::{Arch, BuildMode};
pub use state::{register_session, setup_shutdown_handler, shutdown_requested};
