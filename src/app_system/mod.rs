//! System orchestration, startup, and shutdown logic.

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use tracing::*;
