//! Thin, cloneable handles for talking to the actors.

#[macro_use]
mod macros;

pub mod customer_client;
pub mod store_client;

pub use customer_client::*;
pub use store_client::*;
