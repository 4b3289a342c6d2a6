//! Customer directory backed by the generic resource actor.

pub mod entity;
pub mod error;

pub use error::*;
