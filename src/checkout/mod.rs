//! The checkout transaction engine and its failure taxonomy.

pub mod engine;
pub mod error;

pub use engine::*;
pub use error::*;
