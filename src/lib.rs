//! Checkout for a food-ordering service.
//!
//! A cart becomes exactly one persisted [`Order`](domain::Order) with the matching
//! stock decrements, or a [`CheckoutFailure`](checkout::CheckoutFailure) that left the
//! inventory untouched. Every stateful component is an actor behind a cloneable client:
//!
//! - [`store::StoreService`]: items and orders, committed atomically per transaction
//! - [`actor_framework::ResourceActor`]: the customer directory
//! - [`notifications::NotificationService`]: emails and inventory broadcasts, after commit
//!
//! [`app_system::OrderSystem`] starts and wires them; [`checkout::CheckoutEngine`] drives
//! a checkout across them.

pub mod actor_framework;
pub mod app_system;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod customer_actor;
pub mod domain;
pub mod messages;
pub mod notifications;
pub mod store;
pub mod validator;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, OrderSystem};
pub use checkout::{CheckoutEngine, CheckoutFailure, FailureKind, FailureResponse};
pub use config::{Config, ConfigError};
