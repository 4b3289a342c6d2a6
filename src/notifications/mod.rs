//! Fire-and-forget notifications sent after a checkout commits.
//!
//! Producers enqueue through a [`NotificationDispatcher`]; the
//! [`NotificationService`] actor composes messages and hands them to a [`Notifier`].

pub mod compose;
pub mod dispatcher;
pub mod service;

pub use compose::{EmailMessage, Notification};
pub use dispatcher::*;
pub use service::*;
