//! In-process change notifications for long-poll waiters.

pub mod bus;

pub use bus::{NotificationBus, Subscription, Topic};
