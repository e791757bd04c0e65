//! Alert delivery.
//!
//! Transitions are turned into [`Notification`]s and fanned out by the
//! [`DestinationRouter`] to every destination whose filter matches the
//! endpoint.

pub mod gotify;
pub mod message;
pub mod router;
pub mod types;

pub use gotify::{GotifyNotifier, Notifier};
pub use router::{Destination, DestinationRouter};
pub use types::{DeliveryError, DeliveryOutcome, DestinationConfig, Notification, Severity};
