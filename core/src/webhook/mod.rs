//! GitHub webhook handling
//!
//! Authenticates webhook deliveries against a per-repository secret and hands
//! verified events to the build dispatcher.

pub mod gate;
pub mod secret;
pub mod signature;

pub use gate::{handle, WebhookRequest};
