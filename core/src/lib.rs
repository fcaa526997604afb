//! snaphook-core: Platform-agnostic core logic for the snap build webhook
//!
//! This crate authenticates GitHub webhook deliveries against per-repository
//! secrets and dispatches snap builds for verified pushes. It depends only on
//! abstract platform traits (Cache, HttpClient, Clock, Environment,
//! ProjectRegistry, BuildQueue) and never imports platform-specific code.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod github;
pub mod launchpad;
pub mod platform;
pub mod webhook;

#[cfg(test)]
pub mod test_support;
