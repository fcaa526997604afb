//! GitHub helpers
//!
//! Repository URLs, cache keys, and snapcraft.yaml retrieval.

pub mod manifest;
pub mod url;
