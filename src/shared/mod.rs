//! Shared helpers used by the API types.

pub mod serde_util;
