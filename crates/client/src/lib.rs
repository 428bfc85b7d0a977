//! Client code for cairn.
//!
//! This crate provides the HTTP client one instance uses to run cache
//! admin operations on a peer instance.

pub mod error;
pub mod instance;

pub use error::ClientError;
pub use instance::{InstanceClient, InstanceClientConfig};
