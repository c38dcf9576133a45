//! Shared types and error definitions used across all logrelay crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, FromMessage, Result},
    types::ChannelId,
};
