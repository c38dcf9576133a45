//! Tag-based routing of log entries to chat channels.
//!
//! A [`RoutingTable`] maps tags to ordered channel lists. Resolution visits
//! every entry in declaration order:
//! 1. Exact tag match contributes its channels
//! 2. The wildcard entry (empty tag) contributes its channels as well
//!
//! Both can fire for one entry. Channel ids are never deduplicated.

pub mod error;
pub mod table;

pub use {
    error::{Error, Result},
    table::{Route, RoutingTable, WILDCARD},
};
