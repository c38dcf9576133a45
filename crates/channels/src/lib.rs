//! Chat-platform client contract and fan-out delivery.
//!
//! A platform binding implements [`ChatClient`] (channel lookup) and
//! [`ChatChannel`] (plain and rich sends). [`deliver`] sends one payload to a
//! list of channel ids with per-channel failure isolation.

pub mod client;
pub mod delivery;
pub mod embed;
pub mod error;
pub mod recording;

pub use {
    client::{ChatChannel, ChatClient},
    delivery::{DEFAULT_SEND_TIMEOUT, DeliveryReport, Payload, deliver},
    embed::{Embed, EmbedField},
    error::{Error, Result},
    recording::{RecordingClient, Sent},
};
