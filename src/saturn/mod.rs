//! Saturn module - Client implementation for the Saturn Network ticker API

pub mod client;
pub mod messages;
pub mod paper;
pub mod rest;

pub use client::SaturnVenue;
pub use paper::{PaperSigner, PaperTrade};
pub use rest::SaturnRestClient;
