//! Lodestone roster source
//!
//! Fetches a Free Company's member list from a Lodestone community API
//! (JSON over HTTP) and maps it into the domain's raw roster entries.
//! Implements the [`RosterSource`] adapter trait.
//!
//! [`RosterSource`]: lodebook_core::traits::RosterSource

pub mod client;
pub mod config;
pub mod error;

pub use client::LodestoneClient;
pub use config::LodestoneConfig;
pub use error::{LodestoneError, LodestoneResult};
