//! MusicBrainz API integration
//!
//! Searches releases, artists and labels, browses an artist's or label's
//! releases, and looks up full releases with their track listings. Cover
//! images come from the Cover Art Archive.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use adapter::{CoverSize, to_release};
pub use client::{MusicBrainzClient, PROVIDER_ID};
