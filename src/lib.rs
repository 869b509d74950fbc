//! Discog Mediator - import music releases from metadata providers.
//!
//! A [`mediator::Mediator`] drives a provider adapter (Discogs, MusicBrainz)
//! and an entity adapter (SQLite) through search, browsing, release fetch,
//! category and image resolution, and persistence.

pub mod cli;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod mediator;
pub mod model;
pub mod provider;
pub mod registry;
pub mod resolve;
#[cfg(test)]
pub mod test_utils;
