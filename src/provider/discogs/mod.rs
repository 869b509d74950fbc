//! Discogs database integration
//!
//! Search types: releases, artists, labels and catalog numbers. Artists and
//! labels are intermediate entities that must be browsed for releases.
//!
//! API docs: https://www.discogs.com/developers

pub mod dto;
mod adapter;
mod client;

pub use adapter::{to_children_page, to_parent_info, to_release, to_search_page};
pub use client::{DiscogsClient, PROVIDER_ID};
