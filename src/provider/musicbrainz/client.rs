//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.
//! Callers importing in bulk must pace their own calls.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::adapter::{self, CoverSize};
use super::dto;
use crate::model::{ChildrenPage, ProviderInfo, ReleaseRecord, SearchResultPage};
use crate::provider::{PageCursor, ProviderAdapter, ProviderError, SearchQuery};

/// Registry id of this provider
pub const PROVIDER_ID: &str = "musicbrainz";

/// User agent string - MusicBrainz requires this
const USER_AGENT: &str = concat!(
    "DiscogMediator/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/discog-mediator)"
);

/// MusicBrainz caps `limit` at 100
const MAX_LIMIT: usize = 100;

const RELEASE_INCLUDES: &str = "artist-credits+labels+recordings+genres+release-groups";

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    cover_size: CoverSize,
}

impl MusicBrainzClient {
    /// Create a new client
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url("https://musicbrainz.org/ws/2")
    }

    /// Create a client against a custom base URL (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            cover_size: CoverSize::default(),
        })
    }

    /// Size of the Cover Art Archive image offered for import.
    pub fn with_cover_size(mut self, size: CoverSize) -> Self {
        self.cover_size = size;
        self
    }

    /// Send the HTTP request and parse the response
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("MusicBrainz request: {} {:?}", url, params);

        let response = self
            .http_client
            .get(&url)
            .query(&[("fmt", "json")])
            .query(params)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(path.to_string()));
        }

        // MusicBrainz signals rate limiting with 503 as well as 429
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(ProviderError::Network(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    error.error
                )));
            }
            return Err(ProviderError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(ProviderError::from_transport)?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    fn page_params(cursor: PageCursor) -> Vec<(&'static str, String)> {
        vec![
            ("limit", cursor.per_page.clamp(1, MAX_LIMIT).to_string()),
            ("offset", cursor.offset.to_string()),
        ]
    }
}

#[async_trait]
impl ProviderAdapter for MusicBrainzClient {
    fn describe_provider(&self) -> ProviderInfo {
        let search_types = [
            ("release", "Releases"),
            ("artist", "Artists"),
            ("label", "Labels"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let release_filters: BTreeMap<String, String> = [
            ("all", "All Releases"),
            ("album", "Albums"),
            ("single", "Singles"),
            ("ep", "EPs"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        ProviderInfo {
            name: "MusicBrainz".to_string(),
            description: "Search and import releases from the MusicBrainz open music encyclopedia"
                .to_string(),
            search_types,
            returns_releases: BTreeSet::from(["release".to_string()]),
            search_filters: BTreeMap::from([("release".to_string(), release_filters)]),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, ProviderError> {
        let mut params = Self::page_params(query.cursor);

        match query.search_type.as_str() {
            "release" => {
                let lucene = match query.filter.as_deref() {
                    Some(kind @ ("album" | "single" | "ep")) => {
                        format!("({}) AND primarytype:{}", query.term, kind)
                    }
                    _ => query.term.clone(),
                };
                params.push(("query", lucene));
                let response: dto::ReleaseSearchResponse =
                    self.get_json("/release", &params).await?;
                Ok(adapter::to_release_page(response))
            }
            "artist" => {
                params.push(("query", query.term.clone()));
                let response: dto::ArtistSearchResponse = self.get_json("/artist", &params).await?;
                Ok(adapter::to_artist_page(response))
            }
            "label" => {
                params.push(("query", query.term.clone()));
                let response: dto::LabelSearchResponse = self.get_json("/label", &params).await?;
                Ok(adapter::to_label_page(response))
            }
            other => Err(ProviderError::Unsupported(other.to_string())),
        }
    }

    async fn fetch_children(
        &self,
        search_type: &str,
        id: &str,
        cursor: PageCursor,
    ) -> Result<ChildrenPage, ProviderError> {
        if !matches!(search_type, "artist" | "label") {
            return Err(ProviderError::Unsupported(search_type.to_string()));
        }

        let mut params = Self::page_params(cursor);
        params.push((
            if search_type == "artist" { "artist" } else { "label" },
            id.to_string(),
        ));
        params.push(("inc", "artist-credits+labels+media".to_string()));
        let releases: dto::ReleaseBrowseResponse = self.get_json("/release", &params).await?;

        let parent = match self
            .get_json::<dto::EntityLookup>(&format!("/{}/{}", search_type, id), &[])
            .await
        {
            Ok(parent) => Some(parent),
            Err(e) => {
                tracing::warn!("MusicBrainz {} {} lookup failed: {}", search_type, id, e);
                None
            }
        };

        Ok(adapter::to_children_page(releases, search_type, parent))
    }

    async fn fetch_release(&self, id: &str) -> Result<ReleaseRecord, ProviderError> {
        let params = [("inc", RELEASE_INCLUDES.to_string())];
        let release: dto::Release = self
            .get_json(&format!("/release/{}", id), &params)
            .await?;
        Ok(adapter::to_release(release, self.cover_size))
    }
}
