//! Discogs HTTP client
//!
//! Handles communication with the Discogs database API and exposes it as a
//! [`ProviderAdapter`].
//!
//! IMPORTANT: Discogs requires a User-Agent header. Unauthenticated requests
//! are limited to 25/min; a personal access token raises that to 60/min.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{adapter, dto};
use crate::model::{ChildrenPage, ProviderInfo, ReleaseRecord, SearchResultPage};
use crate::provider::{PageCursor, ProviderAdapter, ProviderError, SearchQuery};

/// Registry id of this provider
pub const PROVIDER_ID: &str = "discogs";

/// User agent string - Discogs rejects requests without one
const USER_AGENT: &str = concat!(
    "DiscogMediator/",
    env!("CARGO_PKG_VERSION"),
    " +https://github.com/discog-mediator"
);

/// Discogs caps `per_page` at 100
const MAX_PER_PAGE: usize = 100;

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DiscogsClient {
    /// Create a new client; `token` is a Discogs personal access token.
    pub fn new(token: Option<String>) -> Result<Self, ProviderError> {
        Self::with_base_url("https://api.discogs.com", token)
    }

    /// Create a client against a custom base URL (mirrors, tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Send a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Discogs request: {} {:?}", url, params);

        let mut request = self.http_client.get(&url).query(params);
        if let Some(ref token) = self.token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Discogs token={}", token),
            );
        }

        let response = request.send().await.map_err(ProviderError::from_transport)?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(path.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(ProviderError::Network(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    error.message
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

    /// Cursor with `per_page` inside the range Discogs accepts.
    ///
    /// The same cursor must drive both the request and the in-page skip.
    fn clamp_cursor(cursor: PageCursor) -> PageCursor {
        PageCursor::new(cursor.per_page.clamp(1, MAX_PER_PAGE), cursor.offset)
    }

    fn page_params(cursor: PageCursor) -> Vec<(&'static str, String)> {
        vec![
            ("page", cursor.page_number().to_string()),
            ("per_page", cursor.per_page.to_string()),
        ]
    }

    /// Parent endpoint for a browsable search type.
    fn parent_path(search_type: &str) -> Result<&'static str, ProviderError> {
        match search_type {
            "artist" => Ok("artists"),
            "label" => Ok("labels"),
            other => Err(ProviderError::Unsupported(other.to_string())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for DiscogsClient {
    fn describe_provider(&self) -> ProviderInfo {
        let search_types = [
            ("release", "Releases"),
            ("artist", "Artists"),
            ("label", "Labels"),
            ("catno", "Catalog Number"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let release_filters: BTreeMap<String, String> = [
            ("all", "All Releases"),
            ("album", "Albums"),
            ("single", "Singles"),
            ("ep", "EPs"),
            ("compilation", "Compilations"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        ProviderInfo {
            name: "Discogs".to_string(),
            description: "Search and import releases from the Discogs database".to_string(),
            search_types,
            returns_releases: BTreeSet::from(["release".to_string(), "catno".to_string()]),
            search_filters: BTreeMap::from([("release".to_string(), release_filters)]),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, ProviderError> {
        let cursor = Self::clamp_cursor(query.cursor);
        let mut params = Self::page_params(cursor);

        match query.search_type.as_str() {
            "release" => {
                params.push(("type", "release".to_string()));
                params.push(("q", query.term.clone()));
                let format = match query.filter.as_deref() {
                    Some("album") => Some("Album"),
                    Some("single") => Some("Single"),
                    Some("ep") => Some("EP"),
                    Some("compilation") => Some("Compilation"),
                    _ => None,
                };
                if let Some(format) = format {
                    params.push(("format", format.to_string()));
                }
            }
            "catno" => {
                params.push(("type", "release".to_string()));
                params.push(("catno", query.term.clone()));
            }
            "artist" | "label" => {
                params.push(("type", query.search_type.clone()));
                params.push(("q", query.term.clone()));
            }
            other => return Err(ProviderError::Unsupported(other.to_string())),
        }

        let response: dto::SearchResponse = self.get_json("/database/search", &params).await?;
        let with_previews = matches!(query.search_type.as_str(), "release" | "catno");

        Ok(adapter::to_search_page(response, cursor, with_previews))
    }

    async fn fetch_children(
        &self,
        search_type: &str,
        id: &str,
        cursor: PageCursor,
    ) -> Result<ChildrenPage, ProviderError> {
        let parent = Self::parent_path(search_type)?;

        let cursor = Self::clamp_cursor(cursor);
        let mut params = Self::page_params(cursor);
        if parent == "artists" {
            params.push(("sort", "year".to_string()));
        }
        let releases: dto::ReleasesResponse = self
            .get_json(&format!("/{}/{}/releases", parent, id), &params)
            .await?;

        // The profile is decoration; a failure here does not sink the listing
        let info = match self
            .get_json::<dto::Profile>(&format!("/{}/{}", parent, id), &[])
            .await
        {
            Ok(profile) => Some(adapter::to_parent_info(profile)),
            Err(e) => {
                tracing::warn!("Discogs {} {} profile unavailable: {}", search_type, id, e);
                None
            }
        };

        Ok(adapter::to_children_page(releases, info, cursor))
    }

    async fn fetch_release(&self, id: &str) -> Result<ReleaseRecord, ProviderError> {
        let response: dto::ReleaseResponse =
            self.get_json(&format!("/releases/{}", id), &[]).await?;
        Ok(adapter::to_release(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackPosition;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> DiscogsClient {
        DiscogsClient::with_base_url(server.uri(), Some("secret".to_string())).unwrap()
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("DiscogMediator/"));
    }

    #[test]
    fn test_describe_provider() {
        let client = DiscogsClient::new(None).unwrap();
        let info = client.describe_provider();

        assert_eq!(info.name, "Discogs");
        assert!(info.returns_releases("release"));
        assert!(info.returns_releases("catno"));
        assert!(!info.returns_releases("artist"));
        assert!(info.filters_for("release").unwrap().contains_key("ep"));
        assert!(info.filters_for("artist").is_none());
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let client = DiscogsClient::new(Some("  ".to_string())).unwrap();
        assert!(client.token.is_none());
    }

    #[tokio::test]
    async fn test_artist_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("q", "Aphex Twin"))
            .and(query_param("type", "artist"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "10"))
            .and(header("authorization", "Discogs token=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 1, "per_page": 10, "items": 1},
                "results": [{"id": 45, "type": "artist", "title": "Aphex Twin"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let query = SearchQuery::new("Aphex Twin", "artist").with_cursor(PageCursor::new(10, 0));
        let page = client.search(&query).await.unwrap();

        assert_eq!(page.total_results, 1);
        assert_eq!(page.results[0].id, "45");
        assert_eq!(page.results[0].title, "Aphex Twin");
    }

    #[tokio::test]
    async fn test_release_search_applies_format_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("type", "release"))
            .and(query_param("format", "EP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 1, "per_page": 25, "items": 0},
                "results": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let query = SearchQuery::new("Xylem", "release").with_filter("ep");
        let page = client.search(&query).await.unwrap();

        assert_eq!(page.total_results, 0);
    }

    #[tokio::test]
    async fn test_catno_search_uses_catno_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("catno", "WARP 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 1, "per_page": 25, "items": 1},
                "results": [{"id": 7, "type": "release", "title": "Various - Artificial Intelligence"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page = client
            .search(&SearchQuery::new("WARP 1", "catno"))
            .await
            .unwrap();

        assert_eq!(page.results[0].release_artist.as_deref(), Some("Various"));
        assert_eq!(page.results[0].title, "Artificial Intelligence");
    }

    #[tokio::test]
    async fn test_unsupported_search_type() {
        let client = DiscogsClient::new(None).unwrap();
        let result = client.search(&SearchQuery::new("x", "hat")).await;

        assert!(matches!(result, Err(ProviderError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_search_over_page_limit_skips_within_clamped_page() {
        // offset 150 at 100 per page: page 2, drop its first 50 rows
        let server = MockServer::start().await;
        let rows: Vec<_> = (100..200)
            .map(|id| json!({"id": id, "type": "artist", "title": format!("Artist {}", id)}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 2, "pages": 3, "per_page": 100, "items": 250},
                "results": rows
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let query = SearchQuery::new("Artist", "artist").with_cursor(PageCursor::new(150, 150));
        let page = client.search(&query).await.unwrap();

        assert_eq!(page.results.len(), 50);
        assert_eq!(page.results[0].id, "150");
        assert_eq!(page.results[49].id, "199");
    }

    #[tokio::test]
    async fn test_children_over_page_limit_use_clamped_cursor() {
        let server = MockServer::start().await;
        let rows: Vec<_> = (0..100)
            .map(|i| json!({"id": 1000 + i, "type": "release", "title": format!("Release {}", i)}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/labels/23528/releases"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 2, "per_page": 100, "items": 120},
                "releases": rows
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/labels/23528"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let children = client
            .fetch_children("label", "23528", PageCursor::new(120, 30))
            .await
            .unwrap();

        assert_eq!(children.page.results.len(), 70);
        assert_eq!(children.page.results[0].id, "1030");
    }

    #[tokio::test]
    async fn test_fetch_children_with_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/artists/45/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 1, "per_page": 10, "items": 1},
                "releases": [{"id": 565, "type": "master", "main_release": 76823, "title": "SAW 85-92"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/artists/45"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 45, "name": "Aphex Twin", "profile": "Richard D. James"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let children = client
            .fetch_children("artist", "45", PageCursor::new(10, 0))
            .await
            .unwrap();

        assert_eq!(children.page.total_results, 1);
        assert_eq!(children.page.results[0].id, "76823");
        let info = children.info.expect("profile info");
        assert_eq!(info.name.as_deref(), Some("Aphex Twin"));
    }

    #[tokio::test]
    async fn test_fetch_children_survives_missing_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/labels/23528/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 1, "per_page": 10, "items": 0},
                "releases": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/labels/23528"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let children = client
            .fetch_children("label", "23528", PageCursor::new(10, 0))
            .await
            .unwrap();

        assert!(children.info.is_none());
        assert!(children.page.results.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_release_normalizes_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/76823"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 76823,
                "title": "Selected Ambient Works 85-92",
                "artists": [{"name": "Aphex Twin"}],
                "tracklist": [
                    {"title": "Track A"},
                    {"position": "2", "title": "Track B"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let release = client.fetch_release("76823").await.unwrap();

        assert_eq!(release.artist, "Aphex Twin");
        assert_eq!(release.tracks[0].position, TrackPosition::Index(0));
        assert_eq!(release.tracks[0].title, "Track A");
        assert_eq!(release.tracks[1].position, TrackPosition::Label("2".to_string()));
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Release not found."})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/releases/2"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/releases/3"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({"message": "Bad gateway"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/releases/4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        assert!(matches!(client.fetch_release("1").await, Err(ProviderError::NotFound(_))));
        assert!(matches!(client.fetch_release("2").await, Err(ProviderError::RateLimited)));
        match client.fetch_release("3").await {
            Err(ProviderError::Network(msg)) => assert!(msg.contains("Bad gateway")),
            other => panic!("expected network error, got {:?}", other),
        }
        assert!(matches!(client.fetch_release("4").await, Err(ProviderError::Parse(_))));
    }
}
