//! Image resolution: primary release image -> stored asset.
//!
//! Only the primary image is imported. Any failure (network, empty body,
//! storage) leaves the release without an image and yields a warning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{AssetRef, AssetStore, FetchedImage, ImageFetcher, ResolveError, ResolverWarning, WarningKind};
use crate::model::ReleaseImages;

const USER_AGENT: &str = concat!("DiscogMediator/", env!("CARGO_PKG_VERSION"));

/// Outcome of resolving a release's images.
#[derive(Debug, Clone, Default)]
pub struct ImageResolution {
    pub asset: Option<AssetRef>,
    pub warning: Option<ResolverWarning>,
}

/// Fetches the primary image and hands it to an [`AssetStore`].
pub struct ImageResolver {
    fetcher: Arc<dyn ImageFetcher>,
    assets: Arc<dyn AssetStore>,
}

impl ImageResolver {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, assets: Arc<dyn AssetStore>) -> Self {
        Self { fetcher, assets }
    }

    pub async fn resolve(&self, images: &ReleaseImages) -> ImageResolution {
        let Some(url) = images.primary_url() else {
            return ImageResolution::default();
        };

        match self.import(url).await {
            Ok(asset) => {
                tracing::debug!("Stored image {} as {}", url, asset.uri);
                ImageResolution {
                    asset: Some(asset),
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!("Image {} not imported: {}", url, e);
                ImageResolution {
                    asset: None,
                    warning: Some(ResolverWarning {
                        kind: WarningKind::Image,
                        subject: url.to_string(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }

    async fn import(&self, url: &str) -> Result<AssetRef, ResolveError> {
        let image = self.fetcher.fetch(url).await?;
        if image.data.is_empty() {
            return Err(ResolveError::EmptyPayload(url.to_string()));
        }

        let file_name = file_name_from_url(url, &image.mime_type);
        self.assets.store(&file_name, &image).await
    }
}

/// Derive a file name from the last path segment of an image URL.
///
/// The segment is percent-decoded and stripped of query and fragment.
/// Path separators and control characters are replaced. When nothing
/// usable remains, a name is built from the MIME type.
pub fn file_name_from_url(url: &str, mime_type: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or("");
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => without_query,
    };
    let segment = path.rsplit('/').next().unwrap_or("");

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let cleaned: String = decoded
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        format!("image.{}", extension_for(mime_type))
    } else {
        cleaned
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    if mime_type.contains("png") {
        "png"
    } else if mime_type.contains("gif") {
        "gif"
    } else if mime_type.contains("webp") {
        "webp"
    } else {
        "jpg"
    }
}

/// [`ImageFetcher`] backed by `reqwest`.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ResolveError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Network(format!("HTTP {}", status.as_u16())));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        // Whole body or nothing
        let data = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?
            .to_vec();

        if data.is_empty() {
            return Err(ResolveError::EmptyPayload(url.to_string()));
        }

        Ok(FetchedImage {
            data,
            mime_type,
            url: url.to_string(),
        })
    }
}
