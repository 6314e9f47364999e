//! Where a dataset lives and how to fetch it
//!
//! Cloud Storage objects (`gs://bucket/object`) are downloaded through the
//! JSON API. On Google Cloud the instance metadata server hands out an access
//! token for the attached service account; elsewhere the download is tried
//! anonymously, which works for public buckets.

use super::loader::DatasetFormat;
use crate::error::{RecipeError, Result};
use pantry_utils::env_var;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const METADATA_HOST: &str = "metadata.google.internal";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const METADATA_TIMEOUT: Duration = Duration::from_secs(2);
const STORAGE_API: &str = "https://storage.googleapis.com/storage/v1/b/";

/// A dataset location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// File on the local filesystem
    Local(PathBuf),
    /// Plain HTTP(S) download
    Http(Url),
    /// Google Cloud Storage object
    Gcs { bucket: String, object: String },
}

impl FromStr for DatasetSource {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RecipeError::InvalidSource(s.to_string()));
        }

        if let Some(rest) = s.strip_prefix("gs://") {
            return match rest.split_once('/') {
                Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => Ok(Self::Gcs {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                }),
                _ => Err(RecipeError::InvalidSource(s.to_string())),
            };
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            return Url::parse(s)
                .map(Self::Http)
                .map_err(|e| RecipeError::InvalidSource(format!("{s}: {e}")));
        }

        Ok(Self::Local(PathBuf::from(s)))
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
            Self::Gcs { bucket, object } => write!(f, "gs://{bucket}/{object}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl DatasetSource {
    /// File format, from the path or object name
    pub fn format(&self) -> Result<DatasetFormat> {
        match self {
            Self::Local(path) => DatasetFormat::from_path(&path.to_string_lossy()),
            Self::Http(url) => DatasetFormat::from_path(url.path()),
            Self::Gcs { object, .. } => DatasetFormat::from_path(object),
        }
    }

    /// Download the raw dataset bytes
    #[instrument(skip(self, client), fields(source = %self))]
    pub async fn fetch(&self, client: &Client) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::Local(path) => tokio::fs::read(path).await.map_err(|e| self.fetch_error(e))?,
            Self::Http(url) => self.download(client, url.clone(), None).await?,
            Self::Gcs { bucket, object } => {
                let token = metadata_token(client).await;
                if token.is_none() {
                    info!("No metadata server token; trying an anonymous download");
                }
                let url = gcs_media_url(bucket, object)?;
                self.download(client, url, token.as_deref()).await?
            }
        };

        info!(bytes = bytes.len(), "Dataset fetched");
        Ok(bytes)
    }

    async fn download(&self, client: &Client, url: Url, token: Option<&str>) -> Result<Vec<u8>> {
        let mut request = client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.fetch_error(format!("HTTP {status}: {}", body.trim())));
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn fetch_error(&self, reason: impl fmt::Display) -> RecipeError {
        RecipeError::Fetch {
            source_name: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// JSON API download URL for an object
fn gcs_media_url(bucket: &str, object: &str) -> Result<Url> {
    let mut url = Url::parse(STORAGE_API).map_err(|e| RecipeError::InvalidSource(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| RecipeError::InvalidSource(STORAGE_API.to_string()))?
        .pop_if_empty()
        .push(bucket)
        .push("o")
        .push(object);
    url.query_pairs_mut().append_pair("alt", "media");
    Ok(url)
}

/// Ask the instance metadata server for an access token
///
/// Returns `None` off Google Cloud or when the server does not answer in time.
/// `GCE_METADATA_HOST` overrides the host, as with Google's own client libraries.
async fn metadata_token(client: &Client) -> Option<String> {
    let host = env_var("GCE_METADATA_HOST").unwrap_or_else(|| METADATA_HOST.to_string());
    let url = format!("http://{host}{METADATA_TOKEN_PATH}");

    let response = match client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .timeout(METADATA_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Metadata server unreachable");
            return None;
        }
    };

    if !response.status().is_success() {
        warn!(status = %response.status(), "Metadata server refused a token");
        return None;
    }

    match response.json::<MetadataToken>().await {
        Ok(token) => {
            debug!(expires_in = token.expires_in, "Obtained metadata access token");
            Some(token.access_token)
        }
        Err(e) => {
            warn!(error = %e, "Malformed metadata token response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        assert_eq!(
            "data/recipes.csv".parse::<DatasetSource>().unwrap(),
            DatasetSource::Local(PathBuf::from("data/recipes.csv"))
        );
        assert_eq!(
            "gs://pantry-data/exports/recipes.csv".parse::<DatasetSource>().unwrap(),
            DatasetSource::Gcs {
                bucket: "pantry-data".to_string(),
                object: "exports/recipes.csv".to_string(),
            }
        );
        assert!(matches!(
            "https://example.com/recipes.json".parse::<DatasetSource>().unwrap(),
            DatasetSource::Http(_)
        ));
    }

    #[test]
    fn test_invalid_sources() {
        assert!("gs://bucket-only".parse::<DatasetSource>().is_err());
        assert!("gs:///object.csv".parse::<DatasetSource>().is_err());
        assert!("   ".parse::<DatasetSource>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let source: DatasetSource = "gs://pantry-data/recipes.csv".parse().unwrap();
        assert_eq!(source.to_string(), "gs://pantry-data/recipes.csv");
    }

    #[test]
    fn test_formats() {
        let gcs: DatasetSource = "gs://b/exports/recipes.jsonl".parse().unwrap();
        assert_eq!(gcs.format().unwrap(), DatasetFormat::JsonLines);
        let http: DatasetSource = "https://example.com/r.csv?sig=1".parse().unwrap();
        assert_eq!(http.format().unwrap(), DatasetFormat::Csv);
    }

    #[test]
    fn test_gcs_media_url_escapes_object() {
        let url = gcs_media_url("pantry-data", "exports/recipes.csv").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/pantry-data/o/exports%2Frecipes.csv?alt=media"
        );
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let path = std::env::temp_dir().join(format!("pantry-{}.csv", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "Name,RecipeIngredientParts,RecipeCategory\n")
            .await
            .unwrap();

        let source = DatasetSource::Local(path.clone());
        let bytes = source.fetch(&Client::new()).await.unwrap();
        assert!(bytes.starts_with(b"Name,"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let source = DatasetSource::Local(PathBuf::from("/nonexistent/pantry/recipes.csv"));
        let err = source.fetch(&Client::new()).await.unwrap_err();
        assert!(matches!(err, RecipeError::Fetch { .. }));
    }
}
