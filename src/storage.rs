//! Managed object storage for generated images.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("object storage is not configured")]
	NotConfigured,
	#[error("invalid data url")]
	InvalidDataUrl,
	#[error("invalid base64 payload: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("object storage returned {status}: {body}")]
	Status {
		status: reqwest::StatusCode,
		body: String,
	},
	#[error("request to object storage failed: {0}")]
	Request(#[from] reqwest::Error),
}

/// A decoded `data:` URL.
#[derive(Debug, PartialEq, Eq)]
pub struct DataUrl {
	pub content_type: String,
	pub bytes: Vec<u8>,
}

impl DataUrl {
	/// Parses a base64 `data:<type>;base64,<payload>` URL.
	pub fn parse(url: &str) -> Result<Self, Error> {
		let rest = url.strip_prefix("data:").ok_or(Error::InvalidDataUrl)?;
		let (meta, payload) = rest.split_once(',').ok_or(Error::InvalidDataUrl)?;
		let content_type = meta.strip_suffix(";base64").ok_or(Error::InvalidDataUrl)?;

		Ok(Self {
			content_type: if content_type.is_empty() {
				"application/octet-stream".into()
			} else {
				content_type.into()
			},
			bytes: STANDARD.decode(payload.trim())?,
		})
	}

	pub fn extension(&self) -> &'static str {
		match self.content_type.as_str() {
			"image/jpeg" => "jpg",
			"image/webp" => "webp",
			"image/gif" => "gif",
			_ => "png",
		}
	}
}

/// Uploads objects and returns their public URL.
#[axum::async_trait]
pub trait ObjectStore: Send + Sync {
	async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, Error>;
}

/// An [`ObjectStore`] speaking the Supabase storage REST API.
pub struct HttpObjectStore {
	client: reqwest::Client,
	config: config::Storage,
}

impl HttpObjectStore {
	pub fn new(client: reqwest::Client, config: config::Storage) -> Self {
		Self { client, config }
	}
}

#[axum::async_trait]
impl ObjectStore for HttpObjectStore {
	#[tracing::instrument(skip(self, bytes), fields(bucket = %self.config.bucket, size = bytes.len()))]
	async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, Error> {
		let (Some(url), Some(key)) = (&self.config.url, &self.config.key) else {
			return Err(Error::NotConfigured);
		};

		let base = url.trim_end_matches('/');
		let bucket = &self.config.bucket;

		let response = self
			.client
			.post(format!("{base}/storage/v1/object/{bucket}/{path}"))
			.bearer_auth(key)
			.header(reqwest::header::CONTENT_TYPE, content_type)
			.header("x-upsert", "false")
			.body(bytes)
			.send()
			.await?;

		let status = response.status();

		if !status.is_success() {
			return Err(Error::Status {
				status,
				body: response.text().await.unwrap_or_default(),
			});
		}

		Ok(format!("{base}/storage/v1/object/public/{bucket}/{path}"))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_data_url() {
		let url = DataUrl::parse("data:image/jpeg;base64,aGVsbG8=").unwrap();

		assert_eq!(url.content_type, "image/jpeg");
		assert_eq!(url.bytes, b"hello");
		assert_eq!(url.extension(), "jpg");
	}

	#[test]
	fn test_parse_invalid_data_url() {
		assert!(matches!(
			DataUrl::parse("https://example.com/a.png"),
			Err(Error::InvalidDataUrl)
		));
		assert!(matches!(
			DataUrl::parse("data:image/png,plain"),
			Err(Error::InvalidDataUrl)
		));
		assert!(matches!(
			DataUrl::parse("data:image/png;base64,@@@"),
			Err(Error::Base64(..))
		));
	}
}
