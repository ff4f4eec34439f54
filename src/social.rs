//! Client for the external social publishing service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("social publishing is not configured")]
	NotConfigured,
	#[error("social service returned {status}: {body}")]
	Status {
		status: reqwest::StatusCode,
		body: String,
	},
	#[error("request to social service failed: {0}")]
	Request(#[from] reqwest::Error),
}

/// A connected social media account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
	pub id: String,
	/// The network, such as `facebook` or `linkedin`.
	pub platform: String,
	pub name: String,
	#[serde(default)]
	pub avatar_url: Option<String>,
}

/// A post to publish on a single profile.
#[derive(Debug, Clone, Serialize)]
pub struct Publication<'a> {
	pub profile_id: &'a str,
	pub text: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_url: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Published {
	pub id: String,
	#[serde(default)]
	pub url: Option<String>,
}

#[axum::async_trait]
pub trait Social: Send + Sync {
	async fn profiles(&self) -> Result<Vec<Profile>, Error>;

	async fn publish(&self, publication: &Publication<'_>) -> Result<Published, Error>;
}

/// A [`Social`] service reached over HTTP.
pub struct HttpSocial {
	client: reqwest::Client,
	config: config::Social,
}

impl HttpSocial {
	pub fn new(client: reqwest::Client, config: config::Social) -> Self {
		Self { client, config }
	}

	fn endpoint(&self, path: &str) -> Result<(String, &str), Error> {
		let (Some(url), Some(key)) = (&self.config.url, &self.config.key) else {
			return Err(Error::NotConfigured);
		};

		Ok((format!("{}/{path}", url.trim_end_matches('/')), key.as_str()))
	}
}

async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
	let status = response.status();

	if !status.is_success() {
		return Err(Error::Status {
			status,
			body: response.text().await.unwrap_or_default(),
		});
	}

	Ok(response.json().await?)
}

#[axum::async_trait]
impl Social for HttpSocial {
	async fn profiles(&self) -> Result<Vec<Profile>, Error> {
		let (url, key) = self.endpoint("profiles")?;
		let response = self.client.get(url).bearer_auth(key).send().await?;

		parse(response).await
	}

	#[tracing::instrument(skip_all, fields(profile = publication.profile_id))]
	async fn publish(&self, publication: &Publication<'_>) -> Result<Published, Error> {
		let (url, key) = self.endpoint("posts")?;
		let response = self
			.client
			.post(url)
			.bearer_auth(key)
			.json(publication)
			.send()
			.await?;

		parse(response).await
	}
}
