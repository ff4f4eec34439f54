//! Client for the external generative AI gateway, an OpenAI-compatible
//! chat completions API.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("AI gateway key is not configured")]
	MissingCredentials,
	#[error("rate limited by the AI gateway")]
	RateLimited,
	#[error("AI gateway credits exhausted")]
	CreditsExhausted,
	#[error("AI gateway returned {status}: {body}")]
	Status { status: StatusCode, body: String },
	#[error("AI gateway error: {0}")]
	Upstream(String),
	#[error("AI gateway returned an empty response")]
	Empty,
	#[error("request to AI gateway failed: {0}")]
	Request(#[from] reqwest::Error),
}

impl Error {
	/// Whether the failure is a quota problem worth retrying later.
	pub fn is_quota(&self) -> bool {
		matches!(self, Self::RateLimited | Self::CreditsExhausted)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}

impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self {
			role: Role::System,
			content: content.into(),
		}
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self {
			role: Role::User,
			content: content.into(),
		}
	}
}

/// The external generation service, treated as a black box.
#[axum::async_trait]
pub trait Gateway: Send + Sync {
	/// Fails fast when the gateway cannot be called at all.
	fn check(&self) -> Result<(), Error> {
		Ok(())
	}

	/// Returns the text of a chat completion.
	async fn complete(&self, messages: &[ChatMessage]) -> Result<String, Error>;

	/// Returns a generated image as a base64 `data:` URL.
	async fn image(&self, prompt: &str) -> Result<String, Error>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
	model: &'a str,
	messages: &'a [ChatMessage],
	#[serde(skip_serializing_if = "Option::is_none")]
	modalities: Option<&'a [&'a str]>,
}

#[derive(Deserialize)]
struct CompletionResponse {
	#[serde(default)]
	choices: Vec<Choice>,
	error: Option<UpstreamError>,
}

#[derive(Deserialize)]
struct Choice {
	message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
	#[serde(default)]
	content: Option<String>,
	#[serde(default)]
	images: Vec<ResponseImage>,
}

#[derive(Deserialize)]
struct ResponseImage {
	image_url: ImageUrl,
}

#[derive(Deserialize)]
struct ImageUrl {
	url: String,
}

#[derive(Deserialize)]
struct UpstreamError {
	message: String,
}

impl CompletionResponse {
	/// The first choice's message. A successful status carrying an `error`
	/// object is still a failure.
	fn into_message(self) -> Result<ResponseMessage, Error> {
		if let Some(error) = self.error {
			return Err(Error::Upstream(error.message));
		}

		self.choices
			.into_iter()
			.next()
			.map(|choice| choice.message)
			.ok_or(Error::Empty)
	}

	fn into_text(self) -> Result<String, Error> {
		self.into_message()?
			.content
			.filter(|content| !content.trim().is_empty())
			.ok_or(Error::Empty)
	}

	fn into_image_url(self) -> Result<String, Error> {
		self.into_message()?
			.images
			.into_iter()
			.next()
			.map(|image| image.image_url.url)
			.ok_or(Error::Empty)
	}
}

/// A [`Gateway`] reached over HTTP.
pub struct HttpGateway {
	client: reqwest::Client,
	config: config::Gateway,
}

impl HttpGateway {
	pub fn new(client: reqwest::Client, config: config::Gateway) -> Self {
		Self { client, config }
	}

	async fn send(&self, body: &CompletionRequest<'_>) -> Result<CompletionResponse, Error> {
		let key = self.config.key.as_deref().ok_or(Error::MissingCredentials)?;
		let url = format!("{}/chat/completions", self.config.url.trim_end_matches('/'));

		let response = self
			.client
			.post(url)
			.bearer_auth(key)
			.json(body)
			.send()
			.await?;

		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();

			return Err(status_error(status, body));
		}

		Ok(response.json::<CompletionResponse>().await?)
	}
}

/// Maps a non-2xx gateway status to an error, keeping quota failures distinct.
fn status_error(status: StatusCode, body: String) -> Error {
	match status {
		StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
		StatusCode::PAYMENT_REQUIRED => Error::CreditsExhausted,
		status => Error::Status { status, body },
	}
}

#[axum::async_trait]
impl Gateway for HttpGateway {
	fn check(&self) -> Result<(), Error> {
		self.config.key.as_ref().map(|_| ()).ok_or(Error::MissingCredentials)
	}

	#[tracing::instrument(skip_all, fields(model = %self.config.text_model))]
	async fn complete(&self, messages: &[ChatMessage]) -> Result<String, Error> {
		self.send(&CompletionRequest {
			model: &self.config.text_model,
			messages,
			modalities: None,
		})
		.await?
		.into_text()
	}

	#[tracing::instrument(skip_all, fields(model = %self.config.image_model))]
	async fn image(&self, prompt: &str) -> Result<String, Error> {
		let messages = [ChatMessage::user(prompt)];
		self.send(&CompletionRequest {
			model: &self.config.image_model,
			messages: &messages,
			modalities: Some(&["image", "text"]),
		})
		.await?
		.into_image_url()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert!(matches!(
			status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
			Error::RateLimited
		));
		assert!(matches!(
			status_error(StatusCode::PAYMENT_REQUIRED, String::new()),
			Error::CreditsExhausted
		));
		assert!(matches!(
			status_error(StatusCode::BAD_GATEWAY, "oops".into()),
			Error::Status { status: StatusCode::BAD_GATEWAY, .. }
		));
	}

	#[test]
	fn test_quota() {
		assert!(Error::RateLimited.is_quota());
		assert!(Error::CreditsExhausted.is_quota());
		assert!(!Error::Empty.is_quota());
	}

	#[test]
	fn test_missing_key_fails_check() {
		let gateway = HttpGateway::new(
			reqwest::Client::new(),
			config::Gateway {
				url: config::DEFAULT_GATEWAY_URL.into(),
				key: None,
				text_model: config::DEFAULT_TEXT_MODEL.into(),
				image_model: config::DEFAULT_IMAGE_MODEL.into(),
			},
		);

		assert!(matches!(gateway.check(), Err(Error::MissingCredentials)));
	}

	#[test]
	fn test_response_parsing() {
		let response: CompletionResponse = serde_json::from_value(serde_json::json!({
			"choices": [{
				"message": {
					"content": "hello",
					"images": [{ "image_url": { "url": "data:image/png;base64,AAAA" } }]
				}
			}]
		}))
		.unwrap();

		let message = &response.choices[0].message;

		assert_eq!(message.content.as_deref(), Some("hello"));
		assert_eq!(message.images[0].image_url.url, "data:image/png;base64,AAAA");
	}

	fn parse(value: serde_json::Value) -> CompletionResponse {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn test_error_object_on_success_status_fails() {
		let response = parse(serde_json::json!({
			"error": { "message": "model overloaded" },
			"choices": [{ "message": { "content": "ignored" } }]
		}));

		assert!(matches!(
			response.into_text(),
			Err(Error::Upstream(message)) if message == "model overloaded"
		));
	}

	#[test]
	fn test_missing_choices_are_empty() {
		assert!(matches!(parse(serde_json::json!({})).into_text(), Err(Error::Empty)));
		assert!(matches!(
			parse(serde_json::json!({ "choices": [] })).into_image_url(),
			Err(Error::Empty)
		));
		assert!(matches!(
			parse(serde_json::json!({ "choices": [{ "message": { "content": "  " } }] })).into_text(),
			Err(Error::Empty)
		));
	}

	#[test]
	fn test_first_choice_is_used() {
		let response = parse(serde_json::json!({
			"choices": [
				{ "message": { "content": "first" } },
				{ "message": { "content": "second" } }
			]
		}));

		assert_eq!(response.into_text().unwrap(), "first");

		let response = parse(serde_json::json!({
			"choices": [{
				"message": {
					"images": [{ "image_url": { "url": "data:image/png;base64,AAAA" } }]
				}
			}]
		}));

		assert_eq!(response.into_image_url().unwrap(), "data:image/png;base64,AAAA");
	}
}
