use aide::axum::{routing::post_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, gateway, generate::image, storage, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Gateway(#[from] gateway::Error),
	#[error(transparent)]
	Image(#[from] image::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/content", post_with(generate_content, generate_content_docs))
		.api_route("/image", post_with(generate_image, generate_image_docs))
}

/// The response status and client message for a gateway failure.
///
/// Quota failures keep the upstream status so the admin panel can tell
/// the user to wait or add funds.
pub fn gateway_failure(error: &gateway::Error) -> (StatusCode, &'static str, &'static str) {
	match error {
		gateway::Error::RateLimited => (
			StatusCode::TOO_MANY_REQUESTS,
			"rate_limited",
			"Rate limits exceeded, please try again later.",
		),
		gateway::Error::CreditsExhausted => (
			StatusCode::PAYMENT_REQUIRED,
			"credits_exhausted",
			"AI credits exhausted, please add funds to your workspace.",
		),
		gateway::Error::MissingCredentials => (
			StatusCode::INTERNAL_SERVER_ERROR,
			"not_configured",
			"The AI gateway is not configured.",
		),
		_ => (
			StatusCode::BAD_GATEWAY,
			"generation_failed",
			"The AI gateway failed to generate a response.",
		),
	}
}

/// The response status and client message for an upload failure.
pub fn storage_failure(error: &storage::Error) -> (StatusCode, &'static str, &'static str) {
	match error {
		storage::Error::NotConfigured => (
			StatusCode::INTERNAL_SERVER_ERROR,
			"not_configured",
			"Image storage is not configured.",
		),
		_ => (
			StatusCode::BAD_GATEWAY,
			"upload_failed",
			"The generated image could not be stored.",
		),
	}
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Gateway(error) | Self::Image(image::Error::Gateway(error)) => {
				gateway_failure(error).0
			}
			Self::Image(image::Error::Storage(error)) => storage_failure(error).0,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::Gateway(error) | Self::Image(image::Error::Gateway(error)) => {
				let (_, code, content) = gateway_failure(&error);

				error::Message::new(code).content(content)
			}
			Self::Image(image::Error::Storage(error)) => {
				let (_, code, content) = storage_failure(&error);

				error::Message::new(code).content(content)
			}
		}
		.into_vec()
	}
}
