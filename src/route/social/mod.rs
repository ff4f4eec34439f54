use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, generate::image, route::generate::{gateway_failure, storage_failure}, social, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Social(#[from] social::Error),
	#[error(transparent)]
	Image(#[from] image::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/profiles", get_with(get_profiles, get_profiles_docs))
		.api_route("/publish", post_with(publish, publish_docs))
		.api_route("/image", post_with(generate_image, generate_image_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Social(social::Error::NotConfigured) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Social(..) => StatusCode::BAD_GATEWAY,
			Self::Image(image::Error::Gateway(error)) => gateway_failure(error).0,
			Self::Image(image::Error::Storage(error)) => storage_failure(error).0,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::Social(social::Error::NotConfigured) => error::Message::new("not_configured")
				.content("Social publishing is not configured."),
			Self::Social(..) => error::Message::new("publish_failed")
				.content("The social publishing service failed to respond."),
			Self::Image(image::Error::Gateway(error)) => {
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
