use axum::extract::State;
use macros::route;

use crate::{
	extract::{AdminAuth, Json},
	generate::{image, Generate},
	openapi::tag,
	AppState,
};

use super::{model, RouteError};

/// Generate content
/// Generates text of the requested type, such as a full post, an outline or an SEO analysis.
#[route(tag = tag::GENERATE)]
pub async fn generate_content(
	State(state): State<AppState>,
	_admin: AdminAuth,
	Json(request): Json<model::Request>,
) -> Result<Json<model::ContentOutput>, RouteError> {
	let content = state
		.generator
		.generate(&request)
		.await
		.map_err(super::Error::from)?;

	Ok(Json(model::ContentOutput { content }))
}

/// Generate image
/// Generates an image, stores it and returns its public URL along with an inline preview.
#[route(tag = tag::GENERATE)]
pub async fn generate_image(
	State(state): State<AppState>,
	_admin: AdminAuth,
	Json(input): Json<model::ImageInput>,
) -> Result<Json<model::Image>, RouteError> {
	let image = image::render(
		state.gateway.as_ref(),
		state.storage.as_ref(),
		&input.prompt,
		input.style,
		input.size,
	)
	.await
	.map_err(super::Error::from)?;

	Ok(Json(image))
}
