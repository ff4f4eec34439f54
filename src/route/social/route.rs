use axum::extract::State;
use macros::route;

use crate::{
	extract::{AdminAuth, Json},
	generate::{image, Size},
	openapi::tag,
	social::Publication,
	AppState,
};

use super::{model, Error, RouteError};

/// Get social profiles
/// Returns the social media profiles connected to the publishing service.
#[route(tag = tag::SOCIAL)]
pub async fn get_profiles(
	State(state): State<AppState>,
	_admin: AdminAuth,
) -> Result<Json<Vec<model::Profile>>, RouteError> {
	let profiles = state.social.profiles().await.map_err(Error::from)?;

	Ok(Json(profiles))
}

/// Publish to social media
/// Publishes a post to each profile in turn. A failing profile is reported and does not stop the others.
#[route(tag = tag::SOCIAL)]
pub async fn publish(
	State(state): State<AppState>,
	admin: AdminAuth,
	Json(input): Json<model::PublishInput>,
) -> Result<Json<model::PublishOutput>, RouteError> {
	let mut results = Vec::with_capacity(input.profile_ids.len());

	for profile_id in input.profile_ids {
		let publication = Publication {
			profile_id: &profile_id,
			text: &input.text,
			image_url: input.image_url.as_deref(),
		};

		let outcome = state.social.publish(&publication).await;
		let result = match outcome {
			Ok(published) => model::ProfileResult {
				profile_id,
				success: true,
				post_id: Some(published.id),
				url: published.url,
				error: None,
			},
			Err(error) => {
				tracing::warn!(%error, profile = %profile_id, "failed to publish to profile");

				model::ProfileResult {
					profile_id,
					success: false,
					post_id: None,
					url: None,
					error: Some(error.to_string()),
				}
			}
		};

		results.push(result);
	}

	let succeeded = results.iter().filter(|r| r.success).count();
	let summary = model::PublishSummary {
		total: results.len(),
		succeeded,
		failed: results.len() - succeeded,
	};

	tracing::info!(
		monotonic_counter.social_publications = summary.succeeded as u64,
		failed = summary.failed,
		principal = ?admin.principal,
		"published to social profiles"
	);

	Ok(Json(model::PublishOutput { results, summary }))
}

/// Generate social image
/// Generates a square image for a social media post and stores it.
#[route(tag = tag::SOCIAL)]
pub async fn generate_image(
	State(state): State<AppState>,
	_admin: AdminAuth,
	Json(input): Json<model::SocialImageInput>,
) -> Result<Json<model::Image>, RouteError> {
	let image = image::render(
		state.gateway.as_ref(),
		state.storage.as_ref(),
		&input.prompt,
		input.style,
		Size::Square,
	)
	.await
	.map_err(Error::from)?;

	Ok(Json(image))
}
