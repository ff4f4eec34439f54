use axum::extract::{Path, State};
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	catalog::SERVICES,
	extract::{AdminAuth, Json, Query},
	model::NewScheduledPost,
	openapi::tag,
	processor, rotator,
	store::ScheduleStore,
	AppState, Database,
};

use super::{model, Error, RouteError};

/// Schedule today's post
/// Picks today's service and topic from the rotation and queues a post for it.
/// Running it again on the same day reports `skipped` instead of queueing a duplicate.
#[route(tag = tag::SCHEDULE)]
pub async fn schedule_today(
	State(state): State<AppState>,
	_admin: AdminAuth,
) -> Result<Json<model::Scheduled>, RouteError> {
	let scheduled = rotator::schedule_today(
		state.database.as_ref(),
		SERVICES,
		&state.config.site,
		Utc::now(),
	)
	.await?;

	Ok(Json(scheduled))
}

/// Process due posts
/// Generates draft blog posts for up to five due scheduled posts, one at a time.
#[route(tag = tag::SCHEDULE)]
pub async fn process_due(
	State(state): State<AppState>,
	_admin: AdminAuth,
) -> Result<Json<model::BatchReport>, RouteError> {
	let report = processor::process_due(
		state.database.as_ref(),
		state.generator.as_ref(),
		SERVICES,
		&state.config.site,
		Utc::now(),
	)
	.await?;

	Ok(Json(report))
}

/// Create scheduled post
/// Queues a post about any topic for generation at a given time.
#[route(tag = tag::SCHEDULE)]
pub async fn create_scheduled(
	State(state): State<AppState>,
	_admin: AdminAuth,
	Json(input): Json<model::CreateScheduledInput>,
) -> Result<Json<model::ScheduledPost>, RouteError> {
	let row = state
		.database
		.insert_scheduled(&NewScheduledPost {
			title: input.title.unwrap_or_else(|| input.topic.clone()),
			topic: input.topic,
			service_id: input.service_id,
			scheduled_at: input.scheduled_at,
			include_internal_links: input.include_internal_links,
			website_url: input
				.website_url
				.unwrap_or_else(|| state.config.site.website_url.clone()),
			custom_instructions: input.custom_instructions,
			schedule_day: None,
		})
		.await?;

	// Only rotation rows carry a calendar day, so ad hoc rows always insert.
	let row = row.ok_or(crate::store::Error::Conflict("scheduled post"))?;

	Ok(Json(row))
}

/// List scheduled posts
/// Returns a paginated response of scheduled posts, latest scheduled time first.
#[route(tag = tag::SCHEDULE)]
pub async fn list_scheduled(
	State(database): State<Database>,
	_admin: AdminAuth,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::ScheduledPost>>, RouteError> {
	let rows = database
		.list_scheduled(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(rows))
}

/// Get scheduled post
/// Returns a single scheduled post by its unique id, including its status and outcome.
#[route(tag = tag::SCHEDULE)]
pub async fn get_scheduled(
	State(database): State<Database>,
	_admin: AdminAuth,
	Path(id): Path<Uuid>,
) -> Result<Json<model::ScheduledPost>, RouteError> {
	let row = database.get_scheduled(id).await?;

	Ok(Json(row.ok_or(Error::UnknownScheduledPost(id))?))
}
