use axum::extract::State;
use chrono::Utc;
use macros::route;

use crate::{
	analytics,
	extract::{AdminAuth, Json, Query},
	openapi::tag,
	AppState,
};

use super::{model, RouteError};

/// Get analytics
/// Summarizes post views over the requested number of days: daily counts, traffic sources, devices and top posts.
#[route(tag = tag::ANALYTICS)]
pub async fn get_summary(
	State(state): State<AppState>,
	_admin: AdminAuth,
	Query(range): Query<model::RangeInput>,
) -> Result<Json<model::Summary>, RouteError> {
	let summary = analytics::summary(
		state.database.as_ref(),
		Utc::now(),
		range.days,
		state.config.site.offset,
	)
	.await?;

	Ok(Json(summary))
}
