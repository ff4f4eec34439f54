//! Deterministic daily topic selection.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
	catalog::Service,
	config::Site,
	model::{NewScheduledPost, ScheduledPost},
	store::{self, ScheduleStore, Store},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("the service catalog is empty")]
	EmptyCatalog,
	#[error("service {0} has no topics")]
	EmptyTopics(&'static str),
	#[error(transparent)]
	Store(#[from] store::Error),
}

/// The service and topic chosen for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick<'a> {
	pub service: &'a Service,
	pub topic: &'static str,
}

/// Picks the service and topic for a day of the year.
///
/// Services cycle every day; each service's topics advance once per full
/// cycle of services, so every service is covered before a topic repeats.
pub fn pick(services: &[Service], day_of_year: u32) -> Result<Pick<'_>, Error> {
	if services.is_empty() {
		return Err(Error::EmptyCatalog);
	}

	let day = day_of_year as usize;
	let service = &services[day % services.len()];

	if service.topics.is_empty() {
		return Err(Error::EmptyTopics(service.id));
	}

	let topic = service.topics[(day / services.len()) % service.topics.len()];

	Ok(Pick { service, topic })
}

/// The outcome of a daily scheduling run.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Scheduled {
	/// `true` if a post for today's service already existed.
	pub skipped: bool,
	pub service_id: String,
	pub service_name: String,
	pub topic: String,
	/// The calendar day the rotation ran for.
	pub day: NaiveDate,
	/// The inserted row, absent when skipped.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scheduled_post: Option<ScheduledPost>,
}

/// Schedules today's rotated topic, due immediately.
///
/// The `(service, calendar day)` pair is an idempotency key enforced by
/// the store, so running twice on the same day inserts a single row.
pub async fn schedule_today(
	store: &dyn Store,
	services: &[Service],
	site: &Site,
	now: DateTime<Utc>,
) -> Result<Scheduled, Error> {
	let today = now.with_timezone(&site.offset).date_naive();
	let pick = pick(services, today.ordinal())?;

	let row = store
		.insert_scheduled(&NewScheduledPost {
			title: pick.topic.to_string(),
			topic: pick.topic.to_string(),
			service_id: pick.service.id.to_string(),
			scheduled_at: now,
			include_internal_links: true,
			website_url: site.website_url.clone(),
			custom_instructions: None,
			schedule_day: Some(today),
		})
		.await?;

	match &row {
		Some(row) => tracing::info!(id = %row.id, service = pick.service.id, topic = pick.topic, "scheduled daily post"),
		None => tracing::info!(service = pick.service.id, %today, "daily post already scheduled"),
	}

	Ok(Scheduled {
		skipped: row.is_none(),
		service_id: pick.service.id.to_string(),
		service_name: pick.service.name.to_string(),
		topic: pick.topic.to_string(),
		day: today,
		scheduled_post: row,
	})
}
