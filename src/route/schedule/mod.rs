use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, rotator, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_scheduled_post")]
	UnknownScheduledPost(Uuid),
	#[error("rotation failed: {0}")]
	Rotation(rotator::Error),
}

pub type RouteError = error::RouteError<Error>;

impl From<rotator::Error> for RouteError {
	fn from(error: rotator::Error) -> Self {
		match error {
			rotator::Error::Store(error) => error.into(),
			error => Error::Rotation(error).into(),
		}
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_scheduled, list_scheduled_docs)
				.post_with(create_scheduled, create_scheduled_docs),
		)
		.api_route("/auto", post_with(schedule_today, schedule_today_docs))
		.api_route("/process", post_with(process_due, process_due_docs))
		.api_route("/:id", get_with(get_scheduled, get_scheduled_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownScheduledPost(..) => StatusCode::NOT_FOUND,
			Self::Rotation(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownScheduledPost(id) => error::Message::new("unknown_scheduled_post")
				.content("The scheduled post you requested does not exist.")
				.detail("scheduled_post", id.to_string()),
			Self::Rotation(error) => error::Message::new("rotation_failed").content(error.to_string()),
		}
		.into_vec()
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};

	use crate::{
		model::NewScheduledPost,
		status::Status,
		store::{PostStore, ScheduleStore},
		test::*,
	};

	#[tokio::test]
	async fn test_auto_schedule_is_idempotent() {
		let fixture = state();
		let store = fixture.store.clone();
		let app = app(fixture);

		let response = app
			.post("/schedule/auto")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.status_code(), 200);

		let first = response.json::<serde_json::Value>();

		assert_eq!(first["skipped"], false);
		assert_eq!(first["scheduled_post"]["status"], "pending");

		let second = app
			.post("/schedule/auto")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await
			.json::<serde_json::Value>();

		assert_eq!(second["skipped"], true);
		assert_eq!(second["service_id"], first["service_id"]);
		assert_eq!(second["topic"], first["topic"]);
		assert!(second.get("scheduled_post").is_none());
		assert_eq!(store.scheduled().len(), 1);
	}

	#[tokio::test]
	async fn test_process_generates_drafts() {
		let fixture = state();
		let store = fixture.store.clone();
		let app = app(fixture);

		let row = store
			.insert_scheduled(&NewScheduledPost {
				title: "Top SEO Agency in Guntur".into(),
				topic: "Top SEO Agency in Guntur".into(),
				service_id: "seo".into(),
				scheduled_at: Utc::now() - Duration::minutes(5),
				include_internal_links: true,
				website_url: "https://agency.example".into(),
				custom_instructions: None,
				schedule_day: None,
			})
			.await
			.unwrap()
			.unwrap();

		let response = app
			.post("/schedule/process")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.status_code(), 200);

		let report = response.json::<serde_json::Value>();

		assert_eq!(report["success"], true);
		assert_eq!(report["processed"], 1);
		assert_eq!(report["results"][0]["outcome"], "completed");

		let row = store.get_scheduled(row.id).await.unwrap().unwrap();
		let post = store
			.get_post(row.generated_post_id.unwrap())
			.await
			.unwrap()
			.unwrap();

		assert_eq!(row.status, Status::Completed);
		assert!(post.slug.starts_with("top-seo-agency-in-guntur-"));
		assert!(!post.published);
		assert_eq!(post.author, "Agency Team");

		let report = app
			.post("/schedule/process")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await
			.json::<serde_json::Value>();

		assert_eq!(report["total"], 0);
	}

	#[tokio::test]
	async fn test_create_and_get() {
		let app = app(state());

		let response = app
			.post("/schedule")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.json(&json!({
				"topic": "Instagram Reels Ideas for Local Businesses",
				"service_id": "social-media-marketing",
				"scheduled_at": "2030-01-01T09:00:00Z",
				"custom_instructions": "Mention our reels package.",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let row = response.json::<serde_json::Value>();

		assert_eq!(row["title"], "Instagram Reels Ideas for Local Businesses");
		assert_eq!(row["include_internal_links"], true);
		assert_eq!(row["website_url"], "https://agency.example");

		let fetched = app
			.get(&format!("/schedule/{}", row["id"].as_str().unwrap()))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await
			.json::<serde_json::Value>();

		assert_eq!(fetched, row);

		let listed = app
			.get("/schedule")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await
			.json::<Vec<serde_json::Value>>();

		assert_eq!(listed, [row]);
	}

	#[tokio::test]
	async fn test_create_rejects_unknown_service() {
		let app = app(state());

		let response = app
			.post("/schedule")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.json(&json!({
				"topic": "Knitting for Beginners",
				"service_id": "knitting",
				"scheduled_at": "2030-01-01T09:00:00Z",
			}))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<serde_json::Value>()["errors"][0]["code"],
			"unknown_service"
		);
	}

	#[tokio::test]
	async fn test_unknown_scheduled_post() {
		let app = app(state());

		let response = app
			.get(&format!("/schedule/{}", uuid::Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.status_code(), 404);
	}
}
