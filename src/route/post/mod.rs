use aide::axum::{
	routing::{get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_post")]
	UnknownPost(Uuid),
	#[error("unknown_slug")]
	UnknownSlug(String),
}

pub type RouteError = error::RouteError<Error>;

/// Public routes over published posts.
pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_posts, get_posts_docs))
		.api_route("/:slug", get_with(view_post, view_post_docs))
}

/// Post management, nested under the admin routes.
pub fn admin_routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			put_with(update_post, update_post_docs).delete_with(delete_post, delete_post_docs),
		)
		.api_route("/:id/publish", post_with(publish_post, publish_post_docs))
		.api_route("/:id/unpublish", post_with(unpublish_post, unpublish_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownSlug(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UnknownPost(post) => message
				.content("The post you requested does not exist.")
				.detail("post", post.to_string()),
			Self::UnknownSlug(slug) => message
				.content("The post you requested does not exist or is not published.")
				.detail("slug", slug),
		}
		.into_vec()
	}
}

#[cfg(test)]
mod test {
	use crate::{store::PostStore, test::*};

	async fn create(app: &TestServer, title: &str) -> serde_json::Value {
		let response = app
			.post("/admin/posts")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.json(&json!({
				"title": title,
				"content": "<p>Local search matters.</p>",
				"category": "Search Engine Optimization",
				"author": "Agency Team",
				"tags": ["seo"],
			}))
			.await;

		assert_eq!(response.status_code(), 200);
		response.json()
	}

	#[tokio::test]
	async fn test_draft_is_hidden_until_published() {
		let app = app(state());
		let post = create(&app, "Local SEO in 2024").await;
		let id = post["id"].as_str().unwrap();
		let slug = post["slug"].as_str().unwrap();

		assert_eq!(post["published"], false);
		assert!(slug.starts_with("local-seo-in-2024-"));

		assert_eq!(app.get(&format!("/posts/{slug}")).await.status_code(), 404);
		assert_eq!(app.get("/posts").await.json::<Vec<serde_json::Value>>().len(), 0);

		let response = app
			.post(&format!("/admin/posts/{id}/publish"))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.status_code(), 200);
		assert!(!response.json::<serde_json::Value>()["published_at"].is_null());

		let posts = app.get("/posts").await.json::<Vec<serde_json::Value>>();

		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["id"], id);

		let response = app
			.post(&format!("/admin/posts/{id}/unpublish"))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.json::<serde_json::Value>()["published"], false);
		assert_eq!(app.get(&format!("/posts/{slug}")).await.status_code(), 404);
	}

	#[tokio::test]
	async fn test_view_is_recorded() {
		let state = state();
		let store = state.store.clone();
		let app = app(state);
		let post = create(&app, "Google Ads Tips").await;
		let id = post["id"].as_str().unwrap();
		let slug = post["slug"].as_str().unwrap();

		app.post(&format!("/admin/posts/{id}/publish"))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		let response = app
			.get(&format!("/posts/{slug}"))
			.add_header(REFERER, HeaderValue::from_static("https://www.google.com/"))
			.add_header(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (iPhone) Mobile"))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["view_count"], 1);

		let views = store.views();

		assert_eq!(views.len(), 1);
		assert_eq!(views[0].referrer.as_deref(), Some("https://www.google.com/"));
		assert_eq!(store.posts()[0].view_count, 1);

		app.get(&format!("/posts/{slug}")).await;

		assert_eq!(store.views().len(), 2);
		assert_eq!(store.views()[1].referrer, None);
	}

	#[tokio::test]
	async fn test_update_and_delete() {
		let state = state();
		let store = state.store.clone();
		let app = app(state);
		let post = create(&app, "Website Speed").await;
		let id = post["id"].as_str().unwrap();

		let response = app
			.put(&format!("/admin/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.json(&json!({ "excerpt": "Why speed sells." }))
			.await;

		let body = response.json::<serde_json::Value>();

		assert_eq!(body["excerpt"], "Why speed sells.");
		assert_eq!(body["title"], "Website Speed");
		assert_eq!(body["slug"], post["slug"]);

		let response = app
			.delete(&format!("/admin/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.status_code(), 200);
		assert!(store.get_post(id.parse().unwrap()).await.unwrap().is_none());

		let response = app
			.delete(&format!("/admin/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<serde_json::Value>()["errors"][0]["code"],
			"unknown_post"
		);
	}

	#[tokio::test]
	async fn test_create_validates_title() {
		let app = app(state());

		let response = app
			.post("/admin/posts")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.json(&json!({
				"title": "ab",
				"content": "<p>x</p>",
				"category": "SEO",
				"author": "Team",
			}))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<serde_json::Value>()["errors"][0]["field"],
			"title"
		);
	}

	#[tokio::test]
	async fn test_admin_list_is_paginated() {
		let app = app(state());

		create(&app, "First Draft").await;
		create(&app, "Second Draft").await;

		let response = app
			.get("/admin/posts?page=1&size=1")
			.add_header(AUTHORIZATION, bearer(ADMIN_KEY))
			.await;

		assert_eq!(response.json::<Vec<serde_json::Value>>().len(), 1);
	}
}
