use axum::extract::{Path, State};
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{AdminAuth, Json, Query, Visitor},
	model::NewPostView,
	openapi::tag,
	slug,
	store::{PostStore, ViewStore},
	Database,
};

use super::{model, Error, RouteError};

/// Get published posts
/// Returns a paginated response of published posts, most recently published first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::BlogPost>>, RouteError> {
	let posts = database
		.published_posts(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(posts))
}

/// View post
/// Returns a published post by its slug and records the view for analytics.
#[route(tag = tag::POST)]
pub async fn view_post(
	State(database): State<Database>,
	Path(slug): Path<String>,
	visitor: Visitor,
) -> Result<Json<model::BlogPost>, RouteError> {
	let mut post = database
		.published_by_slug(&slug)
		.await?
		.ok_or(Error::UnknownSlug(slug))?;

	database
		.record_view(&NewPostView {
			post_id: post.id,
			viewed_at: Utc::now(),
			referrer: visitor.referrer,
			user_agent: visitor.user_agent,
		})
		.await?;

	tracing::info!(monotonic_counter.post_views = 1, post = %post.id);

	post.view_count += 1;

	Ok(Json(post))
}

/// List all posts
/// Returns a paginated response of all posts including drafts, newest first.
#[route(tag = tag::ADMIN)]
pub async fn list_posts(
	State(database): State<Database>,
	_admin: AdminAuth,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::BlogPost>>, RouteError> {
	let posts = database
		.all_posts(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(posts))
}

/// Create post
/// Creates a new draft post. The slug is derived from the title.
#[route(tag = tag::ADMIN)]
pub async fn create_post(
	State(database): State<Database>,
	admin: AdminAuth,
	Json(input): Json<model::CreateBlogPost>,
) -> Result<Json<model::BlogPost>, RouteError> {
	let slug = slug::unique(&input.title, Utc::now());
	let post = database
		.insert_post(&model::NewBlogPost::from_input(input, slug))
		.await?;

	tracing::info!(post = %post.id, principal = ?admin.principal, "post created");

	Ok(Json(post))
}

/// Update post
/// Updates an existing post by its unique id. Omitted fields are left unchanged.
#[route(tag = tag::ADMIN)]
pub async fn update_post(
	State(database): State<Database>,
	_admin: AdminAuth,
	Path(post_id): Path<Uuid>,
	Json(input): Json<model::UpdateBlogPost>,
) -> Result<Json<model::BlogPost>, RouteError> {
	let post = database.update_post(post_id, &input).await?;

	Ok(Json(post.ok_or(Error::UnknownPost(post_id))?))
}

/// Publish post
/// Makes a post visible on public listings and sets its publication time.
#[route(tag = tag::ADMIN)]
pub async fn publish_post(
	State(database): State<Database>,
	admin: AdminAuth,
	Path(post_id): Path<Uuid>,
) -> Result<Json<model::BlogPost>, RouteError> {
	let post = database
		.set_published(post_id, true, Utc::now())
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	tracing::info!(post = %post_id, principal = ?admin.principal, "post published");

	Ok(Json(post))
}

/// Unpublish post
/// Returns a post to draft, hiding it from public listings.
#[route(tag = tag::ADMIN)]
pub async fn unpublish_post(
	State(database): State<Database>,
	admin: AdminAuth,
	Path(post_id): Path<Uuid>,
) -> Result<Json<model::BlogPost>, RouteError> {
	let post = database
		.set_published(post_id, false, Utc::now())
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	tracing::info!(post = %post_id, principal = ?admin.principal, "post unpublished");

	Ok(Json(post))
}

/// Delete post
/// Deletes an existing post and its recorded views.
#[route(tag = tag::ADMIN)]
pub async fn delete_post(
	State(database): State<Database>,
	admin: AdminAuth,
	Path(post_id): Path<Uuid>,
) -> Result<(), RouteError> {
	if !database.delete_post(post_id).await? {
		return Err(Error::UnknownPost(post_id).into());
	}

	tracing::info!(post = %post_id, principal = ?admin.principal, "post deleted");

	Ok(())
}
