use chrono::{DateTime, NaiveDate, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::status::Status;

/// A queued request to generate a blog post at or after `scheduled_at`.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct ScheduledPost {
	pub id: Uuid,
	pub title: String,
	pub topic: String,
	/// Key into the service catalog.
	pub service_id: String,
	pub scheduled_at: DateTime<Utc>,
	pub status: Status,
	pub include_internal_links: bool,
	pub website_url: String,
	pub custom_instructions: Option<String>,
	/// The draft created from this request, once completed.
	pub generated_post_id: Option<Uuid>,
	/// The failure captured verbatim, once failed.
	pub error_message: Option<String>,
	/// Calendar day of the topic rotation that created this row, if any.
	pub schedule_day: Option<NaiveDate>,
	pub created_at: DateTime<Utc>,
}

/// The fields needed to queue a new [`ScheduledPost`].
#[derive(Debug, Clone)]
pub struct NewScheduledPost {
	pub title: String,
	pub topic: String,
	pub service_id: String,
	pub scheduled_at: DateTime<Utc>,
	pub include_internal_links: bool,
	pub website_url: String,
	pub custom_instructions: Option<String>,
	pub schedule_day: Option<NaiveDate>,
}

/// A single blog post, either a draft or published.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct BlogPost {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The title of the post.
	#[validate(length(min = 3, max = 200))]
	pub title: String,
	/// The URL-safe identifier, derived from the title.
	#[serde(skip_deserializing)]
	pub slug: String,
	/// The content of the post in HTML.
	pub content: String,
	/// A short summary shown on listings.
	#[serde(default)]
	#[validate(length(max = 500))]
	pub excerpt: String,
	/// Ordered list of tags.
	#[serde(default)]
	pub tags: Vec<String>,
	/// The category of the post, usually a service name.
	#[validate(length(min = 1, max = 100))]
	pub category: String,
	/// The displayed author.
	#[validate(length(min = 1, max = 100))]
	pub author: String,
	/// Whether the post is shown on public listings.
	#[serde(skip_deserializing)]
	pub published: bool,
	/// When the post was last published.
	#[serde(skip_deserializing)]
	pub published_at: Option<DateTime<Utc>>,
	/// The number of recorded views.
	#[serde(skip_deserializing)]
	pub view_count: i64,
	/// The public URL of the cover image.
	#[serde(default)]
	pub cover_image: Option<String>,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

/// The fields needed to insert a new [`BlogPost`]. Posts are always
/// inserted as drafts.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
	pub title: String,
	pub slug: String,
	pub content: String,
	pub excerpt: String,
	pub tags: Vec<String>,
	pub category: String,
	pub author: String,
	pub cover_image: Option<String>,
}

/// A single recorded render of a published post.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct PostView {
	pub id: Uuid,
	pub post_id: Uuid,
	pub viewed_at: DateTime<Utc>,
	pub referrer: Option<String>,
	pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPostView {
	pub post_id: Uuid,
	pub viewed_at: DateTime<Utc>,
	pub referrer: Option<String>,
	pub user_agent: Option<String>,
}

/// An administrator account.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Admin {
	pub id: Uuid,
	pub email: String,
	/// Argon2 hash salted with `id`.
	#[serde(skip)]
	pub password: Vec<u8>,
	pub created_at: DateTime<Utc>,
}
