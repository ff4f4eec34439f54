mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
	model::{
		Admin, BlogPost, NewBlogPost, NewPostView, NewScheduledPost, PostView, ScheduledPost,
		UpdateBlogPost,
	},
	status::TransitionError,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("{0} already exists")]
	Conflict(&'static str),
	#[error("scheduled post {0} is not being generated")]
	NotClaimed(Uuid),
	#[error(transparent)]
	Transition(#[from] TransitionError),
}

/// Persistence of scheduled post requests.
#[axum::async_trait]
pub trait ScheduleStore: Send + Sync {
	/// Inserts a scheduled post. Returns `None` if a row for the same
	/// service and calendar day already exists.
	async fn insert_scheduled(
		&self,
		post: &NewScheduledPost,
	) -> Result<Option<ScheduledPost>, Error>;

	async fn list_scheduled(&self, limit: i64, offset: i64)
		-> Result<Vec<ScheduledPost>, Error>;

	async fn get_scheduled(&self, id: Uuid) -> Result<Option<ScheduledPost>, Error>;

	/// Pending rows with `scheduled_at <= now`, oldest first.
	async fn due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledPost>, Error>;

	/// Atomically moves a row from pending to generating. Returns `false`
	/// if the row was no longer pending.
	async fn claim(&self, id: Uuid) -> Result<bool, Error>;

	async fn complete(&self, id: Uuid, post_id: Uuid) -> Result<(), Error>;

	async fn fail(&self, id: Uuid, message: &str) -> Result<(), Error>;
}

/// Persistence of blog posts.
#[axum::async_trait]
pub trait PostStore: Send + Sync {
	/// Inserts a draft post, failing with [`Error::Conflict`] on a duplicate slug.
	async fn insert_post(&self, post: &NewBlogPost) -> Result<BlogPost, Error>;

	async fn update_post(&self, id: Uuid, update: &UpdateBlogPost)
		-> Result<Option<BlogPost>, Error>;

	/// Publishes or unpublishes a post. `published_at` is set to `now`
	/// when publishing and kept when unpublishing.
	async fn set_published(
		&self,
		id: Uuid,
		published: bool,
		now: DateTime<Utc>,
	) -> Result<Option<BlogPost>, Error>;

	async fn delete_post(&self, id: Uuid) -> Result<bool, Error>;

	async fn get_post(&self, id: Uuid) -> Result<Option<BlogPost>, Error>;

	async fn all_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPost>, Error>;

	/// Published posts, most recently published first.
	async fn published_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPost>, Error>;

	async fn published_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, Error>;
}

/// Persistence of post views.
#[axum::async_trait]
pub trait ViewStore: Send + Sync {
	/// Appends a view and increments the post's view count.
	async fn record_view(&self, view: &NewPostView) -> Result<(), Error>;

	async fn views_since(&self, since: DateTime<Utc>) -> Result<Vec<PostView>, Error>;
}

/// Persistence of administrator accounts.
#[axum::async_trait]
pub trait AdminStore: Send + Sync {
	/// Inserts the account only if no admin exists yet.
	async fn create_first_admin(
		&self,
		id: Uuid,
		email: &str,
		password: &[u8],
	) -> Result<Option<Admin>, Error>;

	async fn admin_by_email(&self, email: &str) -> Result<Option<Admin>, Error>;
}

pub trait Store: ScheduleStore + PostStore + ViewStore + AdminStore {}

impl<T> Store for T where T: ScheduleStore + PostStore + ViewStore + AdminStore {}
