//! An in-memory [`super::Store`] enforcing the same constraints as the
//! Postgres schema, used by tests.

use std::sync::{
	atomic::{AtomicBool, Ordering},
	Mutex,
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AdminStore, Error, PostStore, ScheduleStore, ViewStore};
use crate::{
	model::{
		Admin, BlogPost, NewBlogPost, NewPostView, NewScheduledPost, PostView, ScheduledPost,
		UpdateBlogPost,
	},
	status::Status,
};

#[derive(Default)]
struct Tables {
	scheduled: Vec<ScheduledPost>,
	posts: Vec<BlogPost>,
	views: Vec<PostView>,
	admins: Vec<Admin>,
}

#[derive(Default)]
pub struct MemoryStore {
	tables: Mutex<Tables>,
	offline: AtomicBool,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes claims fail as if the database were unreachable.
	pub fn go_offline(&self) {
		self.offline.store(true, Ordering::SeqCst);
	}

	fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
		self.tables.lock().unwrap()
	}

	pub fn scheduled(&self) -> Vec<ScheduledPost> {
		self.tables().scheduled.clone()
	}

	pub fn posts(&self) -> Vec<BlogPost> {
		self.tables().posts.clone()
	}

	pub fn views(&self) -> Vec<PostView> {
		self.tables().views.clone()
	}

	fn transition(&self, id: Uuid, to: Status) -> Result<(), Error> {
		let mut tables = self.tables();
		let row = tables
			.scheduled
			.iter_mut()
			.find(|row| row.id == id)
			.ok_or(Error::NotClaimed(id))?;

		if row.status != Status::Generating && to != Status::Generating {
			return Err(Error::NotClaimed(id));
		}

		row.status = row.status.transition(to)?;
		Ok(())
	}
}

#[axum::async_trait]
impl ScheduleStore for MemoryStore {
	async fn insert_scheduled(
		&self,
		post: &NewScheduledPost,
	) -> Result<Option<ScheduledPost>, Error> {
		let mut tables = self.tables();

		if post.schedule_day.is_some()
			&& tables
				.scheduled
				.iter()
				.any(|row| row.service_id == post.service_id && row.schedule_day == post.schedule_day)
		{
			return Ok(None);
		}

		let row = ScheduledPost {
			id: Uuid::new_v4(),
			title: post.title.clone(),
			topic: post.topic.clone(),
			service_id: post.service_id.clone(),
			scheduled_at: post.scheduled_at,
			status: Status::Pending,
			include_internal_links: post.include_internal_links,
			website_url: post.website_url.clone(),
			custom_instructions: post.custom_instructions.clone(),
			generated_post_id: None,
			error_message: None,
			schedule_day: post.schedule_day,
			created_at: Utc::now(),
		};

		tables.scheduled.push(row.clone());
		Ok(Some(row))
	}

	async fn list_scheduled(
		&self,
		limit: i64,
		offset: i64,
	) -> Result<Vec<ScheduledPost>, Error> {
		let mut rows = self.scheduled();

		rows.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
		Ok(page(rows, limit, offset))
	}

	async fn get_scheduled(&self, id: Uuid) -> Result<Option<ScheduledPost>, Error> {
		Ok(self.tables().scheduled.iter().find(|row| row.id == id).cloned())
	}

	async fn due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledPost>, Error> {
		let mut rows = self
			.scheduled()
			.into_iter()
			.filter(|row| row.status == Status::Pending && row.scheduled_at <= now)
			.collect::<Vec<_>>();

		rows.sort_by_key(|row| row.scheduled_at);
		Ok(page(rows, limit, 0))
	}

	async fn claim(&self, id: Uuid) -> Result<bool, Error> {
		if self.offline.load(Ordering::SeqCst) {
			return Err(sqlx::Error::PoolTimedOut.into());
		}

		let mut tables = self.tables();

		match tables.scheduled.iter_mut().find(|row| row.id == id) {
			Some(row) if row.status == Status::Pending => {
				row.status = row.status.transition(Status::Generating)?;
				Ok(true)
			}
			_ => Ok(false),
		}
	}

	async fn complete(&self, id: Uuid, post_id: Uuid) -> Result<(), Error> {
		self.transition(id, Status::Completed)?;

		let mut tables = self.tables();

		if let Some(row) = tables.scheduled.iter_mut().find(|row| row.id == id) {
			row.generated_post_id = Some(post_id);
			row.error_message = None;
		}

		Ok(())
	}

	async fn fail(&self, id: Uuid, message: &str) -> Result<(), Error> {
		self.transition(id, Status::Failed)?;

		let mut tables = self.tables();

		if let Some(row) = tables.scheduled.iter_mut().find(|row| row.id == id) {
			row.generated_post_id = None;
			row.error_message = Some(message.to_string());
		}

		Ok(())
	}
}

#[axum::async_trait]
impl PostStore for MemoryStore {
	async fn insert_post(&self, post: &NewBlogPost) -> Result<BlogPost, Error> {
		let mut tables = self.tables();

		if tables.posts.iter().any(|p| p.slug == post.slug) {
			return Err(Error::Conflict("slug"));
		}

		let row = BlogPost {
			id: Uuid::new_v4(),
			title: post.title.clone(),
			slug: post.slug.clone(),
			content: post.content.clone(),
			excerpt: post.excerpt.clone(),
			tags: post.tags.clone(),
			category: post.category.clone(),
			author: post.author.clone(),
			published: false,
			published_at: None,
			view_count: 0,
			cover_image: post.cover_image.clone(),
			created_at: Utc::now(),
		};

		tables.posts.push(row.clone());
		Ok(row)
	}

	async fn update_post(
		&self,
		id: Uuid,
		update: &UpdateBlogPost,
	) -> Result<Option<BlogPost>, Error> {
		let mut tables = self.tables();
		let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) else {
			return Ok(None);
		};

		if let Some(title) = &update.title {
			post.title.clone_from(title);
		}
		if let Some(content) = &update.content {
			post.content.clone_from(content);
		}
		if let Some(excerpt) = &update.excerpt {
			post.excerpt.clone_from(excerpt);
		}
		if let Some(tags) = &update.tags {
			post.tags.clone_from(tags);
		}
		if let Some(category) = &update.category {
			post.category.clone_from(category);
		}
		if let Some(author) = &update.author {
			post.author.clone_from(author);
		}
		if let Some(cover_image) = &update.cover_image {
			post.cover_image = Some(cover_image.clone());
		}

		Ok(Some(post.clone()))
	}

	async fn set_published(
		&self,
		id: Uuid,
		published: bool,
		now: DateTime<Utc>,
	) -> Result<Option<BlogPost>, Error> {
		let mut tables = self.tables();
		let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) else {
			return Ok(None);
		};

		post.published = published;

		if published {
			post.published_at = Some(now);
		}

		Ok(Some(post.clone()))
	}

	async fn delete_post(&self, id: Uuid) -> Result<bool, Error> {
		let mut tables = self.tables();
		let before = tables.posts.len();

		tables.posts.retain(|p| p.id != id);
		tables.views.retain(|v| v.post_id != id);

		Ok(tables.posts.len() != before)
	}

	async fn get_post(&self, id: Uuid) -> Result<Option<BlogPost>, Error> {
		Ok(self.tables().posts.iter().find(|p| p.id == id).cloned())
	}

	async fn all_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPost>, Error> {
		let mut posts = self.posts();

		posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(page(posts, limit, offset))
	}

	async fn published_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPost>, Error> {
		let mut posts = self
			.posts()
			.into_iter()
			.filter(|p| p.published)
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
		Ok(page(posts, limit, offset))
	}

	async fn published_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, Error> {
		Ok(self
			.tables()
			.posts
			.iter()
			.find(|p| p.published && p.slug == slug)
			.cloned())
	}
}

#[axum::async_trait]
impl ViewStore for MemoryStore {
	async fn record_view(&self, view: &NewPostView) -> Result<(), Error> {
		let mut tables = self.tables();

		tables.views.push(PostView {
			id: Uuid::new_v4(),
			post_id: view.post_id,
			viewed_at: view.viewed_at,
			referrer: view.referrer.clone(),
			user_agent: view.user_agent.clone(),
		});

		if let Some(post) = tables.posts.iter_mut().find(|p| p.id == view.post_id) {
			post.view_count += 1;
		}

		Ok(())
	}

	async fn views_since(&self, since: DateTime<Utc>) -> Result<Vec<PostView>, Error> {
		let mut views = self
			.views()
			.into_iter()
			.filter(|v| v.viewed_at >= since)
			.collect::<Vec<_>>();

		views.sort_by_key(|v| v.viewed_at);
		Ok(views)
	}
}

#[axum::async_trait]
impl AdminStore for MemoryStore {
	async fn create_first_admin(
		&self,
		id: Uuid,
		email: &str,
		password: &[u8],
	) -> Result<Option<Admin>, Error> {
		let mut tables = self.tables();

		if !tables.admins.is_empty() {
			return Ok(None);
		}

		let admin = Admin {
			id,
			email: email.to_string(),
			password: password.to_vec(),
			created_at: Utc::now(),
		};

		tables.admins.push(admin.clone());
		Ok(Some(admin))
	}

	async fn admin_by_email(&self, email: &str) -> Result<Option<Admin>, Error> {
		Ok(self
			.tables()
			.admins
			.iter()
			.find(|a| a.email == email)
			.cloned())
	}
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
	let offset = usize::try_from(offset).unwrap_or(0);
	let limit = usize::try_from(limit).unwrap_or(0);

	rows.into_iter().skip(offset).take(limit).collect()
}
