use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AdminStore, Error, PostStore, ScheduleStore, ViewStore};
use crate::model::{
	Admin, BlogPost, NewBlogPost, NewPostView, NewScheduledPost, PostView, ScheduledPost,
	UpdateBlogPost,
};

/// A [`super::Store`] backed by a Postgres connection pool.
#[derive(Clone)]
pub struct PgStore {
	pool: sqlx::PgPool,
}

impl PgStore {
	pub async fn connect(url: &str) -> Result<Self, Error> {
		let pool = sqlx::PgPool::connect(url).await?;

		sqlx::migrate!().run(&pool).await?;

		Ok(Self { pool })
	}
}

fn map_conflict(error: sqlx::Error) -> Error {
	match error {
		sqlx::Error::Database(ref d) => match d.constraint() {
			Some("blog_post_slug_key") => Error::Conflict("slug"),
			Some("admin_email_key") => Error::Conflict("email"),
			_ => Error::Database(error),
		},
		error => Error::Database(error),
	}
}

#[axum::async_trait]
impl ScheduleStore for PgStore {
	async fn insert_scheduled(
		&self,
		post: &NewScheduledPost,
	) -> Result<Option<ScheduledPost>, Error> {
		let row = sqlx::query_as::<_, ScheduledPost>(
			r"
				INSERT INTO scheduled_post (
					title, topic, service_id, scheduled_at, include_internal_links,
					website_url, custom_instructions, schedule_day
				)
				VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
				ON CONFLICT (service_id, schedule_day) DO NOTHING
				RETURNING *
			",
		)
		.bind(&post.title)
		.bind(&post.topic)
		.bind(&post.service_id)
		.bind(post.scheduled_at)
		.bind(post.include_internal_links)
		.bind(&post.website_url)
		.bind(&post.custom_instructions)
		.bind(post.schedule_day)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row)
	}

	async fn list_scheduled(
		&self,
		limit: i64,
		offset: i64,
	) -> Result<Vec<ScheduledPost>, Error> {
		let rows = sqlx::query_as::<_, ScheduledPost>(
			r"
				SELECT * FROM scheduled_post
				ORDER BY scheduled_at DESC
				LIMIT $1 OFFSET $2
			",
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows)
	}

	async fn get_scheduled(&self, id: Uuid) -> Result<Option<ScheduledPost>, Error> {
		let row = sqlx::query_as::<_, ScheduledPost>("SELECT * FROM scheduled_post WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row)
	}

	async fn due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledPost>, Error> {
		let rows = sqlx::query_as::<_, ScheduledPost>(
			r"
				SELECT * FROM scheduled_post
				WHERE status = 'pending' AND scheduled_at <= $1
				ORDER BY scheduled_at ASC
				LIMIT $2
			",
		)
		.bind(now)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows)
	}

	async fn claim(&self, id: Uuid) -> Result<bool, Error> {
		let result = sqlx::query(
			r"
				UPDATE scheduled_post
				SET status = 'generating'
				WHERE id = $1 AND status = 'pending'
			",
		)
		.bind(id)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() == 1)
	}

	async fn complete(&self, id: Uuid, post_id: Uuid) -> Result<(), Error> {
		let result = sqlx::query(
			r"
				UPDATE scheduled_post
				SET status = 'completed', generated_post_id = $2, error_message = NULL
				WHERE id = $1 AND status = 'generating'
			",
		)
		.bind(id)
		.bind(post_id)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(Error::NotClaimed(id));
		}

		Ok(())
	}

	async fn fail(&self, id: Uuid, message: &str) -> Result<(), Error> {
		let result = sqlx::query(
			r"
				UPDATE scheduled_post
				SET status = 'failed', error_message = $2, generated_post_id = NULL
				WHERE id = $1 AND status = 'generating'
			",
		)
		.bind(id)
		.bind(message)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(Error::NotClaimed(id));
		}

		Ok(())
	}
}

#[axum::async_trait]
impl PostStore for PgStore {
	async fn insert_post(&self, post: &NewBlogPost) -> Result<BlogPost, Error> {
		sqlx::query_as::<_, BlogPost>(
			r"
				INSERT INTO blog_post (title, slug, content, excerpt, tags, category, author, cover_image, published)
				VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false)
				RETURNING *
			",
		)
		.bind(&post.title)
		.bind(&post.slug)
		.bind(&post.content)
		.bind(&post.excerpt)
		.bind(&post.tags)
		.bind(&post.category)
		.bind(&post.author)
		.bind(&post.cover_image)
		.fetch_one(&self.pool)
		.await
		.map_err(map_conflict)
	}

	async fn update_post(
		&self,
		id: Uuid,
		update: &UpdateBlogPost,
	) -> Result<Option<BlogPost>, Error> {
		let post = sqlx::query_as::<_, BlogPost>(
			r"
				UPDATE blog_post
				SET title = COALESCE($2, title),
					content = COALESCE($3, content),
					excerpt = COALESCE($4, excerpt),
					tags = COALESCE($5, tags),
					category = COALESCE($6, category),
					author = COALESCE($7, author),
					cover_image = COALESCE($8, cover_image)
				WHERE id = $1
				RETURNING *
			",
		)
		.bind(id)
		.bind(&update.title)
		.bind(&update.content)
		.bind(&update.excerpt)
		.bind(&update.tags)
		.bind(&update.category)
		.bind(&update.author)
		.bind(&update.cover_image)
		.fetch_optional(&self.pool)
		.await?;

		Ok(post)
	}

	async fn set_published(
		&self,
		id: Uuid,
		published: bool,
		now: DateTime<Utc>,
	) -> Result<Option<BlogPost>, Error> {
		let post = sqlx::query_as::<_, BlogPost>(
			r"
				UPDATE blog_post
				SET published = $2,
					published_at = CASE WHEN $2 THEN $3 ELSE published_at END
				WHERE id = $1
				RETURNING *
			",
		)
		.bind(id)
		.bind(published)
		.bind(now)
		.fetch_optional(&self.pool)
		.await?;

		Ok(post)
	}

	async fn delete_post(&self, id: Uuid) -> Result<bool, Error> {
		let result = sqlx::query("DELETE FROM blog_post WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn get_post(&self, id: Uuid) -> Result<Option<BlogPost>, Error> {
		let post = sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_post WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(post)
	}

	async fn all_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPost>, Error> {
		let posts = sqlx::query_as::<_, BlogPost>(
			r"
				SELECT * FROM blog_post
				ORDER BY created_at DESC
				LIMIT $1 OFFSET $2
			",
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(posts)
	}

	async fn published_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPost>, Error> {
		let posts = sqlx::query_as::<_, BlogPost>(
			r"
				SELECT * FROM blog_post
				WHERE published
				ORDER BY published_at DESC
				LIMIT $1 OFFSET $2
			",
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(posts)
	}

	async fn published_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, Error> {
		let post = sqlx::query_as::<_, BlogPost>(
			"SELECT * FROM blog_post WHERE slug = $1 AND published",
		)
		.bind(slug)
		.fetch_optional(&self.pool)
		.await?;

		Ok(post)
	}
}

#[axum::async_trait]
impl ViewStore for PgStore {
	async fn record_view(&self, view: &NewPostView) -> Result<(), Error> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r"
				INSERT INTO post_view (post_id, viewed_at, referrer, user_agent)
				VALUES ($1, $2, $3, $4)
			",
		)
		.bind(view.post_id)
		.bind(view.viewed_at)
		.bind(&view.referrer)
		.bind(&view.user_agent)
		.execute(&mut *tx)
		.await?;

		sqlx::query("UPDATE blog_post SET view_count = view_count + 1 WHERE id = $1")
			.bind(view.post_id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		Ok(())
	}

	async fn views_since(&self, since: DateTime<Utc>) -> Result<Vec<PostView>, Error> {
		let views = sqlx::query_as::<_, PostView>(
			r"
				SELECT * FROM post_view
				WHERE viewed_at >= $1
				ORDER BY viewed_at ASC
			",
		)
		.bind(since)
		.fetch_all(&self.pool)
		.await?;

		Ok(views)
	}
}

#[axum::async_trait]
impl AdminStore for PgStore {
	async fn create_first_admin(
		&self,
		id: Uuid,
		email: &str,
		password: &[u8],
	) -> Result<Option<Admin>, Error> {
		sqlx::query_as::<_, Admin>(
			r"
				INSERT INTO admin (id, email, password)
				SELECT $1, $2, $3
				WHERE NOT EXISTS (SELECT 1 FROM admin)
				RETURNING *
			",
		)
		.bind(id)
		.bind(email)
		.bind(password)
		.fetch_optional(&self.pool)
		.await
		.map_err(map_conflict)
	}

	async fn admin_by_email(&self, email: &str) -> Result<Option<Admin>, Error> {
		let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admin WHERE email = $1")
			.bind(email)
			.fetch_optional(&self.pool)
			.await?;

		Ok(admin)
	}
}
