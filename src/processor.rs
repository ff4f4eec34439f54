//! Turns due scheduled posts into draft blog posts.

use std::time::Instant;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::{
	catalog::{self, Service},
	config::Site,
	generate::{Brief, Generate},
	model::{NewBlogPost, ScheduledPost},
	slug,
	status::{Status, TransitionError},
	store::{self, PostStore, ScheduleStore, Store},
};

/// The most rows handled by a single invocation, bounding the work and
/// external API cost of each run.
pub const BATCH_SIZE: i64 = 5;

const SEO_DIRECTIVES: &str = "\
- Use the main topic naturally in the first paragraph and in at least one <h2> heading.
- Structure the post with descriptive <h2> and <h3> headings and short paragraphs.
- Mention Guntur and Andhra Pradesh where relevant for local search.
- Include a frequently asked questions section with 3 questions.
- End with a clear call to action inviting readers to contact the agency.";

/// A failure while processing a single row.
#[derive(Debug, thiserror::Error)]
enum RowError {
	#[error("unknown service {0}")]
	UnknownService(String),
	#[error(transparent)]
	Generate(#[from] crate::gateway::Error),
	#[error(transparent)]
	Store(#[from] store::Error),
	#[error(transparent)]
	Transition(#[from] TransitionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
	Completed,
	Failed,
	/// Another invocation claimed the row first.
	Skipped,
	/// The row could not be claimed because the store failed. It stays
	/// pending for the next run.
	Errored,
}

/// The result of processing one scheduled post.
#[derive(Debug, Serialize, JsonSchema)]
pub struct RowResult {
	pub id: Uuid,
	pub title: String,
	pub outcome: Outcome,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub post_id: Option<Uuid>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// The result of one processing run.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BatchReport {
	pub success: bool,
	/// Rows turned into drafts.
	pub processed: usize,
	pub failed: usize,
	pub skipped: usize,
	/// Rows left pending because claiming them failed.
	pub errored: usize,
	/// Rows selected as due.
	pub total: usize,
	pub results: Vec<RowResult>,
}

/// Builds the instruction block sent with the content request: the
/// standard SEO directives, the internal links if requested, then the
/// row's own instructions.
pub fn instructions(row: &ScheduledPost, services: &[Service], service: &Service) -> String {
	let mut text = format!("SEO requirements:\n{SEO_DIRECTIVES}");

	if row.include_internal_links {
		text.push_str(
			"\n\nInclude the following do-follow internal links naturally within the content, \
			and append this block at the end of the post exactly as given:\n",
		);
		text.push_str(&catalog::internal_links(services, service, &row.website_url));
	}

	if let Some(custom) = row.custom_instructions.as_deref().map(str::trim) {
		if !custom.is_empty() {
			text.push_str("\n\n");
			text.push_str(custom);
		}
	}

	text
}

/// Processes up to [`BATCH_SIZE`] due rows, one at a time.
///
/// Rows run sequentially so at most one generation is in flight against the
/// AI gateway. Each row is claimed atomically before work starts, so
/// concurrent invocations never process the same row twice. A failing row
/// is recorded and never aborts the batch; only failing to select due rows
/// returns an error.
#[tracing::instrument(skip_all)]
pub async fn process_due(
	store: &dyn Store,
	generator: &dyn Generate,
	services: &[Service],
	site: &Site,
	now: DateTime<Utc>,
) -> Result<BatchReport, store::Error> {
	let rows = store.due(now, BATCH_SIZE).await?;
	let total = rows.len();
	let mut results = Vec::with_capacity(total);

	tracing::info!(total, "processing due scheduled posts");

	for row in rows {
		results.push(process_row(store, generator, services, site, row, now).await);
	}

	let count = |outcome| results.iter().filter(|r| r.outcome == outcome).count();

	Ok(BatchReport {
		success: true,
		processed: count(Outcome::Completed),
		failed: count(Outcome::Failed),
		skipped: count(Outcome::Skipped),
		errored: count(Outcome::Errored),
		total,
		results,
	})
}

async fn process_row(
	store: &dyn Store,
	generator: &dyn Generate,
	services: &[Service],
	site: &Site,
	row: ScheduledPost,
	now: DateTime<Utc>,
) -> RowResult {
	let mut result = RowResult {
		id: row.id,
		title: row.title.clone(),
		outcome: Outcome::Skipped,
		post_id: None,
		slug: None,
		error: None,
	};

	let status = match row.status.transition(Status::Generating) {
		Ok(status) => status,
		Err(error) => {
			tracing::warn!(id = %row.id, %error, "selected row is not pending");
			return result;
		}
	};

	match store.claim(row.id).await {
		Ok(true) => {}
		Ok(false) => {
			tracing::info!(id = %row.id, "scheduled post already claimed");
			return result;
		}
		Err(error) => {
			tracing::error!(id = %row.id, %error, "failed to claim scheduled post");
			result.outcome = Outcome::Errored;
			result.error = Some(error.to_string());
			return result;
		}
	}

	let started = Instant::now();

	match generate_post(store, generator, services, site, &row, status, now).await {
		Ok((post_id, slug)) => {
			tracing::info!(
				monotonic_counter.scheduled_posts_completed = 1,
				histogram.generation_latency_ms = started.elapsed().as_millis() as u64,
				id = %row.id,
				%post_id,
				"generated draft from scheduled post"
			);

			result.outcome = Outcome::Completed;
			result.post_id = Some(post_id);
			result.slug = Some(slug);
		}
		Err(error) => {
			let message = error.to_string();
			let quota = matches!(&error, RowError::Generate(error) if error.is_quota());

			tracing::warn!(
				monotonic_counter.scheduled_posts_failed = 1,
				histogram.generation_latency_ms = started.elapsed().as_millis() as u64,
				id = %row.id,
				error = %message,
				quota,
				"scheduled post failed"
			);

			match status.transition(Status::Failed) {
				Ok(_) => {
					if let Err(error) = store.fail(row.id, &message).await {
						tracing::error!(id = %row.id, %error, "failed to mark scheduled post failed");
					}
				}
				Err(error) => tracing::error!(id = %row.id, %error, "cannot mark scheduled post failed"),
			}

			result.outcome = Outcome::Failed;
			result.error = Some(message);
		}
	}

	result
}

async fn generate_post(
	store: &dyn Store,
	generator: &dyn Generate,
	services: &[Service],
	site: &Site,
	row: &ScheduledPost,
	status: Status,
	now: DateTime<Utc>,
) -> Result<(Uuid, String), RowError> {
	let service = catalog::find(services, &row.service_id)
		.ok_or_else(|| RowError::UnknownService(row.service_id.clone()))?;

	let draft = generator
		.compose(&Brief {
			topic: row.topic.clone(),
			keywords: Some(service.keywords.to_string()).filter(|k| !k.is_empty()),
			tone: None,
			length: None,
			category: service.name.to_string(),
			instructions: instructions(row, services, service),
		})
		.await?;

	status.transition(Status::Completed)?;

	let slug = slug::unique_for(&row.topic, now, row.id);
	let post = store
		.insert_post(&NewBlogPost {
			title: row.title.clone(),
			slug,
			content: draft.content,
			excerpt: draft.excerpt,
			tags: draft.tags,
			category: service.name.to_string(),
			author: site.author.clone(),
			cover_image: None,
		})
		.await?;

	// Failed rows never leave a draft behind.
	if let Err(error) = store.complete(row.id, post.id).await {
		if let Err(error) = store.delete_post(post.id).await {
			tracing::error!(id = %row.id, post = %post.id, %error, "failed to remove orphaned draft");
		}

		return Err(error.into());
	}

	Ok((post.id, post.slug))
}
